//! Operator semantics of the host language.
//!
//! Numeric operators are looked up in a table keyed by operator and promoted
//! operand kind. String concatenation, reference equality, shifts and the
//! conditional operators have dedicated paths.

use crate::types::{self, binary_numeric_promotion, unary_numeric_promotion};
use exprscope_api::{HostError, HostResult, HostTypeSystem, PrimitiveKind, TypeRef, Value};
use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,
    ShiftLeft,
    ShiftRight,
    UnsignedShiftRight,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
    BitwiseAnd,
    BitwiseXor,
    BitwiseOr,
    LogicalAnd,
    LogicalOr,
}

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 19] = [
        BinaryOperator::Multiply,
        BinaryOperator::Divide,
        BinaryOperator::Modulo,
        BinaryOperator::Add,
        BinaryOperator::Subtract,
        BinaryOperator::ShiftLeft,
        BinaryOperator::ShiftRight,
        BinaryOperator::UnsignedShiftRight,
        BinaryOperator::Less,
        BinaryOperator::LessOrEqual,
        BinaryOperator::Greater,
        BinaryOperator::GreaterOrEqual,
        BinaryOperator::Equal,
        BinaryOperator::NotEqual,
        BinaryOperator::BitwiseAnd,
        BinaryOperator::BitwiseXor,
        BinaryOperator::BitwiseOr,
        BinaryOperator::LogicalAnd,
        BinaryOperator::LogicalOr,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::ShiftRight => ">>",
            BinaryOperator::UnsignedShiftRight => ">>>",
            BinaryOperator::Less => "<",
            BinaryOperator::LessOrEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterOrEqual => ">=",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::BitwiseAnd => "&",
            BinaryOperator::BitwiseXor => "^",
            BinaryOperator::BitwiseOr => "|",
            BinaryOperator::LogicalAnd => "&&",
            BinaryOperator::LogicalOr => "||",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.symbol() == symbol)
    }

    /// Binding strength; higher binds tighter. `instanceof` shares the
    /// relational level.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => 10,
            BinaryOperator::Add | BinaryOperator::Subtract => 9,
            BinaryOperator::ShiftLeft
            | BinaryOperator::ShiftRight
            | BinaryOperator::UnsignedShiftRight => 8,
            BinaryOperator::Less
            | BinaryOperator::LessOrEqual
            | BinaryOperator::Greater
            | BinaryOperator::GreaterOrEqual => RELATIONAL_PRECEDENCE,
            BinaryOperator::Equal | BinaryOperator::NotEqual => 6,
            BinaryOperator::BitwiseAnd => 5,
            BinaryOperator::BitwiseXor => 4,
            BinaryOperator::BitwiseOr => 3,
            BinaryOperator::LogicalAnd => 2,
            BinaryOperator::LogicalOr => 1,
        }
    }

    pub fn is_short_circuit(self) -> bool {
        matches!(self, BinaryOperator::LogicalAnd | BinaryOperator::LogicalOr)
    }

    fn is_shift(self) -> bool {
        matches!(
            self,
            BinaryOperator::ShiftLeft | BinaryOperator::ShiftRight | BinaryOperator::UnsignedShiftRight
        )
    }

    fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Less
                | BinaryOperator::LessOrEqual
                | BinaryOperator::Greater
                | BinaryOperator::GreaterOrEqual
                | BinaryOperator::Equal
                | BinaryOperator::NotEqual
        )
    }
}

pub const RELATIONAL_PRECEDENCE: u8 = 7;

/// Assignment forms; the binary operator parser stops in front of these.
pub const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=", ">>>=",
];

/// The operator combined into a compound assignment such as `+=`.
pub fn compound_operator(symbol: &str) -> Option<BinaryOperator> {
    symbol
        .strip_suffix('=')
        .filter(|op| !op.is_empty())
        .and_then(BinaryOperator::from_symbol)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Plus,
    Minus,
    BitwiseNot,
    LogicalNot,
}

impl UnaryOperator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(UnaryOperator::Plus),
            "-" => Some(UnaryOperator::Minus),
            "~" => Some(UnaryOperator::BitwiseNot),
            "!" => Some(UnaryOperator::LogicalNot),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
            UnaryOperator::BitwiseNot => "~",
            UnaryOperator::LogicalNot => "!",
        }
    }
}

type NumericFn = fn(&Value, &Value) -> HostResult<Value>;

fn operand_mismatch() -> HostError {
    HostError::IllegalArgument("operand kinds do not match the operator table".to_string())
}

fn division_by_zero() -> HostError {
    HostError::exception("java.lang.ArithmeticException", "/ by zero")
}

fn ints(a: &Value, b: &Value) -> HostResult<(i32, i32)> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok((*x, *y)),
        _ => Err(operand_mismatch()),
    }
}

fn longs(a: &Value, b: &Value) -> HostResult<(i64, i64)> {
    match (a, b) {
        (Value::Long(x), Value::Long(y)) => Ok((*x, *y)),
        _ => Err(operand_mismatch()),
    }
}

fn floats(a: &Value, b: &Value) -> HostResult<(f32, f32)> {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => Ok((*x, *y)),
        _ => Err(operand_mismatch()),
    }
}

fn doubles(a: &Value, b: &Value) -> HostResult<(f64, f64)> {
    match (a, b) {
        (Value::Double(x), Value::Double(y)) => Ok((*x, *y)),
        _ => Err(operand_mismatch()),
    }
}

fn bools(a: &Value, b: &Value) -> HostResult<(bool, bool)> {
    match (a, b) {
        (Value::Boolean(x), Value::Boolean(y)) => Ok((*x, *y)),
        _ => Err(operand_mismatch()),
    }
}

macro_rules! comparison_ops {
    ($table:ident, $kind:expr, $extract:ident) => {
        $table.insert((BinaryOperator::Less, $kind), |a: &Value, b: &Value| {
            $extract(a, b).map(|(x, y)| Value::Boolean(x < y))
        });
        $table.insert((BinaryOperator::LessOrEqual, $kind), |a: &Value, b: &Value| {
            $extract(a, b).map(|(x, y)| Value::Boolean(x <= y))
        });
        $table.insert((BinaryOperator::Greater, $kind), |a: &Value, b: &Value| {
            $extract(a, b).map(|(x, y)| Value::Boolean(x > y))
        });
        $table.insert((BinaryOperator::GreaterOrEqual, $kind), |a: &Value, b: &Value| {
            $extract(a, b).map(|(x, y)| Value::Boolean(x >= y))
        });
        $table.insert((BinaryOperator::Equal, $kind), |a: &Value, b: &Value| {
            $extract(a, b).map(|(x, y)| Value::Boolean(x == y))
        });
        $table.insert((BinaryOperator::NotEqual, $kind), |a: &Value, b: &Value| {
            $extract(a, b).map(|(x, y)| Value::Boolean(x != y))
        });
    };
}

macro_rules! integral_ops {
    ($table:ident, $kind:expr, $variant:ident, $extract:ident) => {
        $table.insert((BinaryOperator::Multiply, $kind), |a: &Value, b: &Value| {
            $extract(a, b).map(|(x, y)| Value::$variant(x.wrapping_mul(y)))
        });
        $table.insert((BinaryOperator::Divide, $kind), |a: &Value, b: &Value| {
            let (x, y) = $extract(a, b)?;
            if y == 0 {
                return Err(division_by_zero());
            }
            Ok(Value::$variant(x.wrapping_div(y)))
        });
        $table.insert((BinaryOperator::Modulo, $kind), |a: &Value, b: &Value| {
            let (x, y) = $extract(a, b)?;
            if y == 0 {
                return Err(division_by_zero());
            }
            Ok(Value::$variant(x.wrapping_rem(y)))
        });
        $table.insert((BinaryOperator::Add, $kind), |a: &Value, b: &Value| {
            $extract(a, b).map(|(x, y)| Value::$variant(x.wrapping_add(y)))
        });
        $table.insert((BinaryOperator::Subtract, $kind), |a: &Value, b: &Value| {
            $extract(a, b).map(|(x, y)| Value::$variant(x.wrapping_sub(y)))
        });
        $table.insert((BinaryOperator::BitwiseAnd, $kind), |a: &Value, b: &Value| {
            $extract(a, b).map(|(x, y)| Value::$variant(x & y))
        });
        $table.insert((BinaryOperator::BitwiseXor, $kind), |a: &Value, b: &Value| {
            $extract(a, b).map(|(x, y)| Value::$variant(x ^ y))
        });
        $table.insert((BinaryOperator::BitwiseOr, $kind), |a: &Value, b: &Value| {
            $extract(a, b).map(|(x, y)| Value::$variant(x | y))
        });
        comparison_ops!($table, $kind, $extract);
    };
}

macro_rules! floating_ops {
    ($table:ident, $kind:expr, $variant:ident, $extract:ident) => {
        $table.insert((BinaryOperator::Multiply, $kind), |a: &Value, b: &Value| {
            $extract(a, b).map(|(x, y)| Value::$variant(x * y))
        });
        $table.insert((BinaryOperator::Divide, $kind), |a: &Value, b: &Value| {
            $extract(a, b).map(|(x, y)| Value::$variant(x / y))
        });
        $table.insert((BinaryOperator::Modulo, $kind), |a: &Value, b: &Value| {
            $extract(a, b).map(|(x, y)| Value::$variant(x % y))
        });
        $table.insert((BinaryOperator::Add, $kind), |a: &Value, b: &Value| {
            $extract(a, b).map(|(x, y)| Value::$variant(x + y))
        });
        $table.insert((BinaryOperator::Subtract, $kind), |a: &Value, b: &Value| {
            $extract(a, b).map(|(x, y)| Value::$variant(x - y))
        });
        comparison_ops!($table, $kind, $extract);
    };
}

static NUMERIC_OPERATORS: Lazy<HashMap<(BinaryOperator, PrimitiveKind), NumericFn>> =
    Lazy::new(|| {
        let mut table: HashMap<(BinaryOperator, PrimitiveKind), NumericFn> = HashMap::new();
        integral_ops!(table, PrimitiveKind::Int, Int, ints);
        integral_ops!(table, PrimitiveKind::Long, Long, longs);
        floating_ops!(table, PrimitiveKind::Float, Float, floats);
        floating_ops!(table, PrimitiveKind::Double, Double, doubles);

        let boolean = PrimitiveKind::Boolean;
        table.insert((BinaryOperator::BitwiseAnd, boolean), |a: &Value, b: &Value| {
            bools(a, b).map(|(x, y)| Value::Boolean(x & y))
        });
        table.insert((BinaryOperator::BitwiseXor, boolean), |a: &Value, b: &Value| {
            bools(a, b).map(|(x, y)| Value::Boolean(x ^ y))
        });
        table.insert((BinaryOperator::BitwiseOr, boolean), |a: &Value, b: &Value| {
            bools(a, b).map(|(x, y)| Value::Boolean(x | y))
        });
        table.insert((BinaryOperator::LogicalAnd, boolean), |a: &Value, b: &Value| {
            bools(a, b).map(|(x, y)| Value::Boolean(x && y))
        });
        table.insert((BinaryOperator::LogicalOr, boolean), |a: &Value, b: &Value| {
            bools(a, b).map(|(x, y)| Value::Boolean(x || y))
        });
        table.insert((BinaryOperator::Equal, boolean), |a: &Value, b: &Value| {
            bools(a, b).map(|(x, y)| Value::Boolean(x == y))
        });
        table.insert((BinaryOperator::NotEqual, boolean), |a: &Value, b: &Value| {
            bools(a, b).map(|(x, y)| Value::Boolean(x != y))
        });
        table
    });

fn incompatible(op: &str, left: &TypeRef, right: &TypeRef) -> String {
    format!("Operator '{op}' cannot be applied to '{left}' and '{right}'")
}

/// Kind both operands are converted to before the table lookup.
fn operand_kind(op: BinaryOperator, left: &TypeRef, right: &TypeRef) -> Option<PrimitiveKind> {
    let (l, r) = (left.unboxed()?, right.unboxed()?);
    if l == PrimitiveKind::Boolean && r == PrimitiveKind::Boolean {
        return Some(PrimitiveKind::Boolean);
    }
    if op.is_shift() {
        return l.is_integral().then(|| unary_numeric_promotion(l)).flatten();
    }
    binary_numeric_promotion(l, r)
}

fn is_reference_comparison(left: &TypeRef, right: &TypeRef) -> bool {
    left.is_reference() && right.is_reference()
}

/// Static result type of `left op right`, or a description of why the
/// operator does not apply.
pub fn binary_result_type(
    op: BinaryOperator,
    left: &TypeRef,
    right: &TypeRef,
    ts: &dyn HostTypeSystem,
) -> Result<TypeRef, String> {
    if left.is_void() || right.is_void() {
        return Err(incompatible(op.symbol(), left, right));
    }
    if op == BinaryOperator::Add && (left.is_string() || right.is_string()) {
        return Ok(TypeRef::string());
    }
    if matches!(op, BinaryOperator::Equal | BinaryOperator::NotEqual)
        && is_reference_comparison(left, right)
    {
        let comparable = types::is_castable(left, right, ts) || types::is_castable(right, left, ts);
        return if comparable {
            Ok(TypeRef::BOOLEAN)
        } else {
            Err(incompatible(op.symbol(), left, right))
        };
    }
    let kind = operand_kind(op, left, right).ok_or_else(|| incompatible(op.symbol(), left, right))?;
    let boolean_operands = kind == PrimitiveKind::Boolean;
    let result = match op {
        BinaryOperator::LogicalAnd | BinaryOperator::LogicalOr if boolean_operands => kind,
        BinaryOperator::BitwiseAnd | BinaryOperator::BitwiseXor | BinaryOperator::BitwiseOr
            if boolean_operands || kind.is_integral() =>
        {
            kind
        }
        BinaryOperator::Equal | BinaryOperator::NotEqual => PrimitiveKind::Boolean,
        _ if op.is_comparison() && !boolean_operands => PrimitiveKind::Boolean,
        _ if op.is_shift() => {
            let count_integral = right.unboxed().is_some_and(PrimitiveKind::is_integral);
            if !count_integral {
                return Err(incompatible(op.symbol(), left, right));
            }
            kind
        }
        BinaryOperator::Multiply
        | BinaryOperator::Divide
        | BinaryOperator::Modulo
        | BinaryOperator::Add
        | BinaryOperator::Subtract
            if !boolean_operands =>
        {
            kind
        }
        _ => return Err(incompatible(op.symbol(), left, right)),
    };
    Ok(TypeRef::Primitive(result))
}

fn unbox(value: &Value, op: &str) -> HostResult<Value> {
    match value {
        Value::Null => Err(HostError::NullPointer(format!(
            "Cannot unbox null value for operator '{op}'"
        ))),
        other if other.primitive_kind().is_some() => Ok(other.clone()),
        other => Err(HostError::IllegalArgument(format!(
            "Operator '{op}' cannot be applied to {other}"
        ))),
    }
}

fn shift(op: BinaryOperator, kind: PrimitiveKind, left: &Value, count: i64) -> HostResult<Value> {
    match (kind, types::convert_primitive(left, kind)) {
        (PrimitiveKind::Int, Value::Int(x)) => {
            let count = (count & 0x1f) as u32;
            Ok(Value::Int(match op {
                BinaryOperator::ShiftLeft => x.wrapping_shl(count),
                BinaryOperator::ShiftRight => x.wrapping_shr(count),
                _ => ((x as u32) >> count) as i32,
            }))
        }
        (PrimitiveKind::Long, Value::Long(x)) => {
            let count = (count & 0x3f) as u32;
            Ok(Value::Long(match op {
                BinaryOperator::ShiftLeft => x.wrapping_shl(count),
                BinaryOperator::ShiftRight => x.wrapping_shr(count),
                _ => ((x as u64) >> count) as i64,
            }))
        }
        _ => Err(operand_mismatch()),
    }
}

/// Evaluate `left op right`; the types are those the result type was computed
/// from. Conditional operators are evaluated fully here: short-circuiting is
/// the parser's job.
pub fn apply_binary(
    op: BinaryOperator,
    left: &Value,
    left_type: &TypeRef,
    right: &Value,
    right_type: &TypeRef,
    result_type: &TypeRef,
) -> HostResult<Value> {
    if op == BinaryOperator::Add && result_type.is_string() {
        let mut text = left.to_java_string();
        text.push_str(&right.to_java_string());
        return Ok(Value::string(text));
    }
    if matches!(op, BinaryOperator::Equal | BinaryOperator::NotEqual)
        && is_reference_comparison(left_type, right_type)
    {
        let same = left.same_reference(right);
        return Ok(Value::Boolean(same == (op == BinaryOperator::Equal)));
    }
    let left = unbox(left, op.symbol())?;
    let right = unbox(right, op.symbol())?;
    let kind = operand_kind(op, left_type, right_type).ok_or_else(operand_mismatch)?;
    if op.is_shift() {
        let count = right.as_i64().ok_or_else(operand_mismatch)?;
        return shift(op, kind, &left, count);
    }
    let function = NUMERIC_OPERATORS.get(&(op, kind)).ok_or_else(operand_mismatch)?;
    function(
        &types::convert_primitive(&left, kind),
        &types::convert_primitive(&right, kind),
    )
}

pub fn unary_result_type(op: UnaryOperator, operand: &TypeRef) -> Result<TypeRef, String> {
    let kind = operand.unboxed().filter(|k| *k != PrimitiveKind::Void);
    let result = match (op, kind) {
        (UnaryOperator::LogicalNot, Some(PrimitiveKind::Boolean)) => Some(PrimitiveKind::Boolean),
        (UnaryOperator::Plus | UnaryOperator::Minus, Some(kind)) => unary_numeric_promotion(kind),
        (UnaryOperator::BitwiseNot, Some(kind)) if kind.is_integral() => {
            unary_numeric_promotion(kind)
        }
        _ => None,
    };
    result
        .map(TypeRef::Primitive)
        .ok_or_else(|| format!("Operator '{}' cannot be applied to '{operand}'", op.symbol()))
}

pub fn apply_unary(op: UnaryOperator, operand: &Value, result_type: &TypeRef) -> HostResult<Value> {
    let value = unbox(operand, op.symbol())?;
    let kind = result_type.as_primitive().ok_or_else(operand_mismatch)?;
    let value = types::convert_primitive(&value, kind);
    match (op, value) {
        (UnaryOperator::LogicalNot, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOperator::Plus, value) => Ok(value),
        (UnaryOperator::Minus, Value::Int(v)) => Ok(Value::Int(v.wrapping_neg())),
        (UnaryOperator::Minus, Value::Long(v)) => Ok(Value::Long(v.wrapping_neg())),
        (UnaryOperator::Minus, Value::Float(v)) => Ok(Value::Float(-v)),
        (UnaryOperator::Minus, Value::Double(v)) => Ok(Value::Double(-v)),
        (UnaryOperator::BitwiseNot, Value::Int(v)) => Ok(Value::Int(!v)),
        (UnaryOperator::BitwiseNot, Value::Long(v)) => Ok(Value::Long(!v)),
        _ => Err(operand_mismatch()),
    }
}

/// Whether `value` of an `int`-typed constant fits a narrower integral target.
pub fn constant_fits(value: &Value, target: PrimitiveKind) -> bool {
    let Some(v) = value.as_i64() else {
        return false;
    };
    match target {
        PrimitiveKind::Byte => i8::try_from(v).is_ok(),
        PrimitiveKind::Short => i16::try_from(v).is_ok(),
        PrimitiveKind::Char => u16::try_from(v).is_ok(),
        PrimitiveKind::Int => i32::try_from(v).is_ok(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exprscope_api::{
        ClassInfo, ExecutableInfo, FieldInfo, InheritanceProvider, MemberProvider,
        PackageProvider, TypeProvider,
    };
    use std::sync::Arc;

    struct NoClasses;

    impl TypeProvider for NoClasses {
        fn class_info(&self, _fqn: &str) -> Option<ClassInfo> {
            None
        }
        fn inner_classes(&self, _fqn: &str) -> Vec<String> {
            vec![]
        }
    }
    impl PackageProvider for NoClasses {
        fn package_exists(&self, _package: &str) -> bool {
            false
        }
        fn subpackages(&self, _package: &str) -> Vec<String> {
            vec![]
        }
        fn classes_in_package(&self, _package: &str) -> Vec<String> {
            vec![]
        }
        fn all_top_level_classes(&self) -> Vec<String> {
            vec![]
        }
    }
    impl InheritanceProvider for NoClasses {
        fn superclass(&self, _fqn: &str) -> Option<String> {
            None
        }
        fn interfaces(&self, _fqn: &str) -> Vec<String> {
            vec![]
        }
    }
    impl MemberProvider for NoClasses {
        fn fields(&self, _fqn: &str) -> Vec<Arc<FieldInfo>> {
            vec![]
        }
        fn methods(&self, _fqn: &str) -> Vec<Arc<ExecutableInfo>> {
            vec![]
        }
        fn constructors(&self, _fqn: &str) -> Vec<Arc<ExecutableInfo>> {
            vec![]
        }
    }

    fn eval(op: BinaryOperator, left: Value, lt: TypeRef, right: Value, rt: TypeRef) -> Value {
        let result_type = binary_result_type(op, &lt, &rt, &NoClasses).unwrap();
        apply_binary(op, &left, &lt, &right, &rt, &result_type).unwrap()
    }

    #[test]
    fn test_promotion_result_types() {
        let ts = NoClasses;
        let add = BinaryOperator::Add;
        assert_eq!(binary_result_type(add, &TypeRef::BYTE, &TypeRef::SHORT, &ts), Ok(TypeRef::INT));
        assert_eq!(binary_result_type(add, &TypeRef::INT, &TypeRef::LONG, &ts), Ok(TypeRef::LONG));
        assert_eq!(
            binary_result_type(add, &TypeRef::LONG, &TypeRef::FLOAT, &ts),
            Ok(TypeRef::FLOAT)
        );
        assert_eq!(
            binary_result_type(add, &TypeRef::class("java.lang.Integer"), &TypeRef::DOUBLE, &ts),
            Ok(TypeRef::DOUBLE)
        );
        assert_eq!(
            binary_result_type(add, &TypeRef::BOOLEAN, &TypeRef::string(), &ts),
            Ok(TypeRef::string())
        );
        assert!(binary_result_type(add, &TypeRef::BOOLEAN, &TypeRef::INT, &ts).is_err());
        assert_eq!(
            binary_result_type(BinaryOperator::ShiftLeft, &TypeRef::BYTE, &TypeRef::LONG, &ts),
            Ok(TypeRef::INT)
        );
        assert!(
            binary_result_type(BinaryOperator::LogicalAnd, &TypeRef::INT, &TypeRef::INT, &ts)
                .is_err()
        );
        assert_eq!(
            binary_result_type(BinaryOperator::BitwiseAnd, &TypeRef::BOOLEAN, &TypeRef::BOOLEAN, &ts),
            Ok(TypeRef::BOOLEAN)
        );
    }

    #[test]
    fn test_integer_arithmetic_wraps_and_truncates() {
        let r = eval(BinaryOperator::Add, Value::Int(i32::MAX), TypeRef::INT, Value::Int(1), TypeRef::INT);
        assert!(matches!(r, Value::Int(i32::MIN)));
        let r = eval(BinaryOperator::Divide, Value::Int(-7), TypeRef::INT, Value::Int(2), TypeRef::INT);
        assert!(matches!(r, Value::Int(-3)));
        let r = eval(BinaryOperator::Modulo, Value::Int(-7), TypeRef::INT, Value::Int(2), TypeRef::INT);
        assert!(matches!(r, Value::Int(-1)));
        let r = eval(BinaryOperator::Divide, Value::Int(7), TypeRef::INT, Value::Double(2.0), TypeRef::DOUBLE);
        assert!(matches!(r, Value::Double(v) if v == 3.5));
    }

    #[test]
    fn test_integer_division_by_zero_is_host_exception() {
        let result_type =
            binary_result_type(BinaryOperator::Divide, &TypeRef::INT, &TypeRef::INT, &NoClasses).unwrap();
        let err = apply_binary(
            BinaryOperator::Divide,
            &Value::Int(1),
            &TypeRef::INT,
            &Value::Int(0),
            &TypeRef::INT,
            &result_type,
        )
        .unwrap_err();
        assert!(matches!(err, HostError::Exception { ref class, .. } if class == "java.lang.ArithmeticException"));
        let r = eval(BinaryOperator::Divide, Value::Double(1.0), TypeRef::DOUBLE, Value::Int(0), TypeRef::INT);
        assert!(matches!(r, Value::Double(v) if v.is_infinite()));
    }

    #[test]
    fn test_string_concatenation_left_to_right() {
        let nine = eval(BinaryOperator::Add, Value::Int(5), TypeRef::INT, Value::Int(4), TypeRef::INT);
        let r = eval(BinaryOperator::Add, nine, TypeRef::INT, Value::string("Test"), TypeRef::string());
        assert_eq!(r.as_str(), Some("9Test"));
        let r = eval(BinaryOperator::Add, Value::string("c="), TypeRef::string(), Value::Char(u16::from(b'x')), TypeRef::CHAR);
        assert_eq!(r.as_str(), Some("c=x"));
    }

    #[test]
    fn test_shifts() {
        let r = eval(BinaryOperator::ShiftLeft, Value::Int(1), TypeRef::INT, Value::Int(33), TypeRef::INT);
        assert!(matches!(r, Value::Int(2)));
        let r = eval(BinaryOperator::UnsignedShiftRight, Value::Int(-1), TypeRef::INT, Value::Int(28), TypeRef::INT);
        assert!(matches!(r, Value::Int(15)));
        let r = eval(BinaryOperator::ShiftRight, Value::Long(-16), TypeRef::LONG, Value::Int(2), TypeRef::INT);
        assert!(matches!(r, Value::Long(-4)));
    }

    #[test]
    fn test_equality_unboxes_when_one_side_is_primitive() {
        let integer = TypeRef::class("java.lang.Integer");
        let r = eval(BinaryOperator::Equal, Value::Int(1000), integer.clone(), Value::Int(1000), TypeRef::INT);
        assert!(matches!(r, Value::Boolean(true)));
        let r = eval(BinaryOperator::Equal, Value::Char(97), TypeRef::CHAR, Value::Int(97), TypeRef::INT);
        assert!(matches!(r, Value::Boolean(true)));
        let a = Value::string("a");
        let r = eval(BinaryOperator::Equal, a.clone(), TypeRef::string(), Value::string("a"), TypeRef::string());
        assert!(matches!(r, Value::Boolean(false)));
        let r = eval(BinaryOperator::NotEqual, a.clone(), TypeRef::string(), a, TypeRef::string());
        assert!(matches!(r, Value::Boolean(false)));
        let r = eval(BinaryOperator::Equal, Value::Null, TypeRef::Null, Value::Null, TypeRef::Null);
        assert!(matches!(r, Value::Boolean(true)));
    }

    #[test]
    fn test_unboxing_null_is_null_pointer() {
        let integer = TypeRef::class("java.lang.Integer");
        let result_type = binary_result_type(BinaryOperator::Add, &integer, &TypeRef::INT, &NoClasses).unwrap();
        let err = apply_binary(BinaryOperator::Add, &Value::Null, &integer, &Value::Int(1), &TypeRef::INT, &result_type)
            .unwrap_err();
        assert!(matches!(err, HostError::NullPointer(_)));
    }

    #[test]
    fn test_unary_operators() {
        let ty = unary_result_type(UnaryOperator::Minus, &TypeRef::BYTE).unwrap();
        assert_eq!(ty, TypeRef::INT);
        assert!(matches!(apply_unary(UnaryOperator::Minus, &Value::Byte(5), &ty), Ok(Value::Int(-5))));
        let ty = unary_result_type(UnaryOperator::LogicalNot, &TypeRef::BOOLEAN).unwrap();
        assert!(matches!(apply_unary(UnaryOperator::LogicalNot, &Value::Boolean(true), &ty), Ok(Value::Boolean(false))));
        assert!(unary_result_type(UnaryOperator::BitwiseNot, &TypeRef::DOUBLE).is_err());
        assert!(unary_result_type(UnaryOperator::LogicalNot, &TypeRef::INT).is_err());
    }

    #[test]
    fn test_compound_operator_symbols() {
        assert_eq!(compound_operator("+="), Some(BinaryOperator::Add));
        assert_eq!(compound_operator(">>>="), Some(BinaryOperator::UnsignedShiftRight));
        assert_eq!(compound_operator("="), None);
        assert!(constant_fits(&Value::Int(100), PrimitiveKind::Byte));
        assert!(!constant_fits(&Value::Int(300), PrimitiveKind::Byte));
    }
}
