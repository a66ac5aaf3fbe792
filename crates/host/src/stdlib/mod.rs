//! Bundled subset of the Java standard library.
//!
//! Values are the engine's own payloads: a `java.lang.String` is
//! [`Value::Str`], boxed numbers are primitive payloads, and mutable library
//! objects are the types in [`crate::object`].

mod function;
mod lang;
mod util;

use crate::RegistryBuilder;
use crate::object::StringBuffer;
use exprscope_api::{HostError, HostResult, Value};
use std::cmp::Ordering;
use std::sync::Arc;

pub const STRING_BUILDER: &str = "java.lang.StringBuilder";
pub const ARRAY_LIST: &str = "java.util.ArrayList";

pub(crate) fn install(builder: RegistryBuilder) -> RegistryBuilder {
    let builder = lang::install(builder);
    let builder = util::install(builder);
    function::install(builder)
}

fn arg(args: &[Value], index: usize) -> HostResult<&Value> {
    args.get(index)
        .ok_or_else(|| HostError::IllegalArgument(format!("missing argument {index}")))
}

fn mismatch(what: &str, value: &Value) -> HostError {
    HostError::IllegalArgument(format!("expected {what}, got {value}"))
}

fn int_arg(args: &[Value], index: usize) -> HostResult<i32> {
    let value = arg(args, index)?;
    number_as_i64(value)
        .map(|v| v as i32)
        .ok_or_else(|| mismatch("an int", value))
}

fn long_arg(args: &[Value], index: usize) -> HostResult<i64> {
    let value = arg(args, index)?;
    number_as_i64(value).ok_or_else(|| mismatch("a long", value))
}

fn double_arg(args: &[Value], index: usize) -> HostResult<f64> {
    let value = arg(args, index)?;
    value.as_f64().ok_or_else(|| mismatch("a double", value))
}

fn bool_arg(args: &[Value], index: usize) -> HostResult<bool> {
    let value = arg(args, index)?;
    value.as_bool().ok_or_else(|| mismatch("a boolean", value))
}

fn char_arg(args: &[Value], index: usize) -> HostResult<u16> {
    match arg(args, index)? {
        Value::Char(c) => Ok(*c),
        other => Err(mismatch("a char", other)),
    }
}

/// String argument; `null` raises a `NullPointerException`.
fn str_arg(args: &[Value], index: usize) -> HostResult<&str> {
    as_str(arg(args, index)?)
}

fn as_str(value: &Value) -> HostResult<&str> {
    match value {
        Value::Str(s) => Ok(s),
        Value::Null => Err(HostError::NullPointer("string argument is null".to_string())),
        other => Err(mismatch("a String", other)),
    }
}

/// Text of any `CharSequence` implementation.
fn char_sequence(value: &Value) -> HostResult<String> {
    match value {
        Value::Str(s) => Ok(s.to_string()),
        Value::Object(object) => match object.downcast_ref::<StringBuffer>() {
            Some(buffer) => Ok(buffer.contents()),
            None => Err(mismatch("a CharSequence", value)),
        },
        Value::Null => Err(HostError::NullPointer(
            "char sequence is null".to_string(),
        )),
        other => Err(mismatch("a CharSequence", other)),
    }
}

/// Integral view of a numeric payload; floating values truncate toward zero.
fn number_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Float(v) => Some(*v as i64),
        Value::Double(v) => Some(*v as i64),
        other => other.as_i64(),
    }
}

fn utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

fn from_utf16(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

fn int(value: usize) -> Value {
    Value::Int(i32::try_from(value).unwrap_or(i32::MAX))
}

fn number_format(input: &str) -> HostError {
    HostError::exception(
        "java.lang.NumberFormatException",
        format!("For input string: \"{input}\""),
    )
}

/// `Object.equals` semantics: strings by content, boxed payloads by kind and
/// value, everything else by identity.
pub fn java_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Double(x), Value::Double(y)) => x.to_bits() == y.to_bits(),
        (Value::Float(x), Value::Float(y)) => x.to_bits() == y.to_bits(),
        _ => a.same_reference(b),
    }
}

/// `Object.hashCode` semantics for the built-in payloads.
pub fn java_hash(value: &Value) -> i32 {
    match value {
        Value::Null => 0,
        Value::Boolean(b) => {
            if *b {
                1231
            } else {
                1237
            }
        }
        Value::Char(c) => i32::from(*c),
        Value::Byte(v) => i32::from(*v),
        Value::Short(v) => i32::from(*v),
        Value::Int(v) => *v,
        Value::Long(v) => (*v ^ ((*v as u64) >> 32) as i64) as i32,
        Value::Float(v) => v.to_bits() as i32,
        Value::Double(v) => {
            let bits = v.to_bits();
            (bits ^ (bits >> 32)) as i32
        }
        Value::Str(s) => s
            .encode_utf16()
            .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit))),
        Value::Array(array) => Arc::as_ptr(array) as usize as i32,
        Value::Object(object) => Arc::as_ptr(&object.0) as *const () as usize as i32,
        Value::Lambda(callable) => Arc::as_ptr(callable) as *const () as usize as i32,
    }
}

/// Natural ordering of comparable payloads (`Comparable.compareTo`).
fn compare_values(a: &Value, b: &Value) -> HostResult<i32> {
    let ordering = match (a, b) {
        (Value::Str(x), Value::Str(y)) => return Ok(compare_strings(x, y)),
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (x, y) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => {
                    return Err(HostError::exception(
                        "java.lang.ClassCastException",
                        format!("{} cannot be compared to {}", x.runtime_type(), y.runtime_type()),
                    ));
                }
            },
        },
    };
    Ok(match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    })
}

/// `String.compareTo`: first differing UTF-16 unit, else the length difference.
fn compare_strings(a: &str, b: &str) -> i32 {
    let (a, b) = (utf16(a), utf16(b));
    a.iter()
        .zip(&b)
        .find(|(x, y)| x != y)
        .map(|(x, y)| i32::from(*x) - i32::from(*y))
        .unwrap_or_else(|| a.len() as i32 - b.len() as i32)
}

/// Invoke a functional-interface value supplied by the caller.
fn call_functional(function: &Value, args: &[Value]) -> HostResult<Value> {
    match function {
        Value::Lambda(callable) => callable.call(args),
        Value::Null => Err(HostError::NullPointer(
            "functional argument is null".to_string(),
        )),
        other => Err(HostError::Unsupported(format!(
            "{} cannot be called as a function",
            other.runtime_type()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_java_hash_of_strings() {
        assert_eq!(java_hash(&Value::string("")), 0);
        assert_eq!(java_hash(&Value::string("ab")), 97 * 31 + 98);
        assert_eq!(java_hash(&Value::Boolean(true)), 1231);
    }

    #[test]
    fn test_equality_and_ordering() {
        assert!(java_equals(&Value::string("a"), &Value::string("a")));
        assert!(!java_equals(&Value::Int(1), &Value::Long(1)));
        assert_eq!(compare_strings("apple", "apricot"), i32::from(b'p') - i32::from(b'r'));
        assert_eq!(compare_strings("ab", "abc"), -1);
        assert_eq!(compare_values(&Value::Int(3), &Value::Int(2)).unwrap(), 1);
        assert!(compare_values(&Value::Int(3), &Value::string("x")).is_err());
    }
}
