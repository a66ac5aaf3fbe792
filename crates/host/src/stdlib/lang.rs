//! `java.lang`: Object, String, boxed types, Math and StringBuilder.

use super::{
    arg, bool_arg, call_functional, char_arg, char_sequence, compare_strings, compare_values,
    double_arg, from_utf16, int, int_arg, java_equals, java_hash, long_arg, number_as_i64,
    number_format, str_arg, utf16, STRING_BUILDER,
};
use crate::object::StringBuffer;
use crate::{ClassBuilder, RegistryBuilder};
use exprscope_api::{
    HostError, HostResult, OBJECT_CLASS, PrimitiveKind, STRING_CLASS, TypeRef, Value,
};

const CHAR_SEQUENCE: &str = "java.lang.CharSequence";
const COMPARABLE: &str = "java.lang.Comparable";
const NUMBER: &str = "java.lang.Number";

pub(super) fn install(builder: RegistryBuilder) -> RegistryBuilder {
    let builder = builder
        .class(object())
        .class(comparable())
        .class(char_sequence_interface())
        .class(string())
        .class(number())
        .class(boolean())
        .class(character())
        .class(math())
        .class(string_builder())
        .class(
            ClassBuilder::interface("java.lang.Runnable").abstract_method("run", &[], TypeRef::VOID),
        );
    integral_boxes(builder)
}

fn object() -> ClassBuilder {
    ClassBuilder::class(OBJECT_CLASS)
        .constructor(&[], |_| Ok(Value::object(crate::Instance::new(OBJECT_CLASS))))
        .method("toString", &[], TypeRef::string(), |receiver, _| {
            Ok(Value::string(receiver.to_java_string()))
        })
        .method("equals", &[TypeRef::object()], TypeRef::BOOLEAN, |receiver, args| {
            Ok(Value::Boolean(java_equals(receiver, arg(args, 0)?)))
        })
        .method("hashCode", &[], TypeRef::INT, |receiver, _| {
            Ok(Value::Int(java_hash(receiver)))
        })
}

fn comparable() -> ClassBuilder {
    ClassBuilder::interface(COMPARABLE).interface_method(
        "compareTo",
        &[TypeRef::object()],
        TypeRef::INT,
        |receiver, args| match receiver {
            Value::Lambda(_) => call_functional(receiver, args),
            _ => compare_values(receiver, arg(args, 0)?).map(Value::Int),
        },
    )
}

fn char_sequence_interface() -> ClassBuilder {
    ClassBuilder::interface(CHAR_SEQUENCE)
        .interface_method("length", &[], TypeRef::INT, |receiver, _| {
            Ok(int(utf16(&char_sequence(receiver)?).len()))
        })
        .interface_method("charAt", &[TypeRef::INT], TypeRef::CHAR, |receiver, args| {
            char_at(&char_sequence(receiver)?, int_arg(args, 0)?)
        })
        .method("isEmpty", &[], TypeRef::BOOLEAN, |receiver, _| {
            Ok(Value::Boolean(char_sequence(receiver)?.is_empty()))
        })
}

fn receiver_str(receiver: &Value) -> HostResult<&str> {
    match receiver {
        Value::Str(s) => Ok(s),
        other => Err(HostError::IllegalArgument(format!(
            "String method called on {other}"
        ))),
    }
}

fn char_at(text: &str, index: i32) -> HostResult<Value> {
    let units = utf16(text);
    usize::try_from(index)
        .ok()
        .and_then(|i| units.get(i))
        .map(|unit| Value::Char(*unit))
        .ok_or_else(|| {
            HostError::exception(
                "java.lang.StringIndexOutOfBoundsException",
                format!("Index {index} out of bounds for length {}", units.len()),
            )
        })
}

fn substring(text: &str, begin: i32, end: Option<i32>) -> HostResult<Value> {
    let units = utf16(text);
    let len = units.len();
    let end = end.unwrap_or(len as i32);
    let range = usize::try_from(begin)
        .ok()
        .zip(usize::try_from(end).ok())
        .filter(|(b, e)| b <= e && *e <= len);
    match range {
        Some((b, e)) => Ok(Value::string(from_utf16(&units[b..e]))),
        None => Err(HostError::exception(
            "java.lang.StringIndexOutOfBoundsException",
            format!("begin {begin}, end {end}, length {len}"),
        )),
    }
}

fn index_of(haystack: &str, needle: &str) -> i32 {
    let (haystack, needle) = (utf16(haystack), utf16(needle));
    if needle.is_empty() {
        return 0;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle.as_slice())
        .map_or(-1, |i| i as i32)
}

fn string() -> ClassBuilder {
    let cs = TypeRef::class(CHAR_SEQUENCE);
    let s = TypeRef::string;
    let mut builder = ClassBuilder::class(STRING_CLASS)
        .final_class()
        .implements(CHAR_SEQUENCE)
        .implements(COMPARABLE)
        .constructor(&[], |_| Ok(Value::string("")))
        .constructor(&[s()], |args| Ok(Value::string(str_arg(args, 0)?)))
        .method("length", &[], TypeRef::INT, |receiver, _| {
            Ok(int(utf16(receiver_str(receiver)?).len()))
        })
        .method("charAt", &[TypeRef::INT], TypeRef::CHAR, |receiver, args| {
            char_at(receiver_str(receiver)?, int_arg(args, 0)?)
        })
        .method("isEmpty", &[], TypeRef::BOOLEAN, |receiver, _| {
            Ok(Value::Boolean(receiver_str(receiver)?.is_empty()))
        })
        .method("substring", &[TypeRef::INT], s(), |receiver, args| {
            substring(receiver_str(receiver)?, int_arg(args, 0)?, None)
        })
        .method("substring", &[TypeRef::INT, TypeRef::INT], s(), |receiver, args| {
            substring(receiver_str(receiver)?, int_arg(args, 0)?, Some(int_arg(args, 1)?))
        })
        .method("indexOf", &[s()], TypeRef::INT, |receiver, args| {
            Ok(Value::Int(index_of(receiver_str(receiver)?, str_arg(args, 0)?)))
        })
        .method("contains", &[cs.clone()], TypeRef::BOOLEAN, |receiver, args| {
            let needle = char_sequence(arg(args, 0)?)?;
            Ok(Value::Boolean(receiver_str(receiver)?.contains(needle.as_str())))
        })
        .method("startsWith", &[s()], TypeRef::BOOLEAN, |receiver, args| {
            Ok(Value::Boolean(receiver_str(receiver)?.starts_with(str_arg(args, 0)?)))
        })
        .method("endsWith", &[s()], TypeRef::BOOLEAN, |receiver, args| {
            Ok(Value::Boolean(receiver_str(receiver)?.ends_with(str_arg(args, 0)?)))
        })
        .method("toUpperCase", &[], s(), |receiver, _| {
            Ok(Value::string(receiver_str(receiver)?.to_uppercase()))
        })
        .method("toLowerCase", &[], s(), |receiver, _| {
            Ok(Value::string(receiver_str(receiver)?.to_lowercase()))
        })
        .method("trim", &[], s(), |receiver, _| {
            Ok(Value::string(
                receiver_str(receiver)?.trim_matches(|c: char| c <= ' '),
            ))
        })
        .method("concat", &[s()], s(), |receiver, args| {
            Ok(Value::string(format!("{}{}", receiver_str(receiver)?, str_arg(args, 0)?)))
        })
        .method("replace", &[cs.clone(), cs.clone()], s(), |receiver, args| {
            let from = char_sequence(arg(args, 0)?)?;
            let to = char_sequence(arg(args, 1)?)?;
            Ok(Value::string(receiver_str(receiver)?.replace(&from, &to)))
        })
        .method("equals", &[TypeRef::object()], TypeRef::BOOLEAN, |receiver, args| {
            Ok(Value::Boolean(java_equals(receiver, arg(args, 0)?)))
        })
        .method("equalsIgnoreCase", &[s()], TypeRef::BOOLEAN, |receiver, args| {
            let other = match arg(args, 0)? {
                Value::Str(other) => other.to_lowercase(),
                _ => return Ok(Value::Boolean(false)),
            };
            Ok(Value::Boolean(receiver_str(receiver)?.to_lowercase() == other))
        })
        .method("compareTo", &[s()], TypeRef::INT, |receiver, args| {
            Ok(Value::Int(compare_strings(receiver_str(receiver)?, str_arg(args, 0)?)))
        })
        .method("toString", &[], s(), |receiver, _| Ok(receiver.clone()))
        .static_method("join", &[cs.clone(), TypeRef::array_of(cs.clone())], s(), |args| {
            let delimiter = char_sequence(arg(args, 0)?)?;
            let parts = match arg(args, 1)? {
                Value::Array(array) => array
                    .to_vec()
                    .iter()
                    .map(|part| match part {
                        Value::Null => Ok("null".to_string()),
                        other => char_sequence(other),
                    })
                    .collect::<HostResult<Vec<_>>>()?,
                other => return Err(super::mismatch("an array", other)),
            };
            Ok(Value::string(parts.join(&delimiter)))
        })
        .varargs();
    // valueOf overloads differ only in the parameter type
    for ty in [
        TypeRef::object(),
        TypeRef::INT,
        TypeRef::LONG,
        TypeRef::DOUBLE,
        TypeRef::BOOLEAN,
        TypeRef::CHAR,
    ] {
        builder = builder.static_method("valueOf", &[ty], s(), |args| {
            Ok(Value::string(arg(args, 0)?.to_java_string()))
        });
    }
    builder
}

fn number() -> ClassBuilder {
    let mut builder = ClassBuilder::class(NUMBER).abstract_class();
    for kind in [
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Double,
        PrimitiveKind::Float,
        PrimitiveKind::Short,
        PrimitiveKind::Byte,
    ] {
        let name = format!("{}Value", kind.name());
        builder = builder.method(&name, &[], TypeRef::Primitive(kind), move |receiver, _| {
            convert_number(receiver, kind)
        });
    }
    builder
}

fn convert_number(value: &Value, kind: PrimitiveKind) -> HostResult<Value> {
    let mismatch = || super::mismatch("a number", value);
    Ok(match kind {
        PrimitiveKind::Double => Value::Double(value.as_f64().ok_or_else(mismatch)?),
        PrimitiveKind::Float => Value::Float(value.as_f64().ok_or_else(mismatch)? as f32),
        _ => {
            let v = number_as_i64(value).ok_or_else(mismatch)?;
            match kind {
                PrimitiveKind::Long => Value::Long(v),
                PrimitiveKind::Short => Value::Short(v as i16),
                PrimitiveKind::Byte => Value::Byte(v as i8),
                _ => Value::Int(v as i32),
            }
        }
    })
}

/// Boxed numeric classes: constants, parsing and comparison.
fn integral_boxes(builder: RegistryBuilder) -> RegistryBuilder {
    let s = TypeRef::string;
    let integer = ClassBuilder::class("java.lang.Integer")
        .final_class()
        .extends(NUMBER)
        .implements(COMPARABLE)
        .constant("MAX_VALUE", TypeRef::INT, Value::Int(i32::MAX))
        .constant("MIN_VALUE", TypeRef::INT, Value::Int(i32::MIN))
        .static_method("parseInt", &[s()], TypeRef::INT, |args| {
            let text = str_arg(args, 0)?;
            text.parse::<i32>().map(Value::Int).map_err(|_| number_format(text))
        })
        .static_method("valueOf", &[TypeRef::INT], TypeRef::class("java.lang.Integer"), |args| {
            Ok(Value::Int(int_arg(args, 0)?))
        })
        .static_method("toString", &[TypeRef::INT], s(), |args| {
            Ok(Value::string(int_arg(args, 0)?.to_string()))
        })
        .static_method("compare", &[TypeRef::INT, TypeRef::INT], TypeRef::INT, |args| {
            Ok(Value::Int(int_arg(args, 0)?.cmp(&int_arg(args, 1)?) as i32))
        })
        .static_method("toBinaryString", &[TypeRef::INT], s(), |args| {
            Ok(Value::string(format!("{:b}", int_arg(args, 0)?)))
        })
        .static_method("toHexString", &[TypeRef::INT], s(), |args| {
            Ok(Value::string(format!("{:x}", int_arg(args, 0)?)))
        });
    let long = ClassBuilder::class("java.lang.Long")
        .final_class()
        .extends(NUMBER)
        .implements(COMPARABLE)
        .constant("MAX_VALUE", TypeRef::LONG, Value::Long(i64::MAX))
        .constant("MIN_VALUE", TypeRef::LONG, Value::Long(i64::MIN))
        .static_method("parseLong", &[s()], TypeRef::LONG, |args| {
            let text = str_arg(args, 0)?;
            text.parse::<i64>().map(Value::Long).map_err(|_| number_format(text))
        })
        .static_method("valueOf", &[TypeRef::LONG], TypeRef::class("java.lang.Long"), |args| {
            Ok(Value::Long(long_arg(args, 0)?))
        })
        .static_method("compare", &[TypeRef::LONG, TypeRef::LONG], TypeRef::INT, |args| {
            Ok(Value::Int(long_arg(args, 0)?.cmp(&long_arg(args, 1)?) as i32))
        });
    let double = ClassBuilder::class("java.lang.Double")
        .final_class()
        .extends(NUMBER)
        .implements(COMPARABLE)
        .constant("MAX_VALUE", TypeRef::DOUBLE, Value::Double(f64::MAX))
        .constant("MIN_VALUE", TypeRef::DOUBLE, Value::Double(f64::from_bits(1)))
        .constant("NaN", TypeRef::DOUBLE, Value::Double(f64::NAN))
        .constant("POSITIVE_INFINITY", TypeRef::DOUBLE, Value::Double(f64::INFINITY))
        .constant("NEGATIVE_INFINITY", TypeRef::DOUBLE, Value::Double(f64::NEG_INFINITY))
        .static_method("parseDouble", &[s()], TypeRef::DOUBLE, |args| {
            let text = str_arg(args, 0)?;
            text.trim().parse::<f64>().map(Value::Double).map_err(|_| number_format(text))
        })
        .static_method("valueOf", &[TypeRef::DOUBLE], TypeRef::class("java.lang.Double"), |args| {
            Ok(Value::Double(double_arg(args, 0)?))
        })
        .static_method("isNaN", &[TypeRef::DOUBLE], TypeRef::BOOLEAN, |args| {
            Ok(Value::Boolean(double_arg(args, 0)?.is_nan()))
        })
        .method("isNaN", &[], TypeRef::BOOLEAN, |receiver, _| {
            Ok(Value::Boolean(receiver.as_f64().is_some_and(f64::is_nan)))
        })
        .static_method("compare", &[TypeRef::DOUBLE, TypeRef::DOUBLE], TypeRef::INT, |args| {
            Ok(Value::Int(double_arg(args, 0)?.total_cmp(&double_arg(args, 1)?) as i32))
        });
    let float = ClassBuilder::class("java.lang.Float")
        .final_class()
        .extends(NUMBER)
        .implements(COMPARABLE)
        .constant("MAX_VALUE", TypeRef::FLOAT, Value::Float(f32::MAX))
        .constant("MIN_VALUE", TypeRef::FLOAT, Value::Float(f32::from_bits(1)))
        .static_method("parseFloat", &[s()], TypeRef::FLOAT, |args| {
            let text = str_arg(args, 0)?;
            text.trim().parse::<f32>().map(Value::Float).map_err(|_| number_format(text))
        });
    let short = ClassBuilder::class("java.lang.Short")
        .final_class()
        .extends(NUMBER)
        .implements(COMPARABLE)
        .constant("MAX_VALUE", TypeRef::SHORT, Value::Short(i16::MAX))
        .constant("MIN_VALUE", TypeRef::SHORT, Value::Short(i16::MIN))
        .static_method("parseShort", &[s()], TypeRef::SHORT, |args| {
            let text = str_arg(args, 0)?;
            text.parse::<i16>().map(Value::Short).map_err(|_| number_format(text))
        });
    let byte = ClassBuilder::class("java.lang.Byte")
        .final_class()
        .extends(NUMBER)
        .implements(COMPARABLE)
        .constant("MAX_VALUE", TypeRef::BYTE, Value::Byte(i8::MAX))
        .constant("MIN_VALUE", TypeRef::BYTE, Value::Byte(i8::MIN))
        .static_method("parseByte", &[s()], TypeRef::BYTE, |args| {
            let text = str_arg(args, 0)?;
            text.parse::<i8>().map(Value::Byte).map_err(|_| number_format(text))
        });
    builder
        .class(integer)
        .class(long)
        .class(double)
        .class(float)
        .class(short)
        .class(byte)
}

fn boolean() -> ClassBuilder {
    let boxed = TypeRef::class("java.lang.Boolean");
    ClassBuilder::class("java.lang.Boolean")
        .final_class()
        .implements(COMPARABLE)
        .constant("TRUE", boxed.clone(), Value::Boolean(true))
        .constant("FALSE", boxed.clone(), Value::Boolean(false))
        .static_method("parseBoolean", &[TypeRef::string()], TypeRef::BOOLEAN, |args| {
            Ok(Value::Boolean(match arg(args, 0)? {
                Value::Str(s) => s.eq_ignore_ascii_case("true"),
                _ => false,
            }))
        })
        .static_method("valueOf", &[TypeRef::BOOLEAN], boxed, |args| {
            Ok(Value::Boolean(bool_arg(args, 0)?))
        })
        .method("booleanValue", &[], TypeRef::BOOLEAN, |receiver, _| {
            receiver
                .as_bool()
                .map(Value::Boolean)
                .ok_or_else(|| super::mismatch("a boolean", receiver))
        })
}

fn map_char(args: &[Value], f: impl Fn(char) -> bool) -> HostResult<Value> {
    let c = char_arg(args, 0)?;
    Ok(Value::Boolean(
        char::from_u32(u32::from(c)).is_some_and(f),
    ))
}

fn convert_case(args: &[Value], upper: bool) -> HostResult<Value> {
    let unit = char_arg(args, 0)?;
    let converted = char::from_u32(u32::from(unit))
        .map(|c| {
            let mapped: Vec<char> = if upper {
                c.to_uppercase().collect()
            } else {
                c.to_lowercase().collect()
            };
            match mapped.as_slice() {
                [single] => *single,
                _ => c,
            }
        })
        .and_then(|c| u16::try_from(u32::from(c)).ok())
        .unwrap_or(unit);
    Ok(Value::Char(converted))
}

fn character() -> ClassBuilder {
    ClassBuilder::class("java.lang.Character")
        .final_class()
        .implements(COMPARABLE)
        .constant("MAX_VALUE", TypeRef::CHAR, Value::Char(u16::MAX))
        .constant("MIN_VALUE", TypeRef::CHAR, Value::Char(0))
        .static_method("isDigit", &[TypeRef::CHAR], TypeRef::BOOLEAN, |args| {
            map_char(args, |c| c.is_ascii_digit())
        })
        .static_method("isLetter", &[TypeRef::CHAR], TypeRef::BOOLEAN, |args| {
            map_char(args, char::is_alphabetic)
        })
        .static_method("isWhitespace", &[TypeRef::CHAR], TypeRef::BOOLEAN, |args| {
            map_char(args, char::is_whitespace)
        })
        .static_method("toUpperCase", &[TypeRef::CHAR], TypeRef::CHAR, |args| {
            convert_case(args, true)
        })
        .static_method("toLowerCase", &[TypeRef::CHAR], TypeRef::CHAR, |args| {
            convert_case(args, false)
        })
        .method("charValue", &[], TypeRef::CHAR, |receiver, _| match receiver {
            Value::Char(c) => Ok(Value::Char(*c)),
            other => Err(super::mismatch("a char", other)),
        })
}

fn math() -> ClassBuilder {
    let (i, l, d) = (TypeRef::INT, TypeRef::LONG, TypeRef::DOUBLE);
    ClassBuilder::class("java.lang.Math")
        .final_class()
        .constant("PI", d.clone(), Value::Double(std::f64::consts::PI))
        .constant("E", d.clone(), Value::Double(std::f64::consts::E))
        .static_method("abs", &[i.clone()], i.clone(), |args| {
            Ok(Value::Int(int_arg(args, 0)?.wrapping_abs()))
        })
        .static_method("abs", &[l.clone()], l.clone(), |args| {
            Ok(Value::Long(long_arg(args, 0)?.wrapping_abs()))
        })
        .static_method("abs", &[d.clone()], d.clone(), |args| {
            Ok(Value::Double(double_arg(args, 0)?.abs()))
        })
        .static_method("max", &[i.clone(), i.clone()], i.clone(), |args| {
            Ok(Value::Int(int_arg(args, 0)?.max(int_arg(args, 1)?)))
        })
        .static_method("max", &[l.clone(), l.clone()], l.clone(), |args| {
            Ok(Value::Long(long_arg(args, 0)?.max(long_arg(args, 1)?)))
        })
        .static_method("max", &[d.clone(), d.clone()], d.clone(), |args| {
            Ok(Value::Double(double_arg(args, 0)?.max(double_arg(args, 1)?)))
        })
        .static_method("min", &[i.clone(), i.clone()], i.clone(), |args| {
            Ok(Value::Int(int_arg(args, 0)?.min(int_arg(args, 1)?)))
        })
        .static_method("min", &[l.clone(), l.clone()], l.clone(), |args| {
            Ok(Value::Long(long_arg(args, 0)?.min(long_arg(args, 1)?)))
        })
        .static_method("min", &[d.clone(), d.clone()], d.clone(), |args| {
            Ok(Value::Double(double_arg(args, 0)?.min(double_arg(args, 1)?)))
        })
        .static_method("addExact", &[i.clone(), i.clone()], i.clone(), |args| {
            int_arg(args, 0)?
                .checked_add(int_arg(args, 1)?)
                .map(Value::Int)
                .ok_or_else(|| HostError::exception("java.lang.ArithmeticException", "integer overflow"))
        })
        .static_method("sqrt", &[d.clone()], d.clone(), |args| {
            Ok(Value::Double(double_arg(args, 0)?.sqrt()))
        })
        .static_method("pow", &[d.clone(), d.clone()], d.clone(), |args| {
            Ok(Value::Double(double_arg(args, 0)?.powf(double_arg(args, 1)?)))
        })
        .static_method("floor", &[d.clone()], d.clone(), |args| {
            Ok(Value::Double(double_arg(args, 0)?.floor()))
        })
        .static_method("ceil", &[d.clone()], d.clone(), |args| {
            Ok(Value::Double(double_arg(args, 0)?.ceil()))
        })
        .static_method("round", &[d.clone()], l, |args| {
            let value = double_arg(args, 0)?;
            Ok(Value::Long(if value.is_nan() { 0 } else { (value + 0.5).floor() as i64 }))
        })
        .static_method("signum", &[d.clone()], d, |args| {
            let value = double_arg(args, 0)?;
            Ok(Value::Double(if value == 0.0 || value.is_nan() { value } else { value.signum() }))
        })
}

fn buffer_of(receiver: &Value) -> HostResult<&StringBuffer> {
    match receiver {
        Value::Object(object) => object
            .downcast_ref::<StringBuffer>()
            .ok_or_else(|| super::mismatch("a StringBuilder", receiver)),
        other => Err(super::mismatch("a StringBuilder", other)),
    }
}

fn string_builder() -> ClassBuilder {
    let this = TypeRef::class(STRING_BUILDER);
    let mut builder = ClassBuilder::class(STRING_BUILDER)
        .final_class()
        .implements(CHAR_SEQUENCE)
        .constructor(&[], |_| Ok(Value::object(StringBuffer::default())))
        .constructor(&[TypeRef::INT], |_| Ok(Value::object(StringBuffer::default())))
        .constructor(&[TypeRef::string()], |args| {
            Ok(Value::object(StringBuffer::new(str_arg(args, 0)?)))
        })
        .method("length", &[], TypeRef::INT, |receiver, _| {
            Ok(int(utf16(&buffer_of(receiver)?.contents()).len()))
        })
        .method("charAt", &[TypeRef::INT], TypeRef::CHAR, |receiver, args| {
            char_at(&buffer_of(receiver)?.contents(), int_arg(args, 0)?)
        })
        .method("reverse", &[], this.clone(), |receiver, _| {
            let buffer = buffer_of(receiver)?;
            buffer.replace(buffer.contents().chars().rev().collect());
            Ok(receiver.clone())
        })
        .method("toString", &[], TypeRef::string(), |receiver, _| {
            Ok(Value::string(buffer_of(receiver)?.contents()))
        });
    for ty in [
        TypeRef::string(),
        TypeRef::CHAR,
        TypeRef::INT,
        TypeRef::LONG,
        TypeRef::DOUBLE,
        TypeRef::BOOLEAN,
        TypeRef::object(),
    ] {
        builder = builder.method("append", &[ty], this.clone(), |receiver, args| {
            buffer_of(receiver)?.append(&arg(args, 0)?.to_java_string());
            Ok(receiver.clone())
        });
    }
    builder
}
