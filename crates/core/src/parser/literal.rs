//! String, character, numeric, boolean and `null` literals.

use super::context::ParseContext;
use super::result::{ParseError, ParseOutcome, ParseResult, ParserConfidence, Trial};
use crate::completion::CompletionSuggestions;
use crate::expectation::ParseExpectation;
use crate::object_info::ObjectInfo;
use crate::tokenizer::{CompletionInfo, TokenStream};
use exprscope_api::{TypeRef, Value};

fn no_completions(info: &CompletionInfo) -> CompletionSuggestions {
    CompletionSuggestions::empty(info.token_start)
}

pub(super) fn parse_literal(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    expectation: &ParseExpectation,
    trial: &mut Trial,
) -> ParseOutcome<ParseResult> {
    let start = tokens.next_token_start();
    let mut upcoming = tokens.text()[start..].chars();
    let (first, second) = (upcoming.next(), upcoming.next());
    let info = match (first, second) {
        (Some('"'), _) => {
            let token = tokens.read_string_literal(no_completions)?;
            ObjectInfo::new(Value::string(token.text), TypeRef::string())
        }
        (Some('\''), _) => {
            let token = tokens.read_char_literal(no_completions)?;
            let c = token.text.encode_utf16().next().unwrap_or_default();
            ObjectInfo::new(Value::Char(c), TypeRef::CHAR)
        }
        (Some(c), _) if c.is_ascii_digit() => {
            let token = tokens.read_number_literal(no_completions)?;
            parse_number(&token.text, false, token.start)?
        }
        (Some('-'), Some(c)) if c.is_ascii_digit() => {
            tokens.read_operator(&["-"]);
            let token = tokens.read_number_literal(no_completions)?;
            parse_number(&token.text, true, start)?
        }
        _ => parse_keyword_literal(tokens, ctx, expectation)?,
    };
    trial.raise(ParserConfidence::PotentiallyRightParser)?;
    Ok(ParseResult::Object(info))
}

fn parse_keyword_literal(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    expectation: &ParseExpectation,
) -> ParseOutcome<ObjectInfo> {
    let token = tokens.read_identifier(
        |info| {
            let factory = ctx.completions(info, expectation);
            factory.suggestions(factory.keywords([
                ("true", Some(TypeRef::BOOLEAN)),
                ("false", Some(TypeRef::BOOLEAN)),
                ("null", None),
            ]))
        },
        "literal",
    )?;
    match token.text.as_str() {
        "true" => Ok(ObjectInfo::new(Value::Boolean(true), TypeRef::BOOLEAN)),
        "false" => Ok(ObjectInfo::new(Value::Boolean(false), TypeRef::BOOLEAN)),
        "null" => Ok(ObjectInfo::null()),
        _ => Err(ParseError::syntax(token.start, "Expected a literal").into()),
    }
}

/// Integer literals in hex, binary and octal notation may use all bits of the
/// type; decimal ones must fit the signed range (including the sign).
fn parse_integer(digits: &str, radix: u32, negative: bool, bits: u32) -> Option<i64> {
    let magnitude = u64::from_str_radix(digits, radix).ok()?;
    if radix == 10 {
        let limit = 1u64 << (bits - 1);
        let fits = if negative { magnitude <= limit } else { magnitude < limit };
        if !fits {
            return None;
        }
        let value = magnitude as i128;
        return Some((if negative { -value } else { value }) as i64);
    }
    if bits < 64 && magnitude >> bits != 0 {
        return None;
    }
    let value = if bits == 32 {
        i64::from(magnitude as u32 as i32)
    } else {
        magnitude as i64
    };
    Some(if negative { value.wrapping_neg() } else { value })
}

fn parse_number(text: &str, negative: bool, position: usize) -> Result<ObjectInfo, ParseError> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    let (radix, body) = if let Some(hex) = lower.strip_prefix("0x") {
        (16, hex)
    } else if let Some(binary) = lower.strip_prefix("0b") {
        (2, binary)
    } else {
        (10, lower.as_str())
    };
    let (body, suffix) = match body.chars().last() {
        Some(c @ 'l') => (&body[..body.len() - 1], Some(c)),
        Some(c @ ('f' | 'd')) if radix == 10 => (&body[..body.len() - 1], Some(c)),
        _ => (body, None),
    };
    let malformed = || ParseError::syntax(position, format!("Malformed number '{text}'"));
    let is_floating =
        radix == 10 && (matches!(suffix, Some('f' | 'd')) || body.contains(['.', 'e']));

    if is_floating {
        let value: f64 = body.parse().map_err(|_| malformed())?;
        let value = if negative { -value } else { value };
        return Ok(match suffix {
            Some('f') => ObjectInfo::new(Value::Float(value as f32), TypeRef::FLOAT),
            _ => ObjectInfo::new(Value::Double(value), TypeRef::DOUBLE),
        });
    }

    let (radix, digits) = if radix == 10 && body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (radix, body)
    };
    if digits.is_empty() {
        return Err(malformed());
    }
    if radix == 8 && digits.contains(['8', '9']) {
        return Err(ParseError::syntax(position, "Invalid octal literal"));
    }
    let too_large = || ParseError::syntax(position, "Integer number too large");
    if suffix == Some('l') {
        let value = parse_integer(digits, radix, negative, 64).ok_or_else(too_large)?;
        return Ok(ObjectInfo::new(Value::Long(value), TypeRef::LONG));
    }
    let value = parse_integer(digits, radix, negative, 32).ok_or_else(too_large)?;
    Ok(ObjectInfo::new(Value::Int(value as i32), TypeRef::INT))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of(text: &str) -> Value {
        let info = parse_number(text, false, 0).unwrap();
        info.value().cloned().unwrap()
    }

    #[test]
    fn test_number_forms() {
        assert!(matches!(value_of("42"), Value::Int(42)));
        assert!(matches!(value_of("0x1F"), Value::Int(31)));
        assert!(matches!(value_of("0b101"), Value::Int(5)));
        assert!(matches!(value_of("017"), Value::Int(15)));
        assert!(matches!(value_of("1_000L"), Value::Long(1000)));
        assert!(matches!(value_of("0xFFFFFFFF"), Value::Int(-1)));
        assert!(matches!(value_of("2.5f"), Value::Float(f) if f == 2.5));
        assert!(matches!(value_of("1e3"), Value::Double(d) if d == 1000.0));
        assert!(matches!(value_of("3d"), Value::Double(d) if d == 3.0));
    }

    #[test]
    fn test_integer_range_respects_sign() {
        let min = parse_number("2147483648", true, 0).unwrap();
        assert!(matches!(min.value(), Some(Value::Int(i32::MIN))));
        let err = parse_number("2147483648", false, 0).unwrap_err();
        assert_eq!(err.message, "Integer number too large");
        let long_min = parse_number("9223372036854775808L", true, 0).unwrap();
        assert!(matches!(long_min.value(), Some(Value::Long(i64::MIN))));
    }

    #[test]
    fn test_octal_rejects_decimal_digits() {
        let err = parse_number("019", false, 0).unwrap_err();
        assert_eq!(err.message, "Invalid octal literal");
    }
}
