//! Member chains after a primary: `.member` and `[index]`.

use super::context::ParseContext;
use super::dispatch::{Subject, dispatch, productions_for};
use super::expression::parse_expression;
use super::result::{ParseError, ParseOutcome, ParseResult};
use crate::expectation::ParseExpectation;
use crate::object_info::{ObjectInfo, ValueSetter};
use crate::tokenizer::TokenStream;
use crate::types;
use exprscope_api::{HostError, TypeRef, Value};
use std::sync::Arc;

pub(super) fn parse_tail(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    result: ParseResult,
    expectation: &ParseExpectation,
) -> ParseOutcome<ParseResult> {
    match (tokens.peek_char(), result) {
        (Some('.'), result) => {
            tokens.read_char('.')?;
            let subject = Subject::from(result);
            let productions = productions_for(&subject, expectation.category);
            dispatch(tokens, ctx, &subject, expectation, productions)
        }
        (Some('['), ParseResult::Object(array)) => {
            let element = parse_array_index(tokens, ctx, array)?;
            parse_tail(tokens, ctx, ParseResult::Object(element), expectation)
        }
        (_, result) => Ok(result),
    }
}

fn parse_array_index(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    array: ObjectInfo,
) -> ParseOutcome<ObjectInfo> {
    let position = tokens.next_token_start();
    let array_type = array.effective_type();
    let Some(element_type) = array_type.element_type().cloned() else {
        return Err(ParseError::semantic(
            position,
            format!("The type of the expression must be an array type but it resolved to {array_type}"),
        )
        .into());
    };
    tokens.read_char('[')?;
    let index_expectation = ParseExpectation::value().with_required(vec![TypeRef::INT]);
    let index = parse_expression(tokens, ctx, &index_expectation)?;
    tokens.read_char(']')?;

    let (Some(array_value), Some(index_value)) = (array.value(), index.value()) else {
        return Ok(ObjectInfo::indeterminate(element_type.clone())
            .with_setter(uncomputed_element_setter()));
    };
    let array = match array_value {
        Value::Null => {
            return Err(ParseError::host(
                position,
                HostError::NullPointer("Cannot load from array because it is null".to_string()),
            )
            .into());
        }
        Value::Array(array) => array.clone(),
        other => {
            return Err(ParseError::internal(format!("array expression evaluated to {other}")).into());
        }
    };
    let index = index_value.as_i64().unwrap_or(-1);
    let value = usize::try_from(index).ok().and_then(|i| array.get(i));
    let (Some(slot), Some(value)) = (usize::try_from(index).ok(), value) else {
        return Err(ParseError::host(
            position,
            HostError::exception(
                "java.lang.ArrayIndexOutOfBoundsException",
                format!("Index {index} out of bounds for length {}", array.len()),
            ),
        )
        .into());
    };
    let slot_type = element_type.clone();
    let setter: ValueSetter = Arc::new(move |value: Value| {
        array.set(slot, types::convert_for_assignment(&value, &slot_type))
    });
    Ok(ObjectInfo::new(value, element_type).with_setter(setter))
}

/// Array elements stay assignable when the array or index was not computed;
/// modes that skip computation never perform the assignment.
fn uncomputed_element_setter() -> ValueSetter {
    Arc::new(|_| {
        Err(HostError::Unsupported(
            "cannot assign to an array element that was not computed".to_string(),
        ))
    })
}
