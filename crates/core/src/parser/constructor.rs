//! `new` expressions: instance creation and array creation.

use super::class::parse_type;
use super::context::ParseContext;
use super::expression::{is_assignable_to, parse_expression};
use super::member::parse_arguments;
use super::result::{ParseError, ParseOutcome, ParseResult, ParserConfidence, Trial};
use crate::evaluation;
use crate::expectation::ParseExpectation;
use crate::object_info::ObjectInfo;
use crate::tokenizer::TokenStream;
use crate::types;
use exprscope_api::{ArrayRef, HostError, JavaArray, TypeRef, Value, simple_class_name};

pub(super) fn parse_constructor(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    expectation: &ParseExpectation,
    trial: &mut Trial,
) -> ParseOutcome<ParseResult> {
    let keyword = tokens.read_keyword("new", |info| {
        let factory = ctx.completions(info, expectation);
        factory.suggestions(factory.keywords([("new", None)]))
    })?;
    trial.raise(ParserConfidence::RightParser)?;
    let ty = parse_type(tokens, ctx, false)?;
    let info = match tokens.peek_char() {
        Some('[') => parse_array_creation(tokens, ctx, ty)?,
        Some('(') => parse_instance_creation(tokens, ctx, keyword.start, ty)?,
        _ => return Err(tokens.syntax_error("Expected '(' or '['")),
    };
    Ok(ParseResult::Object(info))
}

fn parse_instance_creation(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    position: usize,
    ty: TypeRef,
) -> ParseOutcome<ObjectInfo> {
    let TypeRef::Class(fqn) = &ty else {
        return Err(ParseError::syntax(position, format!("Cannot instantiate primitive type {ty}")).into());
    };
    let introspection = ctx.introspection();
    if introspection.is_abstract_or_interface(fqn) {
        return Err(ParseError::semantic(position, format!("Cannot instantiate the type {ty}")).into());
    }
    let constructors = introspection.constructors(fqn);
    if constructors.is_empty() {
        return Err(
            ParseError::semantic(position, format!("No accessible constructor of {ty}")).into(),
        );
    }
    let call = parse_arguments(tokens, ctx, simple_class_name(fqn), constructors)?;
    let info = evaluation::invoke(ctx.mode, &call.executable, &ObjectInfo::null(), call.arguments)
        .map_err(|error| ParseError::host(position, error))?;
    Ok(info)
}

fn parse_array_creation(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    element_type: TypeRef,
) -> ParseOutcome<ObjectInfo> {
    let mut sizes: Vec<ObjectInfo> = Vec::new();
    let mut size_positions = Vec::new();
    let mut depth = 0;
    while tokens.peek_char() == Some('[') {
        let open = tokens.read_char('[')?;
        depth += 1;
        if tokens.peek_char() == Some(']') {
            tokens.read_char(']')?;
            continue;
        }
        if sizes.len() + 1 != depth {
            return Err(ParseError::syntax(
                open.start,
                "Array dimension sizes must precede unspecified dimensions",
            )
            .into());
        }
        let size_expectation = ParseExpectation::value().with_required(vec![TypeRef::INT]);
        sizes.push(parse_expression(tokens, ctx, &size_expectation)?);
        size_positions.push(open.start);
        tokens.read_char(']')?;
    }
    let array_type = (0..depth).fold(element_type, |ty, _| TypeRef::array_of(ty));

    if sizes.is_empty() {
        if tokens.peek_char() != Some('{') {
            return Err(tokens.syntax_error("Array dimension or initializer expected"));
        }
        return parse_array_initializer(tokens, ctx, &array_type);
    }
    if tokens.peek_char() == Some('{') {
        return Err(tokens.syntax_error(
            "Cannot define dimension sizes when an array initializer is provided",
        ));
    }
    if !ctx.mode.invokes() {
        return Ok(ObjectInfo::indeterminate(array_type));
    }
    let known: Option<Vec<i64>> = sizes
        .iter()
        .map(|size| size.value().and_then(Value::as_i64))
        .collect();
    let Some(lengths) = known else {
        return Ok(ObjectInfo::indeterminate(array_type));
    };
    if let Some((index, negative)) = lengths.iter().enumerate().find(|(_, l)| **l < 0) {
        return Err(ParseError::host(
            size_positions[index],
            HostError::exception("java.lang.NegativeArraySizeException", negative.to_string()),
        )
        .into());
    }
    let position = size_positions.first().copied().unwrap_or_default();
    let array =
        create_array(&array_type, &lengths).map_err(|error| ParseError::host(position, error))?;
    Ok(ObjectInfo::new(Value::Array(array), array_type))
}

/// Nested arrays for `new T[a][b]...`; lengths are non-negative.
fn create_array(array_type: &TypeRef, lengths: &[i64]) -> Result<ArrayRef, HostError> {
    let element_type = array_type.element_type().cloned().unwrap_or_else(TypeRef::object);
    let Some((&length, rest)) = lengths.split_first() else {
        return Ok(JavaArray::new(element_type, Vec::new()));
    };
    let length = usize::try_from(length).unwrap_or_default();
    if rest.is_empty() {
        return JavaArray::with_length(element_type, length);
    }
    let mut elements = JavaArray::allocate(length)?;
    for _ in 0..length {
        elements.push(Value::Array(create_array(&element_type, rest)?));
    }
    Ok(JavaArray::new(element_type, elements))
}

/// `{e1, e2, ...}` for an array of `array_type`; nested braces for inner arrays.
fn parse_array_initializer(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    array_type: &TypeRef,
) -> ParseOutcome<ObjectInfo> {
    let open = tokens.read_char('{')?;
    let Some(element_type) = array_type.element_type().cloned() else {
        return Err(ParseError::semantic(
            open.start,
            format!("Array initializer used for non-array type {array_type}"),
        )
        .into());
    };
    let mut elements = Vec::new();
    while tokens.peek_char() != Some('}') {
        let position = tokens.next_token_start();
        let element = if element_type.element_type().is_some() && tokens.peek_char() == Some('{') {
            parse_array_initializer(tokens, ctx, &element_type)?
        } else {
            let expectation = ParseExpectation::value().with_hint(vec![element_type.clone()]);
            let element = parse_expression(tokens, ctx, &expectation)?;
            if !is_assignable_to(&element, &element_type, ctx.type_system()) {
                return Err(ParseError::semantic(
                    position,
                    format!(
                        "Type mismatch: cannot convert from {} to {element_type}",
                        element.declared_type()
                    ),
                )
                .into());
            }
            element
        };
        elements.push(element);
        if tokens.peek_char() != Some(',') {
            break;
        }
        tokens.read_char(',')?;
    }
    tokens.read_char('}')?;

    if !ctx.mode.reads_values() {
        return Ok(ObjectInfo::indeterminate(array_type.clone()));
    }
    let values: Option<Vec<Value>> = elements
        .iter()
        .map(|e| e.value().map(|v| types::convert_for_assignment(v, &element_type)))
        .collect();
    Ok(match values {
        Some(values) => ObjectInfo::new(
            Value::Array(JavaArray::new(element_type, values)),
            array_type.clone(),
        ),
        None => ObjectInfo::indeterminate(array_type.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_arrays_have_every_dimension() {
        let ty = TypeRef::array_of(TypeRef::array_of(TypeRef::INT));
        let array = create_array(&ty, &[2, 3]).unwrap();
        assert_eq!(array.len(), 2);
        match array.get(1) {
            Some(Value::Array(inner)) => {
                assert_eq!(inner.len(), 3);
                assert!(matches!(inner.get(2), Some(Value::Int(0))));
            }
            other => panic!("expected an inner array, got {other:?}"),
        }
    }

    #[test]
    fn test_unallocatable_dimension_is_host_fault() {
        let ty = TypeRef::array_of(TypeRef::array_of(TypeRef::INT));
        let error = create_array(&ty, &[1, i64::MAX]).unwrap_err();
        assert!(error.to_string().contains("OutOfMemoryError"), "{error}");
    }
}
