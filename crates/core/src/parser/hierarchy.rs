//! Paths into the caller-defined object tree: `{child#grandchild}`.

use super::context::ParseContext;
use super::result::{ParseError, ParseOutcome, ParseResult, ParserConfidence, Trial};
use crate::expectation::ParseExpectation;
use crate::object_info::ObjectInfo;
use crate::tokenizer::TokenStream;
use exprscope_api::{TypeRef, Value};

pub(super) fn parse_hierarchy(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    expectation: &ParseExpectation,
    trial: &mut Trial,
) -> ParseOutcome<ParseResult> {
    let open = tokens.read_char('{')?;
    trial.raise(ParserConfidence::RightParser)?;
    let Some(mut node) = ctx.settings.custom_hierarchy_root.clone() else {
        return Err(ParseError::semantic(open.start, "No custom hierarchy is configured").into());
    };
    loop {
        let children = node.children();
        let token = tokens.read_until(&['#', '}'], |info| {
            let factory = ctx.completions(info, expectation);
            let completions = children
                .iter()
                .filter_map(|child| {
                    let ty = child.user_object().map(|value| value.runtime_type());
                    factory.hierarchy_node(child.name(), ty.as_ref())
                })
                .collect();
            factory.suggestions(completions)
        })?;
        let child = children
            .iter()
            .find(|child| child.name() == token.text)
            .cloned()
            .ok_or_else(|| {
                ParseError::semantic(
                    token.start,
                    format!("Unknown node '{}' below '{}'", token.text, node.name()),
                )
            })?;
        node = child;
        if tokens.peek_char() == Some('#') {
            tokens.read_char('#')?;
            continue;
        }
        tokens.read_char('}')?;
        break;
    }
    let info = match node.user_object() {
        Some(value) if !value.is_null() => {
            let ty = value.runtime_type();
            if ctx.mode.reads_values() {
                ObjectInfo::new(value, ty)
            } else {
                ObjectInfo::indeterminate(ty)
            }
        }
        _ if ctx.mode.reads_values() => ObjectInfo::new(Value::Null, TypeRef::object()),
        _ => ObjectInfo::indeterminate(TypeRef::object()),
    };
    Ok(ParseResult::Object(info))
}
