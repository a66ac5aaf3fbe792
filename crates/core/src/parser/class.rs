//! Class and package references, and the type parser built on them.

use super::context::ParseContext;
use super::dispatch::{Subject, TYPE_PRODUCTIONS, dispatch};
use super::result::{ParseError, ParseOutcome, ParseResult, ParserConfidence, ResultCategory, Trial};
use super::variable::reject_lambda_parameter;
use crate::completion::CompletionSuggestions;
use crate::expectation::ParseExpectation;
use crate::tokenizer::{CompletionInfo, TokenStream};
use exprscope_api::{PrimitiveKind, TypeRef};

pub(super) fn parse_class(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    subject: &Subject,
    expectation: &ParseExpectation,
    trial: &mut Trial,
) -> ParseOutcome<ParseResult> {
    let type_context = expectation.category != ResultCategory::Value;
    let token = tokens.read_identifier(
        |info| class_completions(ctx, subject, info, expectation, type_context),
        "class name",
    )?;
    let introspection = ctx.introspection();
    let resolved = match subject {
        Subject::Root => {
            let primitive =
                PrimitiveKind::from_name(&token.text).filter(|kind| *kind != PrimitiveKind::Void);
            if let Some(kind) = primitive {
                if !type_context {
                    return Err(ParseError::syntax(
                        token.start,
                        format!("Primitive type '{}' is not a value", token.text),
                    )
                    .into());
                }
                trial.raise(ParserConfidence::PotentiallyRightParser)?;
                return Ok(ParseResult::Class(TypeRef::Primitive(kind)));
            }
            reject_lambda_parameter(tokens)?;
            introspection.resolve_simple_class(&token.text)
        }
        Subject::Package(package) => introspection.resolve_class_in_package(package, &token.text),
        Subject::Class(TypeRef::Class(outer)) => introspection.resolve_inner_class(outer, &token.text),
        Subject::Class(_) | Subject::Object(_) => None,
    };
    let fqn = resolved.ok_or_else(|| {
        ParseError::semantic(token.start, format!("Unknown class '{}'", token.text))
    })?;
    trial.raise(ParserConfidence::PotentiallyRightParser)?;
    Ok(ParseResult::Class(TypeRef::class(fqn)))
}

fn class_completions(
    ctx: &ParseContext,
    subject: &Subject,
    info: &CompletionInfo,
    expectation: &ParseExpectation,
    type_context: bool,
) -> CompletionSuggestions {
    let introspection = ctx.introspection();
    let factory = ctx.completions(info, expectation);
    let mut completions = Vec::new();
    match subject {
        Subject::Root => {
            let imported = introspection.imported_classes();
            completions.extend(factory.classes(imported.iter().map(String::as_str), false));
            // Non-imported classes only once something has been typed
            if ctx.settings.complete_all_classes && !factory.prefix().is_empty() {
                let others = introspection.other_top_level_classes();
                completions.extend(factory.classes(others.iter().map(String::as_str), true));
            }
            if type_context {
                completions.extend(factory.primitive_types());
            }
        }
        Subject::Package(package) => {
            let classes = introspection.classes_in_package(package);
            completions.extend(factory.classes(classes.iter().map(String::as_str), false));
        }
        Subject::Class(TypeRef::Class(outer)) => {
            let inner = introspection.inner_classes(outer);
            completions.extend(factory.classes(inner.iter().map(String::as_str), false));
        }
        Subject::Class(_) | Subject::Object(_) => {}
    }
    factory.suggestions(completions)
}

pub(super) fn parse_package(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    subject: &Subject,
    expectation: &ParseExpectation,
    trial: &mut Trial,
) -> ParseOutcome<ParseResult> {
    let parent = match subject {
        Subject::Root => "",
        Subject::Package(package) => package.as_str(),
        Subject::Object(_) | Subject::Class(_) => {
            return Err(tokens.syntax_error("Expected a package"));
        }
    };
    let introspection = ctx.introspection();
    let token = tokens.read_identifier(
        |info| {
            let factory = ctx.completions(info, expectation);
            let packages = introspection.subpackages(parent);
            factory.suggestions(factory.packages(packages.iter().map(String::as_str)))
        },
        "package name",
    )?;
    let package = if parent.is_empty() {
        token.text.clone()
    } else {
        format!("{parent}.{}", token.text)
    };
    if !introspection.package_exists(&package) {
        return Err(ParseError::semantic(token.start, format!("Unknown package '{package}'")).into());
    }
    trial.raise(ParserConfidence::PotentiallyRightParser)?;
    Ok(ParseResult::Package(package))
}

/// Parse a type name: a primitive, a simple or qualified class name, optionally
/// followed by `[]` pairs when `allow_array` is set.
pub(super) fn parse_type(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    allow_array: bool,
) -> ParseOutcome<TypeRef> {
    let expectation = ParseExpectation::type_reference();
    let mut ty = match dispatch(tokens, ctx, &Subject::Root, &expectation, TYPE_PRODUCTIONS)? {
        ParseResult::Class(ty) => ty,
        other => {
            return Err(ParseError::internal(format!(
                "type parser produced {}",
                other.category().describe()
            ))
            .into());
        }
    };
    while allow_array && is_array_suffix(tokens) {
        tokens.read_char('[')?;
        tokens.read_char(']')?;
        ty = TypeRef::array_of(ty);
    }
    Ok(ty)
}

fn is_array_suffix(tokens: &TokenStream) -> bool {
    if tokens.peek_char() != Some('[') {
        return false;
    }
    let after_bracket = tokens.at(tokens.next_token_start() + 1);
    after_bracket.peek_char() == Some(']')
}
