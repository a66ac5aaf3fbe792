//! Field access, method calls and the argument lists shared with constructors.

use super::context::ParseContext;
use super::dispatch::Subject;
use super::expression::parse_expression;
use super::result::{ParseError, ParseOutcome, ParseResult, ParserConfidence, Trial};
use crate::evaluation;
use crate::expectation::ParseExpectation;
use crate::object_info::ObjectInfo;
use crate::resolver;
use crate::tokenizer::TokenStream;
use exprscope_api::{ExecutableInfo, TypeRef, Value};
use std::sync::Arc;

/// Whose members a field or method production looks at.
struct MemberTarget {
    receiver: ObjectInfo,
    ty: TypeRef,
    static_only: bool,
}

impl MemberTarget {
    fn of(ctx: &ParseContext, subject: &Subject) -> Option<Self> {
        match subject {
            Subject::Root => Some(Self {
                receiver: ctx.this.clone(),
                ty: ctx.this.effective_type(),
                static_only: false,
            }),
            Subject::Object(object) => Some(Self {
                receiver: object.clone(),
                ty: object.effective_type(),
                static_only: false,
            }),
            Subject::Class(ty) => Some(Self {
                receiver: ObjectInfo::indeterminate(ty.clone()),
                ty: ty.clone(),
                static_only: true,
            }),
            Subject::Package(_) => None,
        }
    }
}

pub(super) fn parse_field(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    subject: &Subject,
    expectation: &ParseExpectation,
    trial: &mut Trial,
) -> ParseOutcome<ParseResult> {
    let Some(target) = MemberTarget::of(ctx, subject) else {
        return Err(tokens.syntax_error("Packages have no fields"));
    };
    let introspection = ctx.introspection();
    let token = tokens.read_identifier(
        |info| {
            let factory = ctx.completions(info, expectation);
            let fields = introspection.fields(&target.ty, target.static_only);
            factory.suggestions(factory.fields(fields.iter().map(|f| f.as_ref())))
        },
        "field name",
    )?;
    if tokens.peek_char() == Some('(') {
        return Err(tokens.syntax_error(format!("'{}' is followed by an argument list", token.text)));
    }
    if matches!(subject, Subject::Root) {
        super::variable::reject_lambda_parameter(tokens)?;
    }
    let field = introspection
        .fields_named(&target.ty, &token.text, target.static_only)
        .ok_or_else(|| {
            ParseError::semantic(
                token.start,
                format!("Unknown field '{}' in {}", token.text, target.ty),
            )
        })?;
    trial.raise(ParserConfidence::PotentiallyRightParser)?;
    let info = evaluation::read_field(ctx.mode, &field, &target.receiver)
        .map_err(|error| ParseError::host(token.start, error))?;
    Ok(ParseResult::Object(info))
}

pub(super) fn parse_method(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    subject: &Subject,
    expectation: &ParseExpectation,
    trial: &mut Trial,
) -> ParseOutcome<ParseResult> {
    let Some(target) = MemberTarget::of(ctx, subject) else {
        return Err(tokens.syntax_error("Packages have no methods"));
    };
    let introspection = ctx.introspection();
    let token = tokens.read_identifier(
        |info| {
            let factory = ctx.completions(info, expectation);
            let methods = introspection.methods(&target.ty, target.static_only);
            factory.suggestions(factory.methods(methods.iter().map(|m| m.as_ref())))
        },
        "method name",
    )?;
    if tokens.peek_char() != Some('(') {
        return Err(tokens.syntax_error(format!("Expected '(' after method name '{}'", token.text)));
    }
    let candidates = introspection.methods_named(&target.ty, &token.text, target.static_only);
    if candidates.is_empty() {
        return Err(ParseError::semantic(
            token.start,
            format!("Unknown method '{}' in {}", token.text, target.ty),
        )
        .into());
    }
    trial.raise(ParserConfidence::RightParser)?;
    let call = parse_arguments(tokens, ctx, &token.text, candidates)?;
    let info = evaluation::invoke(ctx.mode, &call.executable, &target.receiver, call.arguments)
        .map_err(|error| ParseError::host(token.start, error))?;
    Ok(ParseResult::Object(info))
}

/// The overload chosen for an argument list and its prepared arguments.
pub(super) struct ResolvedCall {
    pub executable: Arc<ExecutableInfo>,
    pub arguments: Vec<Option<Value>>,
}

/// Parse `(arg, ...)` and pick the overload among `candidates`.
///
/// Candidates are narrowed while arguments are read, so every argument is
/// parsed (and completed) against the parameter types still in play.
pub(super) fn parse_arguments(
    tokens: &mut TokenStream,
    ctx: &ParseContext,
    name: &str,
    candidates: Vec<Arc<ExecutableInfo>>,
) -> ParseOutcome<ResolvedCall> {
    let open = tokens.read_char('(')?;
    let ts = ctx.type_system();
    let mut live = candidates;
    let mut arguments: Vec<ObjectInfo> = Vec::new();
    let mut argument_types: Vec<TypeRef> = Vec::new();

    let caret_at_first_argument = tokens.caret() == Some(tokens.next_token_start())
        && live.iter().any(|c| resolver::accepts_argument_count(c, 0));
    let has_arguments = tokens.peek_char() != Some(')') || caret_at_first_argument;
    while has_arguments {
        let index = arguments.len();
        let position = tokens.next_token_start();
        live.retain(|c| resolver::accepts_argument_count(c, index));
        if live.is_empty() {
            return Err(ParseError::semantic(
                position,
                format!("No overload of '{name}' takes {} or more arguments", index + 1),
            )
            .into());
        }
        let expectation =
            ParseExpectation::value().with_hint(resolver::expected_argument_types(&live, index));
        let argument = parse_expression(tokens, ctx, &expectation)?;
        let argument_type = argument.effective_type();
        live.retain(|c| resolver::accepts_argument_at(c, index, &argument_type, ts));
        if live.is_empty() {
            return Err(ParseError::semantic(
                position,
                format!(
                    "No overload of '{name}' accepts {argument_type} as argument {}",
                    index + 1
                ),
            )
            .into());
        }
        argument_types.push(argument_type);
        arguments.push(argument.into_rvalue());
        if tokens.peek_char() != Some(',') {
            break;
        }
        tokens.read_char(',')?;
    }
    tokens.read_char(')')?;

    live.retain(|c| resolver::accepts_total_count(c, arguments.len()));
    let resolution = resolver::resolve(&live, &argument_types, ts)
        .map_err(|error| ParseError::semantic(open.start, error.describe(name, &argument_types)))?;
    let prepared = resolver::prepare_arguments(&resolution, &arguments);
    Ok(ResolvedCall {
        executable: resolution.executable,
        arguments: prepared,
    })
}
