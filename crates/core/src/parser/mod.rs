//! Recursive-descent parser that evaluates while it parses.
//!
//! Every grammar point tries its alternatives ([`dispatch::Production`]) on
//! copies of the token stream and lets them vote with a confidence level. The
//! same walk serves evaluation, static type inference and code completion; the
//! [`EvaluationMode`](crate::evaluation::EvaluationMode) of the
//! [`ParseContext`](context::ParseContext) decides what is computed.

pub mod context;
pub mod dispatch;
pub mod expression;
pub mod result;

mod bracket;
mod class;
mod constructor;
mod hierarchy;
mod lambda;
mod literal;
mod member;
mod tail;
mod unary;
mod variable;

pub use context::ParseContext;
pub use expression::parse_expression;
pub use result::{ParseError, ParseOutcome, ParseResult, ParseSignal, ParserConfidence};
