use crate::shell::view::CompletionView;
use exprscope_core::{EngineError, ExpressionEngine, ObjectInfo};
use exprscope_api::Value;
use nu_ansi_term::Color;
use tabled::{Table, settings::Style};

/// `value : type`, or just the type when nothing was computed.
pub fn render_result(info: &ObjectInfo) -> String {
    let ty = Color::Cyan.paint(info.declared_type().to_string());
    match info.value() {
        Some(value) => format!("{} : {}", value, ty),
        None => format!("{} : {}", Color::DarkGray.paint("<not evaluated>"), ty),
    }
}

/// The error message with a marker under the offending position.
pub fn render_error(expression: &str, error: &EngineError) -> String {
    let message = Color::Red.paint(error.to_string()).to_string();
    match error.position() {
        Some(position) => {
            let column = expression
                .get(..position.min(expression.len()))
                .map_or(position, |prefix| prefix.chars().count());
            format!("{}\n  {}\n  {}^", message, expression, " ".repeat(column))
        }
        None => message,
    }
}

pub fn render_completions(completions: &[exprscope_core::CodeCompletion]) -> String {
    if completions.is_empty() {
        return "NO COMPLETIONS".to_string();
    }
    let rows: Vec<CompletionView> = completions.iter().map(CompletionView::from_completion).collect();
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    table.to_string()
}

pub fn run_eval(engine: &ExpressionEngine, expression: &str) -> Result<(), Box<dyn std::error::Error>> {
    match engine.evaluate(expression, &Value::Null) {
        Ok(info) => {
            println!("{}", render_result(&info));
            Ok(())
        }
        Err(error) => {
            eprintln!("{}", render_error(expression, &error));
            Err(Box::new(error))
        }
    }
}

pub fn run_complete(
    engine: &ExpressionEngine,
    expression: &str,
    caret: Option<usize>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let caret = caret.unwrap_or(expression.len());
    let completions = match engine.complete(expression, caret, &Value::Null) {
        Ok(completions) => completions,
        Err(error) => {
            eprintln!("{}", render_error(expression, &error));
            return Err(Box::new(error));
        }
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&completions)?);
    } else {
        println!("{}", render_completions(&completions));
    }
    Ok(())
}
