mod eval;
mod shell;

use clap::{Parser, Subcommand, ValueEnum};
use exprscope_core::{EvaluationMode, ExpressionEngine, Settings};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "exprscope",
    version,
    about = "Evaluate and complete Java-like expressions",
    long_about = "exprscope parses a restricted Java expression language against a bundled \
                  class library. It evaluates expressions, infers their types without side \
                  effects, and suggests ranked completions for the token under the caret."
)]
pub struct Cli {
    /// JSON settings file (imports, variables, access levels, modes)
    #[arg(long, global = true, value_name = "CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Evaluation mode, overriding the configured one
    #[arg(long, global = true, value_enum)]
    pub mode: Option<CliMode>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[clap(rename_all = "lowercase")]
pub enum CliMode {
    /// Infer types only
    Static,
    /// Read fields and call methods without assigning
    Mixed,
    /// Full evaluation with side effects
    Dynamic,
}

impl From<CliMode> for EvaluationMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Static => EvaluationMode::StaticTyping,
            CliMode::Mixed => EvaluationMode::Mixed,
            CliMode::Dynamic => EvaluationMode::DynamicTyping,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate an expression and print its value and type
    Eval {
        #[arg(value_name = "EXPRESSION")]
        expression: String,
    },
    /// List completions for the token at the caret
    #[command(
        long_about = "Prints ranked completion candidates for the token under the caret. \
                      The caret defaults to the end of the expression."
    )]
    Complete {
        #[arg(value_name = "EXPRESSION")]
        expression: String,
        /// Byte offset of the caret
        #[arg(long)]
        caret: Option<usize>,
        /// Print the candidates as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start an interactive shell with tab completion
    Shell,
}

fn build_engine(cli: &Cli) -> Result<ExpressionEngine, Box<dyn std::error::Error>> {
    let mut settings = match &cli.config {
        Some(path) => exprscope_core::EngineConfig::load(path)?.into_settings()?,
        None => Settings::default(),
    };
    if let Some(mode) = cli.mode {
        settings = settings.with_evaluation_mode(mode.into());
    }
    Ok(exprscope_runtime::build_default_engine(settings))
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let component = match &cli.command {
        Commands::Shell => "shell",
        _ => "cli",
    };
    let _guard = exprscope_runtime::init_logging(component, false);

    let engine = build_engine(&cli)?;
    match cli.command {
        Commands::Eval { expression } => eval::run_eval(&engine, &expression),
        Commands::Complete {
            expression,
            caret,
            json,
        } => eval::run_complete(&engine, &expression, caret, json),
        Commands::Shell => shell::run(engine),
    }
}
