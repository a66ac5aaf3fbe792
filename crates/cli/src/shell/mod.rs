mod command;
mod completer;
mod highlighter;
mod prompt;
pub mod view;

use reedline::{
    ColumnarMenu, DefaultHinter, Emacs, FileBackedHistory, KeyCode, KeyModifiers, MenuBuilder,
    Reedline, ReedlineEvent, ReedlineMenu, Signal, default_emacs_keybindings,
};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use tabled::{Table, settings::Style};
use tracing::info;

use self::command::{ShellCommand, ShellInput, parse_shell_input};
use self::completer::ExpressionCompleter;
use self::highlighter::ExpressionHighlighter;
use self::prompt::ModePrompt;
use self::view::VariableView;
use crate::eval::{render_completions, render_error, render_result};
use exprscope_api::{TypeRef, Value};
use nu_ansi_term::Color;
use exprscope_core::{EvaluationMode, ExpressionEngine};

// Shell configuration constants
const SHELL_HISTORY_SIZE: usize = 500;

pub struct ReplServer {
    engine: Arc<RwLock<ExpressionEngine>>,
}

impl ReplServer {
    pub fn new(engine: ExpressionEngine) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
        }
    }

    fn engine(&self) -> ExpressionEngine {
        self.engine
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        println!("Type an expression, ':help' for commands, Tab to complete.");
        let line_editor = self.setup_line_editor()?;
        self.run_loop(line_editor)
    }

    fn history_file() -> Option<PathBuf> {
        dirs::home_dir().map(|mut p| {
            p.push(".exprscope");
            p.push("shell");
            let _ = std::fs::create_dir_all(&p);
            p.push("history");
            p
        })
    }

    fn setup_line_editor(&self) -> Result<Reedline, Box<dyn std::error::Error>> {
        let commands = ShellCommand::command_names();

        let completer = Box::new(ExpressionCompleter::new(commands.clone(), self.engine.clone()));

        let completion_menu = Box::new(ColumnarMenu::default().with_name("completion_menu"));

        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu("completion_menu".to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );

        let history = match Self::history_file()
            .and_then(|file| FileBackedHistory::with_file(SHELL_HISTORY_SIZE, file).ok())
        {
            Some(history) => history,
            None => FileBackedHistory::new(SHELL_HISTORY_SIZE)?,
        };

        let highlighter = Box::new(ExpressionHighlighter::new(commands));

        Ok(Reedline::create()
            .with_history(Box::new(history))
            .with_completer(completer)
            .with_highlighter(highlighter)
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_hinter(Box::new(
                DefaultHinter::default().with_style(
                    nu_ansi_term::Style::new()
                        .italic()
                        .fg(nu_ansi_term::Color::LightGray),
                ),
            ))
            .with_edit_mode(Box::new(Emacs::new(keybindings))))
    }

    fn set_mode(&self, mode: EvaluationMode) {
        let mut engine = self.engine.write().unwrap_or_else(PoisonError::into_inner);
        let settings = engine.settings().with_evaluation_mode(mode);
        *engine = exprscope_runtime::build_default_engine(settings);
        info!("evaluation mode switched to {:?}", mode);
    }

    fn evaluate(&self, expression: &str) -> String {
        match self.engine().evaluate(expression, &Value::Null) {
            Ok(info) => render_result(&info),
            Err(error) => render_error(expression, &error),
        }
    }

    fn handle(&self, command: ShellCommand) -> String {
        match command {
            ShellCommand::Mode { mode } => {
                self.set_mode(mode.into());
                String::new()
            }
            ShellCommand::Vars => {
                let rows: Vec<VariableView> = self
                    .engine()
                    .variables()
                    .iter()
                    .map(VariableView::from_variable)
                    .collect();
                if rows.is_empty() {
                    return "NO VARIABLES".to_string();
                }
                let mut table = Table::new(rows);
                table.with(Style::sharp());
                table.to_string()
            }
            ShellCommand::Complete { expression } => {
                match self.engine().complete(&expression, expression.len(), &Value::Null) {
                    Ok(completions) => render_completions(&completions),
                    Err(error) => render_error(&expression, &error),
                }
            }
            ShellCommand::Type { expression } => {
                match self.engine().compile(&expression, TypeRef::object()) {
                    Ok(compiled) => Color::Cyan.paint(compiled.result_type().to_string()).to_string(),
                    Err(error) => render_error(&expression, &error),
                }
            }
            ShellCommand::Clear => String::new(),
        }
    }

    fn run_loop(&self, mut line_editor: Reedline) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            let prompt = ModePrompt::new(self.engine().settings().evaluation_mode);
            let sig = line_editor.read_line(&prompt);

            match sig {
                Ok(Signal::Success(buffer)) => {
                    let trimmed = buffer.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if matches!(trimmed, ":exit" | ":quit") {
                        break;
                    }
                    if trimmed == ":help" {
                        println!("Commands: {}", ShellCommand::command_names().join(", "));
                        continue;
                    }

                    match parse_shell_input(trimmed) {
                        Ok(Some(ShellInput::Expression(expression))) => {
                            println!("{}", self.evaluate(&expression));
                        }
                        Ok(Some(ShellInput::Command(cmd))) => {
                            let clear = matches!(cmd, ShellCommand::Clear);
                            let output = self.handle(cmd);
                            if !output.is_empty() {
                                println!("{}", output);
                            }
                            if clear {
                                let _ = line_editor.clear_screen();
                            }
                        }
                        Ok(None) => {} // Help or handled by Clap
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
                Ok(Signal::CtrlD) | Ok(Signal::CtrlC) => {
                    println!("Bye!");
                    break;
                }
                x => println!("Event: {:?}", x),
            }
        }
        Ok(())
    }
}

pub fn run(engine: ExpressionEngine) -> Result<(), Box<dyn std::error::Error>> {
    ReplServer::new(engine).run()
}
