use crate::CliMode;
use clap::Parser;
use clap::error::ErrorKind;

/// Shell commands start with `:`; any other line is an expression.
#[derive(Parser, Clone)]
#[command(no_binary_name = true)]
pub enum ShellCommand {
    /// Switch the evaluation mode (resets variables to their configured values)
    Mode {
        #[arg(value_enum)]
        mode: CliMode,
    },
    /// List caller variables and their current values
    Vars,
    /// Show completions for an expression (caret at the end)
    Complete {
        expression: String,
    },
    /// Infer the type of an expression without evaluating it
    Type {
        expression: String,
    },
    /// Clear the screen
    Clear,
}

/// A parsed input line.
pub enum ShellInput {
    Command(ShellCommand),
    Expression(String),
}

impl ShellCommand {
    /// Command names as typed in the shell, including the `:` prefix.
    pub fn command_names() -> Vec<String> {
        use clap::CommandFactory;
        let cmd = Self::command();
        let mut names = vec![":help".to_string(), ":exit".to_string(), ":quit".to_string()];
        names.extend(cmd.get_subcommands().map(|s| format!(":{}", s.get_name())));
        names
    }
}

pub fn parse_shell_input(input: &str) -> Result<Option<ShellInput>, Box<dyn std::error::Error>> {
    let Some(command) = input.strip_prefix(':') else {
        return Ok(Some(ShellInput::Expression(input.to_string())));
    };
    // Use shlex to split arguments while respecting quotes
    let args = shlex::split(command).ok_or("Invalid quoting")?;

    match ShellCommand::try_parse_from(args) {
        Ok(c) => Ok(Some(ShellInput::Command(c))),
        Err(e) => {
            // Handle help/version display without returning an error
            if e.kind() == ErrorKind::DisplayHelp || e.kind() == ErrorKind::DisplayVersion {
                println!("{}", e);
                return Ok(None);
            }
            Err(Box::new(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_lines_pass_through() {
        match parse_shell_input("a.b(1)").unwrap() {
            Some(ShellInput::Expression(text)) => assert_eq!(text, "a.b(1)"),
            _ => panic!("expected an expression"),
        }
    }

    #[test]
    fn test_quoted_command_argument() {
        match parse_shell_input(":complete \"Math.ma\"").unwrap() {
            Some(ShellInput::Command(ShellCommand::Complete { expression })) => {
                assert_eq!(expression, "Math.ma")
            }
            _ => panic!("expected :complete"),
        }
        assert!(parse_shell_input(":mode nonsense").is_err());
    }

    #[test]
    fn test_command_names_are_prefixed() {
        let names = ShellCommand::command_names();
        assert!(names.contains(&":vars".to_string()));
        assert!(names.iter().all(|n| n.starts_with(':')));
    }
}
