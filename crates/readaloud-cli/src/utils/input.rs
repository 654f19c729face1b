//! Input utilities: the text to read and interactive playback commands.

use std::io::Read;
use std::str::FromStr;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::error::CliError;
use crate::parser::Cli;

/// Load the text named on the command line.
///
/// `--text` wins, then FILE, then standard input. Standard input cannot
/// carry both the text and interactive commands.
pub fn read_input(cli: &Cli) -> Result<String, CliError> {
    if let Some(text) = &cli.text {
        return Ok(text.clone());
    }

    if let Some(path) = &cli.file {
        return std::fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("{}: {e}", path.display())));
    }

    if cli.interactive {
        return Err(CliError::Arguments(
            "--interactive needs FILE or --text; standard input is used for commands".into(),
        ));
    }

    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

/// A playback command typed while reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackCommand {
    Pause,
    Resume,
    Stop,
    /// Jump to a paragraph, numbered from 1 as displayed.
    Goto(usize),
    Quit,
}

/// Help text for [`PlaybackCommand`].
pub const COMMAND_HELP: &str =
    "commands: p(ause), r(esume), s(top), g(oto) <paragraph>, q(uit)";

impl FromStr for PlaybackCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_ascii_lowercase();
        let argument = words.next();

        match (command.as_str(), argument) {
            ("p" | "pause", None) => Ok(Self::Pause),
            ("r" | "resume", None) => Ok(Self::Resume),
            ("s" | "stop", None) => Ok(Self::Stop),
            ("q" | "quit", None) => Ok(Self::Quit),
            ("g" | "goto", Some(number)) => match number.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(Self::Goto(n)),
                _ => Err(format!("not a paragraph number: {number}")),
            },
            _ => Err(format!("unknown command: {}", line.trim())),
        }
    }
}

/// Read [`PlaybackCommand`]s from standard input until it closes.
///
/// Unparseable lines are answered with [`COMMAND_HELP`] on stderr.
pub fn spawn_command_reader() -> mpsc::UnboundedReceiver<PlaybackCommand> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read command input");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<PlaybackCommand>() {
                Ok(command) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                Err(message) => eprintln!("{message}\n{COMMAND_HELP}"),
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;

    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("p".parse::<PlaybackCommand>(), Ok(PlaybackCommand::Pause));
        assert_eq!("Resume".parse::<PlaybackCommand>(), Ok(PlaybackCommand::Resume));
        assert_eq!(" s ".parse::<PlaybackCommand>(), Ok(PlaybackCommand::Stop));
        assert_eq!("goto 3".parse::<PlaybackCommand>(), Ok(PlaybackCommand::Goto(3)));
        assert_eq!("q".parse::<PlaybackCommand>(), Ok(PlaybackCommand::Quit));
    }

    #[test]
    fn test_reject_bad_commands() {
        assert!("g".parse::<PlaybackCommand>().is_err());
        assert!("g 0".parse::<PlaybackCommand>().is_err());
        assert!("g two".parse::<PlaybackCommand>().is_err());
        assert!("p now".parse::<PlaybackCommand>().is_err());
        assert!("dance".parse::<PlaybackCommand>().is_err());
    }

    #[test]
    fn test_read_input_prefers_text() {
        let cli = Cli::parse_from(["readaloud", "--text", "Inline."]);
        assert_eq!(read_input(&cli).unwrap(), "Inline.");
    }

    #[test]
    fn test_read_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "From a file.\nSecond line.").unwrap();
        let cli = Cli::parse_from(["readaloud", file.path().to_str().unwrap()]);
        assert_eq!(read_input(&cli).unwrap(), "From a file.\nSecond line.");
    }

    #[test]
    fn test_read_input_errors() {
        let cli = Cli::parse_from(["readaloud", "/definitely/not/here.txt"]);
        assert_eq!(read_input(&cli).unwrap_err().exit_code(), 74);

        let cli = Cli::parse_from(["readaloud", "--interactive"]);
        assert_eq!(read_input(&cli).unwrap_err().exit_code(), 2);
    }
}
