//! Read command handler.
//!
//! Submits the text, then prints each sentence as it is spoken with the
//! sentence marked inside its paragraph, until the queue runs dry, the user
//! quits or Ctrl-C arrives.

use std::time::Duration;

use readaloud_speech::ReaderSession;
use tokio::sync::mpsc;

use crate::error::CliError;
use crate::presentation::render_position;
use crate::utils::input::{COMMAND_HELP, PlaybackCommand, spawn_command_reader};

/// How often the handler checks whether reading has finished.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Arguments for the read command.
#[derive(Debug, Clone)]
pub struct ReadArgs {
    pub text: String,
    /// Paragraph to start at, numbered from 1.
    pub from_paragraph: usize,
    pub interactive: bool,
}

/// Execute the read command against a composed reader session.
pub async fn execute(reader: &ReaderSession, args: ReadArgs) -> Result<(), CliError> {
    if args.from_paragraph == 0 {
        return Err(CliError::Arguments(
            "paragraphs are numbered from 1".into(),
        ));
    }

    let mut updates = reader.subscribe();
    let queued = reader.submit_text(&args.text).await?;
    let paragraphs = reader.state().paragraphs.len();
    if queued == 0 {
        println!("Nothing to read.");
        return Ok(());
    }
    if args.from_paragraph > 1 {
        reader.play_from_paragraph(args.from_paragraph - 1)?;
    }

    println!("Reading {queued} sentence(s) in {paragraphs} paragraph(s).");
    let mut commands = args.interactive.then(|| {
        println!("{COMMAND_HELP}");
        spawn_command_reader()
    });

    let mut idle_check = tokio::time::interval(IDLE_POLL_INTERVAL);
    let mut last_line: Option<String> = None;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                let line = render_position(&state.paragraphs, &state.read_position);
                if line.is_some() && line != last_line {
                    if let Some(text) = &line {
                        println!("{text}");
                    }
                    last_line = line;
                }
            }
            command = next_command(&mut commands) => match command {
                Some(PlaybackCommand::Quit) => {
                    reader.stop();
                    break;
                }
                Some(command) => apply_command(reader, command),
                None => commands = None,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                reader.stop();
                break;
            }
            _ = idle_check.tick() => {
                if reader.coordinator().is_idle() {
                    break;
                }
            }
        }
    }

    reader.coordinator().shutdown();
    Ok(())
}

fn apply_command(reader: &ReaderSession, command: PlaybackCommand) {
    match command {
        PlaybackCommand::Pause => reader.pause(),
        PlaybackCommand::Resume => reader.resume(),
        PlaybackCommand::Stop => reader.stop(),
        PlaybackCommand::Goto(paragraph) => {
            if let Err(e) = reader.play_from_paragraph(paragraph - 1) {
                eprintln!("{e}");
            }
        }
        PlaybackCommand::Quit => {}
    }
}

async fn next_command(
    commands: &mut Option<mpsc::UnboundedReceiver<PlaybackCommand>>,
) -> Option<PlaybackCommand> {
    match commands {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
