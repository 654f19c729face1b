//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;
use readaloud_core::Locale;

/// Command-line interface definition for the reader.
#[derive(Debug, Parser)]
#[command(name = "readaloud")]
#[command(about = "Read text aloud sentence by sentence, highlighting as it goes")]
#[command(version)]
pub struct Cli {
    /// Text file to read. Standard input is read when neither FILE nor
    /// --text is given.
    #[arg(value_name = "FILE", conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Read this text instead of a file
    #[arg(short = 't', long = "text")]
    pub text: Option<String>,

    /// Start at this paragraph, numbered from 1
    #[arg(short = 'p', long = "from-paragraph", default_value_t = 1)]
    pub from_paragraph: usize,

    /// Speaking rate in words per minute
    #[arg(long = "wpm", env = "READALOUD_WPM")]
    pub words_per_minute: Option<u32>,

    /// Locale candidates, highest priority first (e.g. he-IL,en-US)
    #[arg(
        short = 'l',
        long = "locale",
        env = "READALOUD_LOCALES",
        value_delimiter = ','
    )]
    pub locales: Vec<Locale>,

    /// Reader settings file (JSON)
    #[arg(short = 'c', long = "config", env = "READALOUD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Accept playback commands on standard input while reading
    #[arg(short = 'i', long = "interactive")]
    pub interactive: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}
