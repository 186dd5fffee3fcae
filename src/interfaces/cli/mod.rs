//! Command-line interface of the `qfock` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::io::format::qfock_output;

const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// Logs a nicely formatted QFock heading to the `qfock-output` logger.
pub fn log_heading() {
    let version = if let Some(ver) = VERSION {
        format!("v{ver}")
    } else {
        "v unknown".to_string()
    };
    qfock_output!("╭──────────────────────────────────────────────────────────────────────────────╮");
    qfock_output!("│   ██████  ███████  ██████   ██████ ██   ██                                   │");
    qfock_output!("│  ██    ██ ██      ██    ██ ██      ██  ██                                    │");
    qfock_output!("│  ██    ██ █████   ██    ██ ██      █████                                     │");
    qfock_output!("│  ██ ▄▄ ██ ██      ██    ██ ██      ██  ██                                    │");
    qfock_output!("│   ██████  ██       ██████   ██████ ██   ██                                   │");
    qfock_output!("│      ▀▀                                                                      │");
    qfock_output!("│  Two-electron Fock matrices and molecular point groups        {version:>13} │");
    qfock_output!("╰──────────────────────────────────────────────────────────────────────────────╯");
    qfock_output!("");
}

/// The command-line arguments of the `qfock` binary.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML input file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to the main output file. If not given, the output is written to the console.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
