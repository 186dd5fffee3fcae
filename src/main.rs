use std::path::{Path, PathBuf};

use anyhow::{self, format_err};
use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

use qfock::interfaces::cli::{log_heading, Cli};
use qfock::interfaces::input::Input;
use qfock::interfaces::InputHandle;
use qfock::io::read_qfock_yaml;

/// Sends the `qfock-output` target to the output file (or the console) and every diagnostic
/// record to a `.log` file next to it.
fn configure_logging(output: Option<&Path>) -> Result<log4rs::Handle, anyhow::Error> {
    let output_encoder = Box::new(PatternEncoder::new("{m}{n}"));
    let output_appender = match output {
        Some(path) => Appender::builder().build(
            "output",
            Box::new(
                FileAppender::builder()
                    .encoder(output_encoder)
                    .append(false)
                    .build(path)?,
            ),
        ),
        None => Appender::builder().build(
            "output",
            Box::new(ConsoleAppender::builder().encoder(output_encoder).build()),
        ),
    };

    let log_path = output.map_or_else(
        || PathBuf::from("qfock.log"),
        |path| path.with_extension("log"),
    );
    let log_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {l:<5} {M} - {m}{n}",
        )))
        .append(false)
        .build(log_path)?;

    let config = Config::builder()
        .appender(output_appender)
        .appender(Appender::builder().build("log", Box::new(log_appender)))
        .logger(
            Logger::builder()
                .appender("output")
                .additive(false)
                .build("qfock-output", LevelFilter::Info),
        )
        .build(Root::builder().appender("log").build(LevelFilter::Debug))?;
    Ok(log4rs::init_config(config)?)
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    let _handle = configure_logging(cli.output.as_deref())?;
    log_heading();

    let config = cli
        .config
        .ok_or_else(|| format_err!("No input configuration file specified."))?;
    let input = read_qfock_yaml::<Input, _>(&config)?;
    input.handle().map_err(|err| {
        log::error!("{err}");
        log::error!(target: "qfock-output", "{err}");
        err
    })
}
