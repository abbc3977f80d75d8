mod cli;
mod commands;
mod config;
mod modules;
mod state;
mod ui;

use anyhow::{Context as AnyhowContext, Result};
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::Config;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub show_traces: bool,
    pub config: Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(&cli) {
        ui::error(&format!("{err:#}"));
        return ExitCode::FAILURE;
    }

    let ctx = match build_context(&cli) {
        Ok(ctx) => ctx,
        Err(err) => {
            ui::error(&format!("{err:#}"));
            return ExitCode::FAILURE;
        }
    };

    match dispatch(&ctx, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<joinprocess::Error>() {
                Some(engine) => ui::report_error(engine, ctx.show_traces),
                None if ctx.show_traces => ui::error(&format!("{err:?}")),
                None => ui::error(&format!("{err:#}")),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None);

    if let Some(path) = &cli.log_file {
        builder.target(env_logger::Target::Pipe(Box::new(open_log_file(path)?)));
    }

    builder.init();
    Ok(())
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Could not open log file {}", path.display()))
}

fn build_context(cli: &Cli) -> Result<Context> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    log::debug!("Operating under root {}", config.root_path().display());

    Ok(Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        show_traces: cli.show_traces || config.show_traces,
        config,
    })
}

fn dispatch(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Join(args) => commands::domain::join(ctx, args),
        Command::Leave(args) => commands::domain::leave(ctx, args),
        Command::Query => commands::query::run(ctx),
        Command::Modules => commands::modules::run(ctx),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "domainjoin", &mut io::stdout());
            Ok(())
        }
    }
}
