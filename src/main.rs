//! ontc - runs OXPL programs and explores their facts.
//!
//! # Usage
//!
//! ```bash
//! ontc run program.oxpl     # execute a program
//! ontc dbgon program.oxpl   # open the shell on the facts of a program
//! ontc shell                # open the shell without a database
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use ontc::error::{OntcError, Result};
use ontc::exec;
use ontc::ontology::Database;
use ontc::settings::Settings;
use ontc::shell::Shell;

/// Ontology toolchain CLI.
#[derive(Parser, Debug)]
#[command(name = "ontc")]
#[command(about = "Run OXPL programs whose control flow is driven by facts")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the interactive shell without a database
    Shell,
    /// Parse, check and execute a program
    Run {
        /// Source file of the program
        file: PathBuf,
    },
    /// Collect the facts of a program and open the shell on them
    Dbgon {
        /// Source file of the program
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&settings.log);

    let Some(command) = args.command else {
        if let Err(e) = Args::command().print_help() {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    };
    match dispatch(command, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "ontc failed");
            match &e {
                OntcError::Parse {
                    line: Some(line),
                    col: Some(col),
                    ..
                } => eprintln!("Error: {} (line {}, column {})", e, line, col),
                _ => eprintln!("Error: {}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

fn dispatch(command: Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::Shell => open_shell(None, settings),
        Commands::Run { file } => {
            let source = read_source(&file)?;
            let stdout = io::stdout();
            let report = exec::exec_program(&source, settings, &mut stdout.lock())?;
            info!(
                file = %file.display(),
                dispatched = report.dispatched,
                diagnostics = report.diagnostics.len(),
                "program finished"
            );
            Ok(())
        }
        Commands::Dbgon { file } => {
            let source = read_source(&file)?;
            let database = exec::debug_ontology(&source)?;
            open_shell(Some(database), settings)
        }
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        error!(file = %path.display(), error = %e, "cannot read source");
        OntcError::from(e)
    })
}

fn open_shell(database: Option<Database>, settings: &Settings) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(stdin.lock(), stdout.lock()).with_prompt(settings.prompt.clone());
    if let Some(database) = database {
        shell = shell.with_database(database);
    }
    shell.run()
}
