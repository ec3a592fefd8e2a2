use std::ffi::OsString;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::process::{self, Command};

use clap::{Args, Parser, Subcommand};
use loadenv::{DEFAULT_FILE_NAME, EnvLoader, LoadOptions, TargetEnv};
use tracing_subscriber::EnvFilter;

/// Run commands with variables loaded from an env file.
#[derive(Debug, Parser)]
#[command(name = "loadenv", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load an env file and execute a command.
    Run(RunArgs),
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
struct RunArgs {
    /// Env file to load. An empty value means `.env`.
    #[arg(short, long, default_value = DEFAULT_FILE_NAME)]
    file: String,
    /// Keep variables that are already set instead of replacing them.
    #[arg(long)]
    no_override: bool,
    /// Print loader diagnostics to stderr.
    #[arg(short, long)]
    verbose: bool,
    /// Command to execute, followed by its arguments.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<OsString>,
}

fn main() {
    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Run(args) => {
            init_logging(args.verbose);
            match execute_run(&args) {
                Ok(code) => code,
                Err(err) => {
                    eprintln!("loadenv: {err}");
                    1
                }
            }
        }
    };
    process::exit(code);
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("loadenv=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn execute_run(args: &RunArgs) -> Result<i32, String> {
    let vars = load_vars(args).map_err(|err| err.to_string())?;
    let Some((program, program_args)) = args.command.split_first() else {
        return Err("missing command after `run`".to_owned());
    };

    let mut command = Command::new(program);
    command.args(program_args).envs(vars);
    execute_command(command, program)
}

impl RunArgs {
    fn options(&self) -> LoadOptions {
        LoadOptions {
            override_existing_vars: !self.no_override,
            file_name: self.file.clone(),
        }
    }
}

/// Variables the child should see for every key in the file.
///
/// The loader works on a snapshot, so this process's own environment is only
/// read. Keys the override policy skipped resolve to their current value.
fn load_vars(args: &RunArgs) -> Result<Vec<(String, String)>, loadenv::Error> {
    let options = args.options();
    let mut loader = EnvLoader::new()
        .override_existing(options.override_existing_vars)
        .target(TargetEnv::from_process_snapshot());
    let loaded = loader.load_path(options.effective_file_name())?;

    let mut table = loader.into_target().into_memory().unwrap_or_default();
    Ok(loaded
        .into_entries()
        .into_iter()
        .filter_map(|entry| table.remove_entry(&entry.key))
        .collect())
}

#[cfg(unix)]
fn execute_command(mut command: Command, program: &OsString) -> Result<i32, String> {
    let err = command.exec();
    Err(format!(
        "failed to execute `{}`: {err}",
        program.to_string_lossy()
    ))
}

#[cfg(not(unix))]
fn execute_command(mut command: Command, program: &OsString) -> Result<i32, String> {
    let status = command
        .status()
        .map_err(|err| format!("failed to execute `{}`: {err}", program.to_string_lossy()))?;
    Ok(status.code().unwrap_or(1))
}
