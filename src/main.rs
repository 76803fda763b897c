use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use pairtcr::runtime::{self, Commands, LogLevel, LogMode};

#[derive(Parser)]
#[command(version, about = "Pair TRA and TRB reads by UMI and join them with gene calls")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// trace, debug, info, warn, error or off
    #[arg(long = "log-level", global = true, default_value = "info")]
    log_level: LogLevel,

    /// terminal, path, both or discard
    #[arg(long = "log-mode", global = true, default_value = "terminal")]
    log_mode: LogMode,

    /// Log file, for log modes path and both
    #[arg(long = "log-path", global = true, default_value = "pairtcr.log")]
    log_path: PathBuf,
}

fn main() -> ExitCode {
    let mut cli = Cli::parse();

    if let Err(e) = runtime::setup_global_logger(cli.log_level, cli.log_mode, cli.log_path.clone()) {
        eprintln!("Error: {:?}", e);
        return ExitCode::FAILURE;
    }
    info!("Running {:?}", cli.command);

    if let Err(e) = cli.command.try_execute() {
        error!("{:?}", e);
        if matches!(cli.log_mode, LogMode::Path | LogMode::Discard) {
            eprintln!("Error: {:?}", e);
        }
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
