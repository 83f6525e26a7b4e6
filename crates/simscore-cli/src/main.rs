use clap::Parser;
use tokio::runtime::Runtime;

mod commands;
use commands::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let logging_config = match &cli.command {
        Commands::Evaluate { .. }
        | Commands::Extract { .. }
        | Commands::Trends { .. }
        | Commands::Compare { .. }
        | Commands::Guidance { .. }
        | Commands::Show { .. } => {
            // Keep stdout clean for command output
            simscore_core::logging::LoggingConfig::from_env().with_stdout(false)
        }
        _ => simscore_core::logging::LoggingConfig::from_env(),
    };

    let _log_guard = simscore_core::logging::init_logging(logging_config)?;

    let rt = Runtime::new()?;
    let result = rt.block_on(commands::run_command(cli.command));
    if let Err(e) = &result {
        simscore_core::logging::log_error(e, "Command failed");
    }
    result
}
