use clap::Parser;
use zest_recorder::cli::commands::{cmd_inspect, cmd_record};
use zest_recorder::cli::config::{Cli, Commands, load_config};
use zest_recorder::cli::logging::init_logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Record {
            session,
            output,
            zap_url,
            api_key,
            log_file,
        } => {
            // CLI > config > defaults
            let zap_url = zap_url.as_deref().or(config.zap.url.as_deref());
            let api_key = api_key.as_deref().or(config.zap.api_key.as_deref());
            cmd_record(
                &session,
                output.as_deref(),
                zap_url,
                api_key,
                log_file.as_deref(),
                &config,
                cli.verbose,
            )?;
        }
        Commands::Inspect { script } => {
            cmd_inspect(&script)?;
        }
    }

    Ok(())
}
