use clap::Parser;
use peduc_backend::{backend::Backend, config::AppConfig, errors::PeducError, peduc_rocket};
use simplelog::{CombinedLogger, ConfigBuilder, TermLogger};
use std::path::PathBuf;

/// Peer resource service over a sled database
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct CmdArgs {
    /// YAML file layered over the built-in defaults
    #[arg(short, long, default_value = "peduc.yaml")]
    pub config_file: PathBuf,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(short, long, default_value = "info")]
    pub log_level: log::LevelFilter,
}

#[tokio::main]
pub async fn main() -> Result<(), PeducError> {
    let args = CmdArgs::parse();
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_ignore_str("sled")
        .build();
    CombinedLogger::init(vec![TermLogger::new(
        args.log_level,
        log_config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )])
    .map_err(|e| PeducError::Oops(e.to_string()))?;

    let config = AppConfig::load(args.config_file.clone())?;
    log::info!(
        file = args.config_file.display().to_string(),
        db = config.sled.path.display().to_string(),
        base_path = config.peduc.base_path.as_str();
        "peducd starting"
    );

    let backend = Backend::open(&config)?;
    peduc_rocket(config, backend).launch().await?;

    log::info!("peducd stopped");
    Ok(())
}
