use splitledger_application::EngineConfig;
use tracing_subscriber::EnvFilter;

use crate::CliResult;

/// Logs go to stderr so `--json` output on stdout stays machine readable.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads `.env` if present, then reads engine settings from the environment.
pub fn load_config() -> CliResult<EngineConfig> {
    let _ = dotenvy::dotenv();
    EngineConfig::from_env().map_err(|err| err.to_string().into())
}
