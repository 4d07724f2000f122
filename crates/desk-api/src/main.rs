//! desk-api server binary

use desk_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        error!(error = %e, "Server exited with error");
        eprintln!("Fatal: {e}");
        std::process::exit(1);
    }
}

async fn run_app() -> Result<(), Box<dyn std::error::Error>> {
    // The log format comes from configuration, so load it before tracing
    let config = AppConfig::from_env()?;

    if let Err(e) = try_init_tracing_with_config(TracingConfig::from_format(config.app.log_format)) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    info!(
        app = %config.app.name,
        env = ?config.app.env,
        address = %config.api.address(),
        "Configuration loaded"
    );

    desk_api::run(config).await?;

    Ok(())
}
