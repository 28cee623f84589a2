use std::error::Error;
use std::process;

use account_registry::{logging, run, Config};
use tracing::error;

#[tokio::main]
async fn main() {
    logging::init();
    if let Err(err) = run_app().await {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

async fn run_app() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Config::from_env()?;
    run(config, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        // Without a signal handler the server runs until killed.
        error!(%err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
