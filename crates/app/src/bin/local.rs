// PIX Todo Dia - local smoke runner

use tokio::signal;
use tracing::{error, info};

use pixdia_common::Config;
use pixdia_session::{AccessDecision, Gate};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .pretty()
        .init();

    info!("Starting PIX Todo Dia platform core");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    info!(provider = %config.backend_provider, "Configuration loaded");

    let client = pixdia_app::create_platform(&config)?;
    client.bootstrap().await;

    let snapshot = client.settled().await;
    info!(
        authenticated = snapshot.is_authenticated(),
        is_admin = snapshot.is_admin,
        profile = snapshot.profile.as_ref().map(|p| p.name.as_str()),
        "Session bootstrap settled"
    );

    match Gate::Admin.evaluate(&snapshot) {
        AccessDecision::Granted => info!("Admin area would be available"),
        AccessDecision::Denied => info!("Admin area would redirect"),
        AccessDecision::Pending => unreachable!("snapshot is settled"),
    }

    info!("Watching auth events, press Ctrl+C to exit");
    signal::ctrl_c().await?;

    client.close();
    info!("Shutdown complete");
    Ok(())
}
