//! sitesmith OAuth broker server

use sitesmith::config::SitesmithConfig;
use sitesmith::observability;
use sitesmith_broker::{router, BrokerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init()?;

    let config = SitesmithConfig::load()?;
    if config.broker.client_id.is_empty() {
        tracing::warn!("no OAuth client id configured; token exchange will fail");
    }

    let bind_addr = config.broker.bind_addr.clone();
    let state = BrokerState::new(config.broker)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "broker listening");

    axum::serve(listener, app).await?;

    Ok(())
}
