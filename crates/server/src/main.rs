//! docgate server binary

use docgate::GatewayConfig;
use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `.env` is loaded here so the gateway overrides see it too
    let config = ServerConfig::load()?;
    let gateway = GatewayConfig::from_env()?;

    server::start_server(config, gateway).await?;

    Ok(())
}
