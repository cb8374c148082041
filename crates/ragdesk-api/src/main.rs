use anyhow::Result;
use ragdesk_api::setup;
use ragdesk_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    let (state, app) = setup::initialize_app(config).await?;

    setup::server::start_server(&state, app).await
}
