use dotenv::dotenv;
use ethereum_portfolio_digest::{
    agent::{self, Agent},
    config::Config,
    ethereum::{Network, NetworkPool},
    llm::OpenAiChatModel,
    tools,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting daily portfolio digest...");

    let config = Config::from_env()?;
    let pool = NetworkPool::from_endpoints(config.rpc_endpoints())?;
    let configured = pool.networks();
    for network in Network::ALL {
        if !configured.contains(&network) {
            warn!(%network, "no RPC endpoint configured, balance lookups on this network will fail");
        }
    }

    let registry = tools::default_registry(&config, Arc::new(pool))?;
    info!(tools = ?registry.names(), "tools registered");

    let model = OpenAiChatModel::new(
        config.openai_api_key.clone(),
        config.openai_endpoint.clone(),
        config.openai_model.clone(),
    )?;
    info!(model = model.model(), "using chat model");

    let prompt = agent::load_prompt(config.prompt_file.as_deref())?;
    let agent = Agent::new(model, registry, config.max_steps);

    if let Err(e) = agent.run(&prompt).await {
        error!(error = %e, "digest run failed");
        return Err(e.into());
    }

    info!("Digest run complete");
    Ok(())
}
