use lastlook::{
    api::Server,
    batch::{BatchOrchestrator, FeatureFlags, VoteExtensionSchedule},
    config::Config,
    store::{KvStore, MemoryStore, SqliteStore},
};
use std::sync::Arc;
use tracing::info;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// The main entry point for the node.
///
/// Initializes logging, loads the configuration, opens the batch store and
/// serves the consensus callbacks over JSON-RPC.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&path)?;
    info!("Node starting with config: {:?}", config);

    let flags: Arc<dyn FeatureFlags> = Arc::new(VoteExtensionSchedule::new(
        config.consensus.vote_extensions_enable_height,
    ));

    if config.database.is_memory() {
        serve(config, MemoryStore::new(), flags).await
    } else {
        let store = SqliteStore::connect(&config.database.url).await?;
        serve(config, store, flags).await
    }
}

async fn serve<S: KvStore>(
    config: Config,
    store: S,
    flags: Arc<dyn FeatureFlags>,
) -> anyhow::Result<()> {
    let orchestrator = BatchOrchestrator::new(store, flags);
    Server::new(config.api, orchestrator).start().await
}
