use std::sync::Arc;

use campaign_store::{CacheStore, RedisStore};
use indexer::{
    aggregator::Aggregator,
    clock::{Clock, SystemClock},
    config::Config,
    driver::Driver,
    explorer::{ExplorerApi, ExplorerClient},
    fetcher,
    registry::{CampaignRegistry, RegistryClient},
    rpc,
    scheduler::Scheduler,
    service::CampaignIndexer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "indexer=info,campaign_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting campaign indexer...");

    let config = Config::from_env()?;

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;
    let store: Arc<dyn CacheStore> = Arc::new(RedisStore::connect(&config.redis_url).await?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let registry: Arc<dyn CampaignRegistry> =
        Arc::new(RegistryClient::new(http.clone(), &config.registry_url));

    let mut indexers = Vec::with_capacity(config.networks.len());
    for network_config in &config.networks {
        let explorer: Arc<dyn ExplorerApi> = Arc::new(ExplorerClient::new(
            http.clone(),
            &network_config.explorer_url,
            &network_config.explorer_api_key,
        ));
        let rpc = rpc::connect(&network_config.rpc_url).await?;
        let fetcher = fetcher::build(
            config.fetch_method,
            network_config.network,
            explorer.clone(),
            rpc,
            config.reorg_margin,
        );

        indexers.push(
            CampaignIndexer::new(
                network_config.network,
                registry.clone(),
                explorer,
                fetcher,
                store.clone(),
                clock.clone(),
            )
            .with_campaign_delay(config.campaign_delay),
        );
    }

    let aggregator = Aggregator::new(store.clone(), clock.clone(), &config.campaign_page_url);
    let scheduler = Scheduler::new(clock.clone()).with_interval(config.poll_interval);

    Driver::new(indexers, aggregator, store, scheduler, clock.clone())
        .with_network_delay(config.campaign_delay)
        .with_flush_on_start(config.flush_on_start)
        .run()
        .await?;

    Ok(())
}
