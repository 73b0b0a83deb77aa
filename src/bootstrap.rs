//! # Service Bootstrap
//!
//! Wires configuration into the concrete collaborators (cache backend,
//! upstream client, datastore, system sampler) and produces the shared
//! [`AppState`]. Startup never fails because a dependency is unreachable;
//! that is reported by the probes instead.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::CacheProvider;
use crate::config::ConfigManager;
use crate::error::GatewayResult;
use crate::gateway::WeatherGateway;
use crate::health::{HealthDependencies, HealthService, PgDatastore, SysinfoSampler};
use crate::metrics::MetricsRegistry;
use crate::upstream::OpenWeatherClient;
use crate::web::state::AppState;

/// Running service components
#[derive(Debug)]
pub struct GatewayHandle {
    pub state: AppState,
    /// Background purge of expired in-memory entries, when enabled
    pub reaper: Option<JoinHandle<()>>,
}

impl GatewayHandle {
    pub fn stop(self) {
        if let Some(reaper) = self.reaper {
            reaper.abort();
        }
    }
}

pub async fn bootstrap(config_manager: &ConfigManager) -> GatewayResult<GatewayHandle> {
    let config = Arc::new(config_manager.config().clone());

    let cache = CacheProvider::from_config_graceful(&config.cache).await;
    let reaper = match (cache.timed_cache(), config.cache.reaper_interval_seconds) {
        (Some(timed), secs) if secs > 0 => {
            Some(timed.spawn_reaper(std::time::Duration::from_secs(secs)))
        }
        _ => None,
    };

    let upstream = Arc::new(OpenWeatherClient::from_config(&config.upstream)?);
    let metrics = Arc::new(MetricsRegistry::new());

    let gateway = WeatherGateway::new(
        upstream.clone(),
        cache.clone(),
        metrics.clone(),
        config.cache.ttl.clone(),
    );

    let health = HealthService::new(
        HealthDependencies {
            cache,
            datastore: Arc::new(PgDatastore::from_config(&config.database)),
            upstream,
            sampler: Arc::new(SysinfoSampler::new(config.health.cpu_sample_interval())),
            metrics,
        },
        config.health.clone(),
        config_manager.environment(),
    );

    info!(
        cache_provider = gateway.cache().provider_name(),
        api_key_configured = config.upstream.has_api_key(),
        database_configured = config.database.url.is_some(),
        "Gateway services initialized"
    );

    Ok(GatewayHandle {
        state: AppState::new(config, gateway, health),
        reaper,
    })
}
