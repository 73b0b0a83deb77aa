//! Shared application state

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::gateway::WeatherGateway;
use crate::health::HealthService;

/// Shared across all request handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub gateway: Arc<WeatherGateway>,
    pub health: Arc<HealthService>,
}

impl AppState {
    pub fn new(config: Arc<GatewayConfig>, gateway: WeatherGateway, health: HealthService) -> Self {
        Self {
            config,
            gateway: Arc::new(gateway),
            health: Arc::new(health),
        }
    }
}
