//! Probe result and aggregate types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of one named check
///
/// A failing dependency is reported here as data, never as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub name: String,
    pub healthy: bool,
    pub message: String,
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl ProbeResult {
    pub fn healthy(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            healthy: true,
            message: message.into(),
            details: Map::new(),
        }
    }

    pub fn unhealthy(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            healthy: false,
            message: message.into(),
            details: Map::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }
}

/// Aggregate verdicts across all probe types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    Healthy,
    Degraded,
    NotReady,
    Ready,
    Alive,
    Dead,
    Unhealthy,
}

impl ProbeStatus {
    /// HTTP status code a probe endpoint answers with
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Healthy | Self::Ready | Self::Alive => 200,
            Self::Degraded => 207,
            Self::NotReady | Self::Dead | Self::Unhealthy => 503,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::NotReady => "not_ready",
            Self::Ready => "ready",
            Self::Alive => "alive",
            Self::Dead => "dead",
            Self::Unhealthy => "unhealthy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub total: usize,
    pub passed: usize,
}

/// Verdict plus every individual check, in execution order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateHealth {
    pub status: ProbeStatus,
    pub message: String,
    pub checks: Vec<ProbeResult>,
    pub summary: CheckSummary,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl AggregateHealth {
    /// `pass` iff every check is healthy, `fail` otherwise
    pub fn from_checks(
        checks: Vec<ProbeResult>,
        pass: (ProbeStatus, &str),
        fail: (ProbeStatus, &str),
    ) -> Self {
        let passed = checks.iter().filter(|c| c.healthy).count();
        let total = checks.len();
        let (status, message) = if passed == total { pass } else { fail };

        Self {
            status,
            message: message.to_string(),
            checks,
            summary: CheckSummary { total, passed },
            details: Map::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn check(&self, name: &str) -> Option<&ProbeResult> {
        self.checks.iter().find(|c| c.name == name)
    }

    pub fn all_passed(&self) -> bool {
        self.summary.passed == self.summary.total
    }
}

/// Basic health: process resource usage and uptime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicHealth {
    pub status: ProbeStatus,
    pub message: String,
    pub uptime_seconds: u64,
    pub details: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

/// Dashboard roll-up of the other probes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSummary {
    pub overall_status: ProbeStatus,
    pub ready_for_traffic: bool,
    pub dependencies_healthy: bool,
    pub uptime_seconds: u64,
    pub health_endpoints: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

/// Every probe in one payload, for troubleshooting
#[derive(Debug, Clone, Serialize)]
pub struct DeepHealth {
    pub basic_health: BasicHealth,
    pub readiness: AggregateHealth,
    pub liveness: AggregateHealth,
    pub dependencies: AggregateHealth,
    pub metrics_sample: std::collections::BTreeMap<String, Value>,
    pub check_timestamp: DateTime<Utc>,
}
