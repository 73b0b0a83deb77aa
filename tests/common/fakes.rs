//! Scripted stand-ins for the gateway's collaborators

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use weather_gateway::health::{
    Datastore, DatastoreError, DiskUsage, LoadAverage, MemoryUsage, SamplerError, SystemSampler,
};
use weather_gateway::upstream::{
    CurrentPayload, ForecastPayload, GeocodeHit, ProbeResponse, WeatherUpstream,
};
use weather_gateway::UpstreamError;

use super::builders;

/// Upstream whose responses and failures are set by the test
#[derive(Debug)]
pub struct FakeUpstream {
    pub current_calls: AtomicUsize,
    pub forecast_calls: AtomicUsize,
    pub geocode_calls: AtomicUsize,
    pub probe_calls: AtomicUsize,
    /// Coordinates of every data call, in order
    pub requested_coordinates: Mutex<Vec<(f64, f64)>>,
    current_body: Mutex<Value>,
    forecast_body: Mutex<Value>,
    geocode_body: Mutex<Value>,
    failure_status: Mutex<Option<u16>>,
    probe_status: Mutex<u16>,
    probe_panics: AtomicBool,
    configured: AtomicBool,
}

impl Default for FakeUpstream {
    fn default() -> Self {
        Self {
            current_calls: AtomicUsize::new(0),
            forecast_calls: AtomicUsize::new(0),
            geocode_calls: AtomicUsize::new(0),
            probe_calls: AtomicUsize::new(0),
            requested_coordinates: Mutex::new(Vec::new()),
            current_body: Mutex::new(builders::current_payload_json("London")),
            forecast_body: Mutex::new(builders::forecast_payload_json(7, 0)),
            geocode_body: Mutex::new(builders::geocode_hits_json(10)),
            failure_status: Mutex::new(None),
            probe_status: Mutex::new(200),
            probe_panics: AtomicBool::new(false),
            configured: AtomicBool::new(true),
        }
    }
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every data call fails with this HTTP status until cleared
    pub fn fail_with_status(&self, status: Option<u16>) {
        *self.failure_status.lock() = status;
    }

    pub fn set_probe_status(&self, status: u16) {
        *self.probe_status.lock() = status;
    }

    pub fn set_probe_panics(&self, panics: bool) {
        self.probe_panics.store(panics, Ordering::SeqCst);
    }

    pub fn set_configured(&self, configured: bool) {
        self.configured.store(configured, Ordering::SeqCst);
    }

    pub fn set_current_body(&self, body: Value) {
        *self.current_body.lock() = body;
    }

    pub fn set_forecast_body(&self, body: Value) {
        *self.forecast_body.lock() = body;
    }

    pub fn set_geocode_body(&self, body: Value) {
        *self.geocode_body.lock() = body;
    }

    pub fn total_data_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
            + self.forecast_calls.load(Ordering::SeqCst)
            + self.geocode_calls.load(Ordering::SeqCst)
    }

    fn respond<T: serde::de::DeserializeOwned>(&self, body: &Mutex<Value>) -> Result<T, UpstreamError> {
        if !self.configured.load(Ordering::SeqCst) {
            return Err(UpstreamError::NotConfigured);
        }
        if let Some(status) = *self.failure_status.lock() {
            return Err(UpstreamError::Status {
                status,
                body: "scripted failure".to_string(),
            });
        }
        let body = body.lock().clone();
        serde_json::from_value(body).map_err(|e| UpstreamError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl WeatherUpstream for FakeUpstream {
    async fn current(&self, lat: f64, lon: f64) -> Result<CurrentPayload, UpstreamError> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_coordinates.lock().push((lat, lon));
        self.respond(&self.current_body)
    }

    async fn forecast(&self, lat: f64, lon: f64) -> Result<ForecastPayload, UpstreamError> {
        self.requested_coordinates.lock().push((lat, lon));
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        self.respond(&self.forecast_body)
    }

    async fn geocode(&self, _query: &str, _limit: u32) -> Result<Vec<GeocodeHit>, UpstreamError> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        self.respond(&self.geocode_body)
    }

    async fn probe(&self) -> Result<ProbeResponse, UpstreamError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        if self.probe_panics.load(Ordering::SeqCst) {
            panic!("scripted probe panic");
        }
        if !self.configured.load(Ordering::SeqCst) {
            return Err(UpstreamError::NotConfigured);
        }
        Ok(ProbeResponse {
            status_code: *self.probe_status.lock(),
            elapsed: Duration::from_millis(3),
        })
    }

    fn is_configured(&self) -> bool {
        self.configured.load(Ordering::SeqCst)
    }

    fn endpoint(&self) -> String {
        "fake.weather.test".to_string()
    }
}

const BASIS_POINTS: u64 = 10_000;

fn basis_points(percent: f64) -> u64 {
    (percent * 100.0).round() as u64
}

/// System sampler reporting fixed percentages
#[derive(Debug)]
pub struct FakeSampler {
    memory_percent: Mutex<f64>,
    cpu_percent: Mutex<f64>,
    disk_percent: Mutex<f64>,
    failing: AtomicBool,
}

impl Default for FakeSampler {
    fn default() -> Self {
        Self {
            memory_percent: Mutex::new(40.0),
            cpu_percent: Mutex::new(10.0),
            disk_percent: Mutex::new(50.0),
            failing: AtomicBool::new(false),
        }
    }
}

impl FakeSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_memory_percent(&self, percent: f64) {
        *self.memory_percent.lock() = percent;
    }

    pub fn set_cpu_percent(&self, percent: f64) {
        *self.cpu_percent.lock() = percent;
    }

    pub fn set_disk_percent(&self, percent: f64) {
        *self.disk_percent.lock() = percent;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), SamplerError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(SamplerError("scripted sampler failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SystemSampler for FakeSampler {
    async fn memory(&self) -> Result<MemoryUsage, SamplerError> {
        self.check()?;
        Ok(MemoryUsage {
            used_bytes: basis_points(*self.memory_percent.lock()),
            total_bytes: BASIS_POINTS,
        })
    }

    async fn cpu_percent(&self) -> Result<f64, SamplerError> {
        self.check()?;
        Ok(*self.cpu_percent.lock())
    }

    async fn disk(&self, _path: &Path) -> Result<DiskUsage, SamplerError> {
        self.check()?;
        Ok(DiskUsage {
            used_bytes: basis_points(*self.disk_percent.lock()),
            total_bytes: BASIS_POINTS,
        })
    }

    fn load_average(&self) -> LoadAverage {
        LoadAverage {
            one: 0.5,
            five: 0.4,
            fifteen: 0.3,
        }
    }
}

/// Datastore that is either reachable or refusing connections
#[derive(Debug)]
pub struct FakeDatastore {
    reachable: AtomicBool,
    pub ping_calls: AtomicUsize,
}

impl FakeDatastore {
    pub fn reachable() -> Self {
        Self {
            reachable: AtomicBool::new(true),
            ping_calls: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: AtomicBool::new(false),
            ping_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    fn connect(&self) -> Result<(), DatastoreError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DatastoreError::Connect("connection refused".to_string()))
        }
    }
}

#[async_trait]
impl Datastore for FakeDatastore {
    fn is_configured(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        "postgresql://***@fake:5432/weather".to_string()
    }

    async fn ping(&self) -> Result<Duration, DatastoreError> {
        self.ping_calls.fetch_add(1, Ordering::SeqCst);
        self.connect()?;
        Ok(Duration::from_millis(2))
    }

    async fn tracked_locations(&self) -> Result<i64, DatastoreError> {
        self.connect()?;
        Ok(12)
    }

    async fn requests_last_hour(&self) -> Result<i64, DatastoreError> {
        self.connect()?;
        Ok(345)
    }
}
