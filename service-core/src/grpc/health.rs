//! gRPC health check service.
//!
//! Wraps `tonic-health` so binaries flip a single named service between
//! serving and not-serving.

use tonic_health::ServingStatus;
use tonic_health::server::HealthReporter as TonicHealthReporter;

/// Reporter for updating one service's health status.
#[derive(Clone)]
pub struct HealthReporter {
    inner: TonicHealthReporter,
    service_name: String,
}

impl HealthReporter {
    /// Mark the service as serving (healthy).
    pub async fn set_serving(&mut self) {
        self.inner
            .set_service_status(&self.service_name, ServingStatus::Serving)
            .await;
    }

    /// Mark the service as not serving, e.g. while draining on shutdown.
    pub async fn set_not_serving(&mut self) {
        self.inner
            .set_service_status(&self.service_name, ServingStatus::NotServing)
            .await;
    }
}

/// Health service components returned by `create_health_service`.
pub struct HealthComponents<S> {
    /// The health server to add to the gRPC router.
    pub server: tonic_health::pb::health_server::HealthServer<S>,
    /// The reporter for updating health status.
    pub reporter: HealthReporter,
}

/// Create a health service whose named service starts out serving.
pub async fn create_health_service(
    service_name: impl Into<String>,
) -> HealthComponents<impl tonic_health::pb::health_server::Health> {
    let (inner, server) = tonic_health::server::health_reporter();
    let mut reporter = HealthReporter {
        inner,
        service_name: service_name.into(),
    };
    reporter.set_serving().await;

    HealthComponents { server, reporter }
}
