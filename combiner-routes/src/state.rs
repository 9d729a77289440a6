use crate::service::PublishService;
use axum::extract::FromRef;
use combiner_clients::HealthChecker;
use combiner_core::ForcePublisher;
use std::sync::Arc;

pub struct CombinerAppState<P> {
    pub service: PublishService<P>,
    pub health: Arc<HealthChecker>,
    pub metrics_enabled: bool,
}

impl<P> Clone for CombinerAppState<P> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            health: Arc::clone(&self.health),
            metrics_enabled: self.metrics_enabled,
        }
    }
}

impl<P: ForcePublisher> CombinerAppState<P> {
    pub fn new_with_metrics(publisher: P, health: HealthChecker) -> Self {
        Self {
            service: PublishService::new(publisher),
            health: Arc::new(health),
            metrics_enabled: true,
        }
    }

    pub fn new_without_metrics(publisher: P, health: HealthChecker) -> Self {
        Self {
            service: PublishService::new(publisher),
            health: Arc::new(health),
            metrics_enabled: false,
        }
    }
}

impl<P> FromRef<CombinerAppState<P>> for PublishService<P> {
    fn from_ref(input: &CombinerAppState<P>) -> Self {
        input.service.clone()
    }
}

impl<P> FromRef<CombinerAppState<P>> for Arc<HealthChecker> {
    fn from_ref(input: &CombinerAppState<P>) -> Self {
        Arc::clone(&input.health)
    }
}
