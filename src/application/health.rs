//! Health Checker - 依赖探针聚合
//!
//! 每个探针在独立任务中执行；任务 panic 视为探针机制本身故障

use std::sync::Arc;

use futures_util::future::join_all;

use super::ports::HealthProbe;
use crate::domain::{HealthState, HealthStatus, ProbeReport};

/// 健康检查器
pub struct HealthChecker {
    probes: Vec<Arc<dyn HealthProbe>>,
    version: String,
}

impl HealthChecker {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            probes: Vec::new(),
            version: version.into(),
        }
    }

    /// 添加探针
    pub fn with_probe(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.probes.push(probe);
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// 并发执行全部探针并聚合结果
    pub async fn check(&self) -> HealthStatus {
        let names: Vec<String> = self.probes.iter().map(|p| p.name().to_string()).collect();
        let tasks = self.probes.iter().cloned().map(|probe| {
            tokio::spawn(async move { probe.check().await })
        });
        let outcomes = join_all(tasks).await;

        let mut mechanism_fault = false;
        let reports: Vec<ProbeReport> = names
            .into_iter()
            .zip(outcomes)
            .map(|(name, outcome)| match outcome {
                Ok(Ok(())) => ProbeReport::healthy(name),
                Ok(Err(e)) => ProbeReport::failed(name, e.to_string()),
                Err(join_error) => {
                    mechanism_fault = true;
                    ProbeReport::failed(name, format!("probe task failed: {}", join_error))
                }
            })
            .collect();

        let status = HealthStatus::from_reports(reports, mechanism_fault, self.version.clone());
        log_status(&status);
        status
    }
}

fn log_status(status: &HealthStatus) {
    let failed: Vec<&str> = status
        .probes
        .iter()
        .filter(|p| !p.healthy)
        .map(|p| p.name.as_str())
        .collect();

    match status.status {
        HealthState::Healthy => {
            tracing::info!(probes = status.probes.len(), "Health check passed");
        }
        HealthState::Degraded => {
            tracing::warn!(failed = ?failed, "Health check degraded");
        }
        HealthState::Unhealthy => {
            for probe in status.probes.iter().filter(|p| !p.healthy) {
                tracing::error!(
                    probe = %probe.name,
                    error = probe.error.as_deref().unwrap_or_default(),
                    "Health probe failed"
                );
            }
            tracing::error!(failed = ?failed, "Health check unhealthy");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::ports::ProbeError;
    use async_trait::async_trait;

    pub struct StaticProbe {
        pub name: &'static str,
        pub healthy: bool,
    }

    #[async_trait]
    impl HealthProbe for StaticProbe {
        fn name(&self) -> &str {
            self.name
        }

        async fn check(&self) -> Result<(), ProbeError> {
            if self.healthy {
                Ok(())
            } else {
                Err(ProbeError::Unreachable(format!("{} is down", self.name)))
            }
        }
    }

    struct PanickingProbe;

    #[async_trait]
    impl HealthProbe for PanickingProbe {
        fn name(&self) -> &str {
            "broken"
        }

        async fn check(&self) -> Result<(), ProbeError> {
            panic!("probe exploded");
        }
    }

    fn probe(name: &'static str, healthy: bool) -> Arc<dyn HealthProbe> {
        Arc::new(StaticProbe { name, healthy })
    }

    #[tokio::test]
    async fn test_no_probes_is_healthy() {
        let status = HealthChecker::new("1.0.0").check().await;
        assert_eq!(status.status, HealthState::Healthy);
        assert_eq!(status.version, "1.0.0");
    }

    #[tokio::test]
    async fn test_one_of_two_failing_is_degraded() {
        let checker = HealthChecker::new("1.0.0")
            .with_probe(probe("database", true))
            .with_probe(probe("cache", false));
        let status = checker.check().await;
        assert_eq!(status.status, HealthState::Degraded);
        assert!(!status.probe("cache").unwrap().healthy);
    }

    #[tokio::test]
    async fn test_all_failing_is_unhealthy() {
        let checker = HealthChecker::new("1.0.0").with_probe(probe("database", false));
        let status = checker.check().await;
        assert_eq!(status.status, HealthState::Unhealthy);
        assert_eq!(
            status.probe("database").unwrap().error.as_deref(),
            Some("Dependency unreachable: database is down")
        );
    }

    #[tokio::test]
    async fn test_panicking_probe_is_unhealthy() {
        let checker = HealthChecker::new("1.0.0")
            .with_probe(probe("database", true))
            .with_probe(Arc::new(PanickingProbe));
        let status = checker.check().await;
        assert_eq!(status.status, HealthState::Unhealthy);
        assert!(status.probe("database").unwrap().healthy);
    }
}
