//! Health - 服务健康状态

use serde::Serialize;

/// 聚合健康状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Healthy => "healthy",
            HealthState::Degraded => "degraded",
            HealthState::Unhealthy => "unhealthy",
        }
    }

    /// 聚合规则:
    /// - 探针机制本身故障，或全部探针失败 → Unhealthy
    /// - 部分探针失败 → Degraded
    /// - 无失败（包括没有探针）→ Healthy
    pub fn aggregate(reports: &[ProbeReport], mechanism_fault: bool) -> Self {
        if mechanism_fault {
            return HealthState::Unhealthy;
        }
        let failed = reports.iter().filter(|r| !r.healthy).count();
        if failed == 0 {
            HealthState::Healthy
        } else if failed == reports.len() {
            HealthState::Unhealthy
        } else {
            HealthState::Degraded
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            HealthState::Healthy => "All systems operational",
            HealthState::Degraded => "Some dependencies are unavailable",
            HealthState::Unhealthy => "Service is unhealthy",
        }
    }
}

/// 单个探针结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub name: String,
    pub healthy: bool,
    pub error: Option<String>,
}

impl ProbeReport {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            healthy: true,
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            healthy: false,
            error: Some(error.into()),
        }
    }
}

/// 按需计算的健康状态，不做持久化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: HealthState,
    pub message: String,
    pub version: String,
    pub probes: Vec<ProbeReport>,
}

impl HealthStatus {
    pub fn from_reports(
        probes: Vec<ProbeReport>,
        mechanism_fault: bool,
        version: impl Into<String>,
    ) -> Self {
        let status = HealthState::aggregate(&probes, mechanism_fault);
        Self {
            status,
            message: status.message().to_string(),
            version: version.into(),
            probes,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthState::Healthy
    }

    pub fn probe(&self, name: &str) -> Option<&ProbeReport> {
        self.probes.iter().find(|p| p.name == name)
    }
}
