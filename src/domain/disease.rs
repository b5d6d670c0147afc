//! Disease Context - 作物病害诊断值对象

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::DomainError;

/// 病害严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// 线上格式的全部取值
    pub const VARIANTS: &'static [&'static str] = &["mild", "moderate", "severe"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }
}

/// 诊断请求
///
/// `image` 为已解码的原始图片字节
#[derive(Debug, Clone)]
pub struct DiagnosisRequest {
    pub image: Vec<u8>,
    pub crop_type: String,
    pub location: Map<String, Value>,
}

/// 诊断结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub disease_name: String,
    pub confidence: f64,
    pub treatment: String,
    pub severity: Severity,
}

impl Diagnosis {
    /// 创建诊断结果，置信度必须位于 [0, 1]
    pub fn new(
        disease_name: impl Into<String>,
        confidence: f64,
        treatment: impl Into<String>,
        severity: Severity,
    ) -> Result<Self, DomainError> {
        let disease_name = disease_name.into();
        if disease_name.trim().is_empty() {
            return Err(DomainError::Empty("disease_name"));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(DomainError::OutOfRange(format!(
                "confidence {} not in [0, 1]",
                confidence
            )));
        }
        Ok(Self {
            disease_name,
            confidence,
            treatment: treatment.into(),
            severity,
        })
    }
}
