//! Stub Disease Detector

use async_trait::async_trait;

use crate::application::ports::{DiseaseDetectorPort, ProviderError};
use crate::domain::{Diagnosis, DiagnosisRequest, Severity};

/// 始终诊断为叶枯病
#[derive(Debug, Default, Clone)]
pub struct StubDiseaseDetector;

impl StubDiseaseDetector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DiseaseDetectorPort for StubDiseaseDetector {
    async fn detect(&self, request: DiagnosisRequest) -> Result<Diagnosis, ProviderError> {
        if request.image.is_empty() {
            return Err(ProviderError::InvalidInput("image is empty".to_string()));
        }

        tracing::debug!(
            crop_type = %request.crop_type,
            image_bytes = request.image.len(),
            "StubDiseaseDetector: returning fixed diagnosis"
        );

        Diagnosis::new(
            "Leaf Blight",
            0.92,
            "Apply fungicide spray. Remove infected leaves.",
            Severity::Moderate,
        )
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[tokio::test]
    async fn test_fixed_diagnosis() {
        let request = DiagnosisRequest {
            image: vec![0xff, 0xd8, 0xff],
            crop_type: "rice".to_string(),
            location: Map::new(),
        };
        let diagnosis = StubDiseaseDetector::new().detect(request).await.unwrap();
        assert_eq!(diagnosis.disease_name, "Leaf Blight");
        assert_eq!(diagnosis.severity, Severity::Moderate);
    }
}
