//! Disease Detection Handler
//!
//! `POST /detect-disease`

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::application::registry::{FieldKind, Reply, RequestContext, RouteHandler, Schema};
use crate::application::{DiseaseDetectorPort, HandlerError};
use crate::domain::{DiagnosisRequest, Severity};

pub fn detect_disease_input() -> Schema {
    Schema::object()
        .field("image", FieldKind::Base64)
        .field("crop_type", FieldKind::String)
        .field("location", FieldKind::Object)
}

pub fn diagnosis_output() -> Schema {
    Schema::object()
        .field("disease_name", FieldKind::String)
        .field("confidence", FieldKind::number_in(0.0, 1.0))
        .field("treatment", FieldKind::String)
        .field("severity", FieldKind::Enum(Severity::VARIANTS))
}

/// 解码图片载荷，忽略 MIME 编码中的换行
fn decode_image(encoded: &str) -> Result<Vec<u8>, HandlerError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|_| HandlerError::invalid_field("image", "expected a base64-encoded string"))
}

pub struct DetectDiseaseHandler {
    detector: Arc<dyn DiseaseDetectorPort>,
}

impl DetectDiseaseHandler {
    pub fn new(detector: Arc<dyn DiseaseDetectorPort>) -> Self {
        Self { detector }
    }
}

#[async_trait]
impl RouteHandler for DetectDiseaseHandler {
    async fn handle(&self, ctx: &mut RequestContext) -> Result<Reply, HandlerError> {
        let image = decode_image(ctx.input_str("image").unwrap_or_default())?;

        let request = DiagnosisRequest {
            image,
            crop_type: ctx.input_str("crop_type").unwrap_or_default().to_string(),
            location: ctx
                .input_value()
                .get("location")
                .and_then(|v| v.as_object())
                .cloned()
                .unwrap_or_default(),
        };

        let crop_type = request.crop_type.clone();
        let diagnosis = self.detector.detect(request).await?;

        tracing::info!(
            crop_type = %crop_type,
            disease = %diagnosis.disease_name,
            confidence = diagnosis.confidence,
            "Disease detected"
        );

        Reply::json(&diagnosis)
    }
}
