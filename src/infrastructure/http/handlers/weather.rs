//! Weather Handler
//!
//! `GET /weather/{location}`

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::registry::{FieldKind, Reply, RequestContext, RouteHandler, Schema};
use crate::application::{HandlerError, WeatherProviderPort};

pub fn weather_output() -> Schema {
    Schema::object()
        .field("location", FieldKind::String)
        .field("temperature", FieldKind::number())
        .field("humidity", FieldKind::number_in(0.0, 100.0))
        .field("forecast", FieldKind::String)
}

pub struct WeatherHandler {
    provider: Arc<dyn WeatherProviderPort>,
}

impl WeatherHandler {
    pub fn new(provider: Arc<dyn WeatherProviderPort>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl RouteHandler for WeatherHandler {
    async fn handle(&self, ctx: &mut RequestContext) -> Result<Reply, HandlerError> {
        let location = ctx
            .param("location")
            .ok_or_else(|| HandlerError::internal("route is missing the {location} parameter"))?;
        let report = self.provider.forecast(location).await?;
        Reply::json(&report)
    }
}
