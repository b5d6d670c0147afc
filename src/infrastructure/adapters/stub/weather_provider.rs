//! Stub Weather Provider

use async_trait::async_trait;

use crate::application::ports::{ProviderError, WeatherProviderPort};
use crate::domain::WeatherReport;

#[derive(Debug, Default, Clone)]
pub struct StubWeatherProvider;

impl StubWeatherProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WeatherProviderPort for StubWeatherProvider {
    async fn forecast(&self, location: &str) -> Result<WeatherReport, ProviderError> {
        WeatherReport::new(location, 28.0, 65.0, "Partly cloudy")
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}
