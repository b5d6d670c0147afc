//! Weather Context - 天气预报值对象

use serde::Serialize;

use super::errors::DomainError;

/// 天气报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub location: String,
    /// 摄氏度
    #[serde(serialize_with = "super::number::compact")]
    pub temperature: f64,
    /// 相对湿度（百分比，0-100）
    #[serde(serialize_with = "super::number::compact")]
    pub humidity: f64,
    pub forecast: String,
}

impl WeatherReport {
    pub fn new(
        location: impl Into<String>,
        temperature: f64,
        humidity: f64,
        forecast: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if !(0.0..=100.0).contains(&humidity) {
            return Err(DomainError::OutOfRange(format!(
                "humidity {} not in [0, 100]",
                humidity
            )));
        }
        if !temperature.is_finite() {
            return Err(DomainError::OutOfRange("temperature".to_string()));
        }
        Ok(Self {
            location: location.into(),
            temperature,
            humidity,
            forecast: forecast.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humidity_bounds() {
        assert!(WeatherReport::new("delhi", 28.0, 65.0, "Partly cloudy").is_ok());
        assert!(WeatherReport::new("delhi", 28.0, 101.0, "Humid").is_err());
    }

    #[test]
    fn test_serialization() {
        let report = WeatherReport::new("delhi", 28.0, 65.0, "Partly cloudy").unwrap();
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({
                "location": "delhi",
                "temperature": 28,
                "humidity": 65,
                "forecast": "Partly cloudy"
            })
        );
    }
}
