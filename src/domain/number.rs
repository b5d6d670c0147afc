//! 数值序列化辅助
//!
//! 整数值的测量数据（如 28℃、2500 卢比）按 JSON 整数输出，其余按浮点输出

use serde::Serializer;

/// 能无损表示为 i64 的值按整数序列化
pub fn compact<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    #[derive(Serialize)]
    struct Sample {
        #[serde(serialize_with = "super::compact")]
        value: f64,
    }

    #[test]
    fn test_whole_number_is_integer() {
        let json = serde_json::to_string(&Sample { value: 28.0 }).unwrap();
        assert_eq!(json, r#"{"value":28}"#);
    }

    #[test]
    fn test_fraction_is_float() {
        let json = serde_json::to_string(&Sample { value: 27.5 }).unwrap();
        assert_eq!(json, r#"{"value":27.5}"#);
    }
}
