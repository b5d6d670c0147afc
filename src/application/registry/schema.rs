//! Schema - 请求/响应结构约定
//!
//! 以普通数据描述 JSON 对象的字段，用于分发前校验输入、分发后校验输出。
//! 校验失败时按字段逐项给出错误。

use serde_json::{Map, Value};

use crate::application::error::FieldError;

/// 字段类型
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    /// base64 编码的字符串（标准字母表，须补齐 `=`，允许换行）
    Base64,
    /// 数值，可选闭区间约束
    Number { min: Option<f64>, max: Option<f64> },
    Integer,
    Boolean,
    /// 任意 JSON 对象
    Object,
    /// 取值限定在给定集合内的字符串
    Enum(&'static [&'static str]),
}

impl FieldKind {
    pub fn number() -> Self {
        FieldKind::Number {
            min: None,
            max: None,
        }
    }

    pub fn number_in(min: f64, max: f64) -> Self {
        FieldKind::Number {
            min: Some(min),
            max: Some(max),
        }
    }

    /// 检查单个值，返回错误描述
    fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            FieldKind::String => value
                .as_str()
                .map(|_| ())
                .ok_or_else(|| "expected a string".to_string()),
            FieldKind::Base64 => {
                let s = value
                    .as_str()
                    .ok_or_else(|| "expected a base64-encoded string".to_string())?;
                if s.is_empty() {
                    return Err("must not be empty".to_string());
                }
                if is_base64(s) {
                    Ok(())
                } else {
                    Err("expected a base64-encoded string".to_string())
                }
            }
            FieldKind::Number { min, max } => {
                let n = value
                    .as_f64()
                    .ok_or_else(|| "expected a number".to_string())?;
                let below = min.map(|m| n < m).unwrap_or(false);
                let above = max.map(|m| n > m).unwrap_or(false);
                if below || above {
                    return Err(match (min, max) {
                        (Some(lo), Some(hi)) => format!("must be between {} and {}", lo, hi),
                        (Some(lo), None) => format!("must be at least {}", lo),
                        (None, Some(hi)) => format!("must be at most {}", hi),
                        (None, None) => "out of range".to_string(),
                    });
                }
                Ok(())
            }
            FieldKind::Integer => {
                if value.is_i64() || value.is_u64() {
                    Ok(())
                } else {
                    Err("expected an integer".to_string())
                }
            }
            FieldKind::Boolean => value
                .as_bool()
                .map(|_| ())
                .ok_or_else(|| "expected a boolean".to_string()),
            FieldKind::Object => value
                .as_object()
                .map(|_| ())
                .ok_or_else(|| "expected an object".to_string()),
            FieldKind::Enum(variants) => match value.as_str() {
                Some(s) if variants.contains(&s) => Ok(()),
                _ => Err(format!("must be one of: {}", variants.join(", "))),
            },
        }
    }
}

/// 只检查字母表、长度与填充，不解码；解码由使用该字段的处理器完成
fn is_base64(s: &str) -> bool {
    let bytes: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if bytes.is_empty() || bytes.len() % 4 != 0 {
        return false;
    }
    let data_len = bytes.iter().rposition(|b| *b != b'=').map_or(0, |i| i + 1);
    bytes.len() - data_len <= 2
        && bytes[..data_len]
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'+' || *b == b'/')
}

#[derive(Debug, Clone, PartialEq)]
struct Field {
    name: &'static str,
    kind: FieldKind,
    required: bool,
    default: Option<Value>,
}

/// JSON 对象结构约定
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn object() -> Self {
        Self::default()
    }

    /// 必填字段
    pub fn field(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(Field {
            name,
            kind,
            required: true,
            default: None,
        });
        self
    }

    /// 可选字段
    pub fn optional(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(Field {
            name,
            kind,
            required: false,
            default: None,
        });
        self
    }

    /// 带默认值的可选字段，缺省时补齐
    pub fn with_default(
        mut self,
        name: &'static str,
        kind: FieldKind,
        default: impl Into<Value>,
    ) -> Self {
        self.fields.push(Field {
            name,
            kind,
            required: false,
            default: Some(default.into()),
        });
        self
    }

    /// 校验并规范化
    ///
    /// 返回只包含已声明字段的对象（缺省字段已补默认值）；
    /// `null` 按缺失处理，未声明的字段被丢弃
    pub fn validate(&self, value: &Value) -> Result<Map<String, Value>, Vec<FieldError>> {
        let object = value
            .as_object()
            .ok_or_else(|| vec![FieldError::new("body", "expected a JSON object")])?;

        let mut errors = Vec::new();
        let mut normalized = Map::new();

        for field in &self.fields {
            match object.get(field.name).filter(|v| !v.is_null()) {
                Some(v) => match field.kind.check(v) {
                    Ok(()) => {
                        normalized.insert(field.name.to_string(), v.clone());
                    }
                    Err(message) => errors.push(FieldError::new(field.name, message)),
                },
                None => {
                    if let Some(default) = &field.default {
                        normalized.insert(field.name.to_string(), default.clone());
                    } else if field.required {
                        errors.push(FieldError::new(field.name, "field required"));
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(normalized)
        } else {
            Err(errors)
        }
    }
}
