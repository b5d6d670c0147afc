//! Path Template - 路径模板解析与匹配
//!
//! 模板由静态段和参数段组成，例如 `/weather/{location}`。
//! 匹配时先比较段数，再逐段比较：静态段按字面量匹配，参数段按名称绑定。

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use crate::application::error::RegistryError;

/// 绑定后的路径参数
pub type PathParams = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

/// 已解析的路径模板
#[derive(Debug, Clone)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// 解析模板
    ///
    /// 规则：必须以 `/` 开头；末尾的 `/` 被忽略；不允许空段；
    /// 参数名非空、仅含字母数字和下划线，且在同一模板内不重复
    pub fn parse(template: &str) -> Result<Self, RegistryError> {
        let invalid = |reason: &str| RegistryError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let rest = template
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;
        let rest = rest.trim_end_matches('/');

        let mut segments = Vec::new();
        if !rest.is_empty() {
            for part in rest.split('/') {
                if part.is_empty() {
                    return Err(invalid("empty segment"));
                }
                if let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                    if inner.is_empty() {
                        return Err(invalid("empty parameter name"));
                    }
                    if !inner.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        return Err(invalid("parameter names may only contain [A-Za-z0-9_]"));
                    }
                    if segments.contains(&Segment::Param(inner.to_string())) {
                        return Err(invalid("duplicate parameter name"));
                    }
                    segments.push(Segment::Param(inner.to_string()));
                } else if part.contains('{') || part.contains('}') {
                    return Err(invalid("parameters must span a whole segment"));
                } else {
                    segments.push(Segment::Static(part.to_string()));
                }
            }
        }

        let raw = if segments.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", rest)
        };

        Ok(Self { raw, segments })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }

    /// 两个模板是否只在参数名上有差异（`/a/{x}` 与 `/a/{y}` 视为同一模板）
    pub fn same_shape(&self, other: &PathTemplate) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| match (a, b) {
                    (Segment::Static(x), Segment::Static(y)) => x == y,
                    (Segment::Param(_), Segment::Param(_)) => true,
                    _ => false,
                })
    }

    /// 用已切分的请求路径匹配模板，成功时返回绑定的参数
    pub fn match_segments(&self, path: &[&str]) -> Option<PathParams> {
        if path.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::new();
        for (segment, actual) in self.segments.iter().zip(path) {
            match segment {
                Segment::Static(expected) => {
                    if expected != actual {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if actual.is_empty() {
                        return None;
                    }
                    // 解码后不是合法 UTF-8 的参数视为不匹配
                    let value = percent_decode_str(actual).decode_utf8().ok()?;
                    params.insert(name.clone(), value.into_owned());
                }
            }
        }
        Some(params)
    }

    /// 直接匹配请求路径
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        self.match_segments(&split_path(path))
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// 切分请求路径；忽略末尾的 `/`，根路径得到空切片
pub fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path).trim_end_matches('/');
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

/// 拼接前缀与模板，例如 `/api/auth` + `/me` → `/api/auth/me`
pub fn join_paths(prefix: &str, template: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let template = template.trim_start_matches('/');
    match (prefix.is_empty(), template.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{}", template),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}/{}", prefix, template),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_template() {
        let template = PathTemplate::parse("/").unwrap();
        assert_eq!(template.segment_count(), 0);
        assert!(template.matches("/").is_some());
        assert!(template.matches("/health").is_none());
    }

    #[test]
    fn test_param_binding() {
        let template = PathTemplate::parse("/weather/{location}").unwrap();
        let params = template.matches("/weather/delhi").unwrap();
        assert_eq!(params.get("location").map(String::as_str), Some("delhi"));
        assert_eq!(template.param_names().collect::<Vec<_>>(), vec!["location"]);
    }

    #[test]
    fn test_segment_count_mismatch() {
        let template = PathTemplate::parse("/weather/{location}").unwrap();
        assert!(template.matches("/weather").is_none());
        assert!(template.matches("/weather/delhi/today").is_none());
    }

    #[test]
    fn test_trailing_slash_ignored() {
        let template = PathTemplate::parse("/market-prices/").unwrap();
        assert_eq!(template.as_str(), "/market-prices");
        assert!(template.matches("/market-prices/").is_some());
    }

    #[test]
    fn test_empty_segment_not_bound() {
        let template = PathTemplate::parse("/a/{x}/b").unwrap();
        assert!(template.matches("/a//b").is_none());
    }

    #[test]
    fn test_percent_decoding() {
        let template = PathTemplate::parse("/weather/{location}").unwrap();
        let params = template.matches("/weather/new%20delhi").unwrap();
        assert_eq!(params["location"], "new delhi");

        let params = template.matches("/weather/%E0%A4%AA%E0%A5%81%E0%A4%A3%E0%A5%87").unwrap();
        assert_eq!(params["location"], "\u{092a}\u{0941}\u{0923}\u{0947}");
    }

    #[test]
    fn test_invalid_utf8_param_not_bound() {
        let template = PathTemplate::parse("/weather/{location}").unwrap();
        assert!(template.matches("/weather/%FF%FE").is_none());
    }

    #[test]
    fn test_invalid_templates() {
        assert!(PathTemplate::parse("weather").is_err());
        assert!(PathTemplate::parse("/a//b").is_err());
        assert!(PathTemplate::parse("/a/{}").is_err());
        assert!(PathTemplate::parse("/a/{x}/{x}").is_err());
        assert!(PathTemplate::parse("/a/pre{x}").is_err());
    }

    #[test]
    fn test_same_shape_ignores_param_names() {
        let a = PathTemplate::parse("/a/{x}").unwrap();
        let b = PathTemplate::parse("/a/{y}").unwrap();
        let c = PathTemplate::parse("/a/x").unwrap();
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("/api/auth", "/"), "/api/auth");
        assert_eq!(join_paths("/api/auth", "/me"), "/api/auth/me");
        assert_eq!(join_paths("/api/", "v1"), "/api/v1");
        assert_eq!(join_paths("", "/"), "/");
    }
}
