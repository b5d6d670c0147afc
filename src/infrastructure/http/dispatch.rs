//! Dispatch Adapter - axum 请求 → `RequestEnvelope` → `Registry::dispatch`
//!
//! 所有路径都经由 fallback 进入路由表，axum 自身不做路由。
//! 先匹配路由再处理请求体：未知路径直接 404，不读取请求体的路由不缓冲请求体

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Query, Request, State},
    http::header::CONTENT_LENGTH,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use http_body_util::LengthLimitError;

use super::error::ApiError;
use super::middleware::RequestId;
use super::state::AppState;
use crate::application::{DispatchError, RequestEnvelope};

pub async fn dispatch_request(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let limit = state.max_body_bytes;
    let fail = |err: DispatchError| ApiError::new(err, state.debug).into_response();

    let (parts, body) = request.into_parts();

    let reads_body = match state.registry.reads_body(&parts.method, parts.uri.path()) {
        Ok(reads_body) => reads_body,
        Err(err) => return fail(err),
    };

    // 声明的长度已超限，不读取请求体
    if declared_length(&parts.headers).is_some_and(|len| len > limit as u64) {
        return fail(DispatchError::PayloadTooLarge { limit });
    }

    let body = if reads_body {
        match read_body(body, limit).await {
            Ok(body) => body,
            Err(err) => return fail(err),
        }
    } else {
        Vec::new()
    };

    let query = match Query::<BTreeMap<String, String>>::try_from_uri(&parts.uri) {
        Ok(Query(query)) => query,
        Err(rejection) => {
            return fail(DispatchError::validation("query", rejection.body_text()));
        }
    };

    let mut envelope = RequestEnvelope::new(parts.method, parts.uri.path())
        .with_query(query)
        .with_headers(parts.headers)
        .with_body(body);
    if let Some(RequestId(id)) = parts.extensions.get::<RequestId>() {
        envelope = envelope.with_id(*id);
    }

    match state.registry.dispatch(envelope).await {
        Ok(reply) => (reply.status, Json(reply.body)).into_response(),
        Err(err) => fail(err),
    }
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
}

async fn read_body(body: Body, limit: usize) -> Result<Vec<u8>, DispatchError> {
    match to_bytes(body, limit).await {
        Ok(bytes) => Ok(bytes.to_vec()),
        Err(err) => {
            let inner = err.into_inner();
            if inner.is::<LengthLimitError>() {
                Err(DispatchError::PayloadTooLarge { limit })
            } else {
                Err(DispatchError::validation(
                    "body",
                    format!("failed to read request body: {}", inner),
                ))
            }
        }
    }
}
