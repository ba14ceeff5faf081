// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Handler results and the HTTP response envelope.
//!
//! Handlers return a [`HandlerResult`]: either a keyed JSON mapping or a
//! [`MalformedResult`]. [`ResponseBuilder`] is the single gate that turns one
//! into a [`ResponseEnvelope`]. A mapping is rendered with the requested
//! status; anything else becomes a fixed 500 body.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;
use std::io;
use thiserror::Error;

/// Keyed JSON result, e.g. `{"nodes": [...]}`. Keys keep insertion order.
pub type JsonMap = serde_json::Map<String, Value>;

/// What a route handler hands to [`ResponseBuilder`].
pub type HandlerResult = Result<JsonMap, MalformedResult>;

/// Body sent whenever a handler result cannot be rendered.
pub const MALFORMED_BODY: &str = r#"{"error": "could not create json response"}"#;

/// A handler produced something other than a keyed mapping.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedResult {
    #[error("handler returned {0}, expected a JSON object")]
    NotAMapping(&'static str),

    #[error("could not serialize handler result: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for MalformedResult {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}

/// Convert an untyped value into a handler result.
pub fn mapping_of(value: Value) -> HandlerResult {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Err(MalformedResult::NotAMapping("null")),
        Value::Bool(_) => Err(MalformedResult::NotAMapping("a boolean")),
        Value::Number(_) => Err(MalformedResult::NotAMapping("a number")),
        Value::String(_) => Err(MalformedResult::NotAMapping("a string")),
        Value::Array(_) => Err(MalformedResult::NotAMapping("an array")),
    }
}

/// Serialize any value and require it to come out as a mapping.
pub fn to_mapping<T: Serialize + ?Sized>(value: &T) -> HandlerResult {
    mapping_of(serde_json::to_value(value)?)
}

/// Single-key mapping: `{key: items}`.
pub fn keyed<T: Serialize>(key: &str, items: T) -> HandlerResult {
    let mut map = JsonMap::new();
    map.insert(key.to_string(), serde_json::to_value(items)?);
    Ok(map)
}

/// Immutable status + body pair produced once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    status: StatusCode,
    body: String,
}

impl ResponseEnvelope {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            self.body,
        )
            .into_response()
    }
}

/// Renders handler results into response envelopes.
pub struct ResponseBuilder;

impl ResponseBuilder {
    /// Render `result` with status `code`, or the fixed 500 body if the
    /// result is malformed. `code` is ignored on the error path.
    pub fn build(result: HandlerResult, code: StatusCode) -> ResponseEnvelope {
        match result.and_then(|map| encode(&map)) {
            Ok(body) => ResponseEnvelope { status: code, body },
            Err(err) => {
                tracing::warn!("[rest] {}", err);
                Self::malformed()
            }
        }
    }

    /// Same as [`build`](Self::build) for an untyped value: only objects
    /// are accepted.
    pub fn build_value(value: Value, code: StatusCode) -> ResponseEnvelope {
        Self::build(mapping_of(value), code)
    }

    /// The fixed 500 envelope.
    pub fn malformed() -> ResponseEnvelope {
        ResponseEnvelope {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: MALFORMED_BODY.to_string(),
        }
    }
}

/// Compact JSON with `", "` and `": "` separators.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

fn encode(map: &JsonMap) -> Result<String, MalformedResult> {
    let mut serializer = serde_json::Serializer::with_formatter(Vec::new(), SpacedFormatter);
    map.serialize(&mut serializer)?;
    String::from_utf8(serializer.into_inner())
        .map_err(|e| MalformedResult::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_mapping() {
        let envelope = ResponseBuilder::build_value(json!({"nodes": ["h1", "s1"]}), StatusCode::OK);
        assert_eq!(envelope.status(), StatusCode::OK);
        assert_eq!(envelope.body(), r#"{"nodes": ["h1", "s1"]}"#);
    }

    #[test]
    fn test_build_keeps_requested_code() {
        let hosts = keyed("hosts", Vec::<String>::new());
        let envelope = ResponseBuilder::build(hosts, StatusCode::ACCEPTED);
        assert_eq!(envelope.status(), StatusCode::ACCEPTED);
        assert_eq!(envelope.body(), r#"{"hosts": []}"#);
    }

    #[test]
    fn test_nested_arrays() {
        let envelope = ResponseBuilder::build_value(
            json!({"links": [["h1-eth0", "s1-eth1"], ["h2-eth0", "s1-eth2"]]}),
            StatusCode::OK,
        );
        assert_eq!(
            envelope.body(),
            r#"{"links": [["h1-eth0", "s1-eth1"], ["h2-eth0", "s1-eth2"]]}"#
        );
    }

    #[test]
    fn test_key_order_preserved() {
        let mut map = JsonMap::new();
        map.insert("nodes".into(), json!([]));
        map.insert("links".into(), json!([]));
        let envelope = ResponseBuilder::build(Ok(map), StatusCode::OK);
        assert_eq!(envelope.body(), r#"{"nodes": [], "links": []}"#);
    }

    #[test]
    fn test_non_mapping_values_are_500() {
        let malformed = [
            Value::Null,
            json!(true),
            json!(42),
            json!("nodes"),
            json!(["h1", "h2"]),
        ];
        for value in malformed {
            let envelope = ResponseBuilder::build_value(value, StatusCode::OK);
            assert_eq!(envelope.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(envelope.body(), MALFORMED_BODY);
        }
    }

    #[test]
    fn test_error_ignores_requested_code() {
        let envelope = ResponseBuilder::build(
            Err(MalformedResult::NotAMapping("an array")),
            StatusCode::CREATED,
        );
        assert_eq!(envelope.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_malformed_body_matches_encoder() {
        let map = mapping_of(json!({"error": "could not create json response"})).expect("object");
        assert_eq!(encode(&map).expect("encode"), MALFORMED_BODY);
    }

    #[test]
    fn test_to_mapping_rejects_sequences() {
        assert_eq!(
            to_mapping(&vec!["h1"]),
            Err(MalformedResult::NotAMapping("an array"))
        );
    }
}
