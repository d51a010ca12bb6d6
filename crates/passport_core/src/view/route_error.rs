//! Error payloads carried in the route.
//!
//! The routing layer may deliver an `ErrorData` as percent-encoded JSON. A
//! payload that cannot be decoded resolves to a generic error instead of
//! being dropped, so the document view is never shown over a broken error.

use crate::view::document::ErrorData;
use log::warn;
use percent_encoding::percent_decode_str;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error kind used when a route error payload cannot be decoded.
pub const INVALID_ERROR_PAYLOAD_KIND: &str = "invalid_error_payload";
const INVALID_ERROR_PAYLOAD_MESSAGE: &str = "The error details for this page could not be read.";

/// Decodes one percent-encoded JSON error payload.
///
/// # Errors
/// - `RouteErrorDecodeError::InvalidUtf8` when the decoded bytes are not UTF-8.
/// - `RouteErrorDecodeError::InvalidJson` when the text is not an `ErrorData` object.
pub fn decode_route_error(raw: &str) -> Result<ErrorData, RouteErrorDecodeError> {
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|err| RouteErrorDecodeError::InvalidUtf8(err.to_string()))?;
    serde_json::from_str::<ErrorData>(&decoded)
        .map_err(|err| RouteErrorDecodeError::InvalidJson(err.to_string()))
}

/// Resolves the optional route error into the error to display.
///
/// - `None` or blank input -> `None`.
/// - Decodable payload -> that error.
/// - Undecodable payload -> generic `invalid_error_payload` error.
pub fn resolve_route_error(raw: Option<&str>) -> Option<ErrorData> {
    let raw = raw.map(str::trim).filter(|value| !value.is_empty())?;
    match decode_route_error(raw) {
        Ok(error) => Some(error),
        Err(err) => {
            warn!(
                "event=route_error_decode module=view status=error error={}",
                err
            );
            Some(ErrorData::new(
                INVALID_ERROR_PAYLOAD_KIND,
                INVALID_ERROR_PAYLOAD_MESSAGE,
            ))
        }
    }
}

/// Route error payload decode failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteErrorDecodeError {
    InvalidUtf8(String),
    InvalidJson(String),
}

impl Display for RouteErrorDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUtf8(details) => {
                write!(f, "route error payload is not valid utf-8: {details}")
            }
            Self::InvalidJson(details) => {
                write!(f, "route error payload is not valid error json: {details}")
            }
        }
    }
}

impl Error for RouteErrorDecodeError {}
