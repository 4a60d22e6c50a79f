//! Field mapping between the legacy flat API shape and the new nested API shape
//!
//! The request direction ([`to_new_format`]) is keyed by the legacy `requestType`;
//! the response direction ([`to_legacy_format`]) is keyed by an explicit
//! [`ResultKind`]. Both directions are total: any object carrying the envelope
//! fields converts, and absent optional fields resolve to fixed defaults.

pub mod request;
pub mod request_id;
pub mod response;

pub use request::{
    to_new_format, to_new_format_with, LegacyRequest, NewRequest, OperationKind, Payload,
    RequestContext, RequestMetadata,
};
pub use request_id::generate_request_id;
pub use response::{map_status, to_legacy_format, LegacyData, LegacyResponse, NewResponse, ResultKind};

use serde_json::Value;

/// Whether a field counts as supplied.
///
/// Missing, `null`, `false`, `0` and `""` all count as absent and select the
/// documented default; objects and arrays are always present, even when empty.
pub(crate) fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The value itself when present, otherwise `default`.
pub(crate) fn or_default(value: &Value, default: impl Into<Value>) -> Value {
    if is_present(value) {
        value.clone()
    } else {
        default.into()
    }
}

/// The value itself when present, otherwise `null`.
pub(crate) fn or_null(value: &Value) -> Value {
    or_default(value, Value::Null)
}
