//! Common types used throughout fetchkit
//!
//! Shared type aliases for JSON values and callback signatures used across
//! multiple modules.

use crate::error::BoxError;
use bytes::Bytes;
use std::sync::Arc;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Parser Contract
// ============================================================================

/// Shared parser turning raw response bytes into a value.
///
/// Parsers run synchronously within completion handling; a failure is
/// reported to the completion callback as an invalid-data error.
pub type ResponseParser<T> = Arc<dyn Fn(&Bytes) -> Result<T, BoxError> + Send + Sync>;
