use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Captures JSON object keys a wire type doesn't model, so a forward-compatible client
/// payload round-trips without the gateway rejecting fields it simply has no opinion
/// about.
// TODO: use a more efficient representation once the field set stabilises.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UnknownFields(#[serde(flatten)] pub HashMap<String, Value>);
