use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw provider payload. Rows stay loosely typed until normalised.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSnapshotBatch {
    #[serde(default)]
    pub rows: Vec<Value>,
}
