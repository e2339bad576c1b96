//! Generation settings.

use serde::{Deserialize, Serialize};

/// Settings controlling a single model call.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GenerationSettings {
    pub temperature: Option<f64>,
}
