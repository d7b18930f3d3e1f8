use serde::{Deserialize, Serialize};

/// Outcome of one image-to-text run, as reported by the `--json` output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExtractionReport {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            success: true,
            text: Some(text.into()),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            text: None,
            message: Some(message.into()),
        }
    }
}
