//! The outbound admission review envelope.
//!
//! The envelope is intentionally minimal: the API server only consults
//! `response.uid`, `response.allowed`, the optional base64 JSON patch and the
//! optional warnings, so that is all we emit.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::WebhookError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub response: MutationResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MutationResponse {
    /// Echoed from the request; the API server correlates on it.
    pub uid: String,
    /// Always true; this webhook never denies.
    pub allowed: bool,
    /// Base64-encoded JSON Patch, present iff a mutation occurred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

impl ReviewResponse {
    /// An allow response with no mutation.
    pub fn allowed(uid: String) -> Self {
        ReviewResponse {
            response: MutationResponse {
                uid,
                allowed: true,
                patch: None,
                warnings: None,
            },
        }
    }

    /// An allow response carrying a patch and the warnings describing it.
    pub fn mutated(uid: String, patch: &[u8], warnings: Vec<String>) -> Self {
        ReviewResponse {
            response: MutationResponse {
                uid,
                allowed: true,
                patch: Some(BASE64.encode(patch)),
                warnings: Some(warnings),
            },
        }
    }

    /// Serialize to the wire. The only internal fault allowed to fail the
    /// HTTP exchange; not expected to ever trigger for these shapes.
    pub fn encode(&self) -> Result<Vec<u8>, WebhookError> {
        serde_json::to_vec(self).map_err(WebhookError::ResponseEncode)
    }
}
