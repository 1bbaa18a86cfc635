use warp::http::StatusCode;

/// Errors surfaced by the admission pipeline. Every variant is terminal for
/// its request: the server turns it into a plain-text HTTP error and moves on.
#[derive(Debug)]
pub enum WebhookError {
    /// The body is not a valid AdmissionReview document.
    Decode(serde_json::Error),
    /// The envelope decoded but is missing a mandatory part.
    MalformedRequest(&'static str),
    /// The declared workload kind is not in the supported set.
    UnsupportedKind(String),
    /// The kind is recognized but the raw object does not match its shape.
    ObjectUnmarshal {
        kind: &'static str,
        source: serde_json::Error,
    },
    /// Serializing the JSON patch failed.
    PatchEncode(serde_json::Error),
    /// Serializing the response envelope failed.
    ResponseEncode(serde_json::Error),
}

impl WebhookError {
    /// HTTP status for this error: caller input faults are 400, encoding
    /// failures on our side are 500.
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::Decode(_)
            | WebhookError::MalformedRequest(_)
            | WebhookError::UnsupportedKind(_)
            | WebhookError::ObjectUnmarshal { .. } => StatusCode::BAD_REQUEST,
            WebhookError::PatchEncode(_) | WebhookError::ResponseEncode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl std::fmt::Display for WebhookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookError::Decode(err) => {
                write!(f, "could not deserialize request: {}", err)
            }
            WebhookError::MalformedRequest(what) => {
                write!(f, "malformed admission review ({})", what)
            }
            WebhookError::UnsupportedKind(kind) => {
                write!(f, "unsupported resource type: {}", kind)
            }
            WebhookError::ObjectUnmarshal { kind, source } => {
                write!(f, "could not unmarshal {} on admission request: {}", kind, source)
            }
            WebhookError::PatchEncode(err) => {
                write!(f, "could not marshal JSON patch: {}", err)
            }
            WebhookError::ResponseEncode(err) => {
                write!(f, "could not marshal JSON admission response: {}", err)
            }
        }
    }
}

impl std::error::Error for WebhookError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WebhookError::Decode(err)
            | WebhookError::ObjectUnmarshal { source: err, .. }
            | WebhookError::PatchEncode(err)
            | WebhookError::ResponseEncode(err) => Some(err),
            WebhookError::MalformedRequest(_) | WebhookError::UnsupportedKind(_) => None,
        }
    }
}
