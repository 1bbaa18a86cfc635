//! The toleration rule this webhook enforces, and the membership test for it.

use k8s_openapi::api::core::v1::Toleration;

/// The toleration injected into every workload that lacks it. Read-only for
/// the lifetime of the process.
pub fn target() -> Toleration {
    Toleration {
        key: Some("SimulateNodeFailure".to_string()),
        operator: Some("Exists".to_string()),
        effect: Some("NoExecute".to_string()),
        ..Default::default()
    }
}

/// Structural equality on (key, operator, value, effect). Absent fields
/// compare as the empty string, so `{"operator":"Exists"}` and
/// `{"operator":"Exists","value":""}` are the same toleration.
/// `toleration_seconds` is deliberately not part of the identity.
fn matches(a: &Toleration, b: &Toleration) -> bool {
    a.key.as_deref().unwrap_or_default() == b.key.as_deref().unwrap_or_default()
        && a.operator.as_deref().unwrap_or_default() == b.operator.as_deref().unwrap_or_default()
        && a.value.as_deref().unwrap_or_default() == b.value.as_deref().unwrap_or_default()
        && a.effect.as_deref().unwrap_or_default() == b.effect.as_deref().unwrap_or_default()
}

/// Returns true if `tolerations` already contains an entry equal to `wanted`.
/// Order-independent membership test; O(n) over a handful of entries.
pub fn contains(tolerations: &[Toleration], wanted: &Toleration) -> bool {
    tolerations.iter().any(|t| matches(t, wanted))
}
