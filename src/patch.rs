//! Builds the JSON patch applied to workloads that lack the target toleration.

use json_patch::{Patch, PatchOperation, ReplaceOperation};
use jsonptr::Pointer;

use crate::error::WebhookError;
use crate::toleration;
use crate::workload::PodWorkload;

/// Annotation key stamped on every mutated object.
pub const UPDATED_BY_KEY: &str = "updated_by";
/// Annotation value identifying this webhook as the author of the mutation.
pub const UPDATED_BY_VALUE: &str = "tolerationWebhook";

/// Build the serialized JSON patch for a workload known to lack the target
/// toleration: one `replace` of the full toleration list (target appended
/// last, existing entries untouched) followed by one `replace` of the full
/// annotation map (`updated_by` set, existing keys preserved).
pub fn build<W: PodWorkload>(workload: &W) -> Result<Vec<u8>, WebhookError> {
    let mut tolerations = workload.tolerations().to_vec();
    tolerations.push(toleration::target());

    // The annotation map may be absent entirely; start from an empty one.
    let mut annotations = workload.annotations().cloned().unwrap_or_default();
    annotations.insert(UPDATED_BY_KEY.to_string(), UPDATED_BY_VALUE.to_string());

    let patch = Patch(vec![
        PatchOperation::Replace(ReplaceOperation {
            path: Pointer::new(["spec", "template", "spec", "tolerations"]),
            value: serde_json::to_value(&tolerations).map_err(WebhookError::PatchEncode)?,
        }),
        PatchOperation::Replace(ReplaceOperation {
            path: Pointer::new(["metadata", "annotations"]),
            value: serde_json::to_value(&annotations).map_err(WebhookError::PatchEncode)?,
        }),
    ]);

    serde_json::to_vec(&patch).map_err(WebhookError::PatchEncode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::apps::v1::Deployment;
    use serde_json::{json, Value};

    fn deployment(value: Value) -> Deployment {
        serde_json::from_value(value).unwrap()
    }

    fn build_value(workload: &Deployment) -> Value {
        serde_json::from_slice(&build(workload).unwrap()).unwrap()
    }

    #[test]
    fn emits_two_replace_operations_in_order() {
        let dep = deployment(json!({
            "metadata": {"name": "test-dep", "namespace": "foo"},
            "spec": {"template": {"spec": {"restartPolicy": "Always"}}}
        }));

        let ops = build_value(&dep);
        let ops = ops.as_array().unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0]["op"], "replace");
        assert_eq!(ops[0]["path"], "/spec/template/spec/tolerations");
        assert_eq!(ops[1]["op"], "replace");
        assert_eq!(ops[1]["path"], "/metadata/annotations");
    }

    #[test]
    fn existing_tolerations_are_preserved_and_target_appended_last() {
        let dep = deployment(json!({
            "metadata": {"name": "test-dep", "namespace": "foo"},
            "spec": {"template": {"spec": {"tolerations": [
                {"key": "first", "operator": "Equal", "value": "a", "effect": "NoSchedule"},
                {"key": "second", "operator": "Exists", "effect": "NoExecute"}
            ]}}}
        }));

        let ops = build_value(&dep);
        let list = ops[0]["value"].as_array().unwrap().clone();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0]["key"], "first");
        assert_eq!(list[0]["value"], "a");
        assert_eq!(list[1]["key"], "second");
        assert_eq!(list[2]["key"], "SimulateNodeFailure");
        assert_eq!(list[2]["operator"], "Exists");
        assert_eq!(list[2]["effect"], "NoExecute");
    }

    #[test]
    fn annotations_are_merged_not_replaced() {
        let dep = deployment(json!({
            "metadata": {
                "name": "test-dep",
                "namespace": "foo",
                "annotations": {"some_annotation": "some_value"}
            },
            "spec": {"template": {"spec": {}}}
        }));

        let ops = build_value(&dep);
        assert_eq!(
            ops[1]["value"],
            json!({"some_annotation": "some_value", "updated_by": "tolerationWebhook"})
        );
    }

    #[test]
    fn absent_annotation_map_is_created() {
        let dep = deployment(json!({
            "metadata": {"name": "test-dep", "namespace": "foo"},
            "spec": {"template": {"spec": {}}}
        }));

        let ops = build_value(&dep);
        assert_eq!(ops[1]["value"], json!({"updated_by": "tolerationWebhook"}));
    }

    #[test]
    fn prior_updated_by_value_is_overwritten() {
        let dep = deployment(json!({
            "metadata": {
                "name": "test-dep",
                "namespace": "foo",
                "annotations": {"updated_by": "someone-else"}
            },
            "spec": {"template": {"spec": {}}}
        }));

        let ops = build_value(&dep);
        assert_eq!(ops[1]["value"]["updated_by"], "tolerationWebhook");
    }
}
