//! Typed views over the workload kinds this webhook mutates.
//!
//! Both supported kinds expose the same two things the pipeline cares about:
//! the metadata annotation map and the pod-template toleration list. The
//! [`PodWorkload`] trait captures exactly that, so the evaluator and the
//! patch builder are kind-agnostic; supporting a new kind means implementing
//! the trait and adding one dispatch arm in the handler.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment};
use k8s_openapi::api::core::v1::Toleration;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::DynamicObject;
use serde::de::DeserializeOwned;

use crate::error::WebhookError;

/// Capability shared by every workload kind that owns a pod template.
pub trait PodWorkload: DeserializeOwned {
    /// The `kind` string as it appears in the admission request.
    const KIND: &'static str;

    fn metadata(&self) -> &ObjectMeta;

    /// Tolerations under `/spec/template/spec/tolerations`; empty when any
    /// part of that path is absent.
    fn tolerations(&self) -> &[Toleration];

    fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    fn namespace(&self) -> &str {
        self.metadata().namespace.as_deref().unwrap_or_default()
    }

    fn annotations(&self) -> Option<&BTreeMap<String, String>> {
        self.metadata().annotations.as_ref()
    }

    /// `namespace/name`, the form used in logs and warning messages.
    fn resource_name(&self) -> String {
        format!("{}/{}", self.namespace(), self.name())
    }
}

impl PodWorkload for Deployment {
    const KIND: &'static str = "Deployment";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn tolerations(&self) -> &[Toleration] {
        self.spec
            .as_ref()
            .and_then(|spec| spec.template.spec.as_ref())
            .and_then(|pod_spec| pod_spec.tolerations.as_deref())
            .unwrap_or_default()
    }
}

impl PodWorkload for DaemonSet {
    const KIND: &'static str = "DaemonSet";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn tolerations(&self) -> &[Toleration] {
        self.spec
            .as_ref()
            .and_then(|spec| spec.template.spec.as_ref())
            .and_then(|pod_spec| pod_spec.tolerations.as_deref())
            .unwrap_or_default()
    }
}

/// Decode the raw embedded object into the kind-specific representation.
pub fn extract<W: PodWorkload>(object: &DynamicObject) -> Result<W, WebhookError> {
    let raw = serde_json::to_value(object).map_err(|source| WebhookError::ObjectUnmarshal {
        kind: W::KIND,
        source,
    })?;
    serde_json::from_value(raw).map_err(|source| WebhookError::ObjectUnmarshal {
        kind: W::KIND,
        source,
    })
}
