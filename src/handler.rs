//! The admission-review decision pipeline: decode the envelope, dispatch on
//! workload kind, check for the target toleration, and build the response
//! (with a patch when the toleration is missing).

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment};
use kube::core::admission::{AdmissionRequest, AdmissionReview, Operation};
use kube::core::DynamicObject;
use tracing::{debug, info};

use crate::error::WebhookError;
use crate::metrics::MutationRecorder;
use crate::response::ReviewResponse;
use crate::workload::{extract, PodWorkload};
use crate::{patch, toleration};

/// Run one admission review through the pipeline. Stateless; every failure is
/// terminal for this request and maps to an HTTP status via
/// [`WebhookError::status`].
pub fn process_review(
    body: &[u8],
    recorder: &dyn MutationRecorder,
) -> Result<ReviewResponse, WebhookError> {
    let review: AdmissionReview<DynamicObject> =
        serde_json::from_slice(body).map_err(WebhookError::Decode)?;
    let request: AdmissionRequest<DynamicObject> = review
        .try_into()
        .map_err(|_| WebhookError::MalformedRequest("request is nil"))?;

    match request.kind.kind.as_str() {
        "Deployment" => admit::<Deployment>(&request, recorder),
        "DaemonSet" => admit::<DaemonSet>(&request, recorder),
        kind => Err(WebhookError::UnsupportedKind(kind.to_string())),
    }
}

fn admit<W: PodWorkload>(
    request: &AdmissionRequest<DynamicObject>,
    recorder: &dyn MutationRecorder,
) -> Result<ReviewResponse, WebhookError> {
    let object = request
        .object
        .as_ref()
        .ok_or(WebhookError::MalformedRequest("object is nil"))?;
    let workload: W = extract(object)?;
    let resource_name = workload.resource_name();

    info!(
        "New admission review request is being processed: User: {:?} Operation: {:?} Resource: {}",
        request.user_info.username, request.operation, resource_name,
    );

    if toleration::contains(workload.tolerations(), &toleration::target()) {
        debug!(
            "Toleration already exists in {} {}, skipping addition",
            W::KIND,
            resource_name
        );
        return Ok(ReviewResponse::allowed(request.uid.clone()));
    }

    info!("Toleration does not exist in {} {}", W::KIND, resource_name);
    let patch = patch::build(&workload)?;
    let warnings = vec![
        format!("{} {} does not have a toleration set.", W::KIND, resource_name),
        format!("{} {} was updated with toleration.", W::KIND, resource_name),
    ];

    recorder.record_mutation(
        operation_label(&request.operation),
        W::KIND,
        workload.name(),
        workload.namespace(),
    );

    Ok(ReviewResponse::mutated(request.uid.clone(), &patch, warnings))
}

fn operation_label(operation: &Operation) -> &'static str {
    match operation {
        Operation::Create => "CREATE",
        Operation::Update => "UPDATE",
        Operation::Delete => "DELETE",
        Operation::Connect => "CONNECT",
    }
}
