//! HTTP surface: a single `/mutate` endpoint behind TLS.
//!
//! The transport guard lives here: only POST bodies with a JSON content type
//! reach the pipeline; everything else is answered before any decoding
//! happens. Pipeline errors become plain-text responses with the status the
//! error taxonomy assigns.

use std::convert::Infallible;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{error, info};
use warp::http::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use warp::http::StatusCode;
use warp::{reply, Filter, Rejection, Reply};

use crate::handler::process_review;
use crate::metrics::MutationRecorder;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// The complete filter chain for the webhook endpoint.
pub fn routes(
    recorder: Arc<dyn MutationRecorder>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let recorder = warp::any().map(move || recorder.clone());

    warp::path("mutate")
        .and(warp::post())
        .and(warp::header::optional::<String>("content-type"))
        .and(warp::body::bytes())
        .and(recorder)
        .and_then(mutate)
        .with(warp::trace::request())
        .recover(handle_rejection)
}

async fn mutate(
    content_type: Option<String>,
    body: Bytes,
    recorder: Arc<dyn MutationRecorder>,
) -> Result<reply::Response, Rejection> {
    if content_type.as_deref() != Some(JSON_CONTENT_TYPE) {
        let message = format!("Invalid content type {}", content_type.unwrap_or_default());
        return Ok(reply::with_status(message, StatusCode::BAD_REQUEST).into_response());
    }

    match process_review(&body, recorder.as_ref()).and_then(|response| response.encode()) {
        Ok(bytes) => {
            let mut response = reply::Response::new(bytes.into());
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
            Ok(response)
        }
        Err(err) => {
            error!("Admission request failed: {}", err);
            Ok(reply::with_status(err.to_string(), err.status()).into_response())
        }
    }
}

/// Map warp rejections to the transport-guard contract: 405 with an `Allow`
/// header for non-POST, 404 for unknown paths, 400 for anything else the
/// filters refused (unreadable bodies and the like).
async fn handle_rejection(rejection: Rejection) -> Result<reply::Response, Infallible> {
    if rejection.is_not_found() {
        return Ok(reply::with_status("Not Found", StatusCode::NOT_FOUND).into_response());
    }
    if rejection
        .find::<warp::reject::MethodNotAllowed>()
        .is_some()
    {
        let mut response =
            reply::with_status("Method Not Allowed", StatusCode::METHOD_NOT_ALLOWED)
                .into_response();
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static("POST"));
        return Ok(response);
    }
    Ok(reply::with_status("Bad Request", StatusCode::BAD_REQUEST).into_response())
}

/// Serve the webhook over TLS until ctrl-c.
pub fn webhook_task(
    recorder: Arc<dyn MutationRecorder>,
    tls_cert: &Path,
    tls_key: &Path,
    port: u16,
) -> impl Future<Output = ()> + 'static {
    info!("Starting webhook server on port {}", port);
    let (_addr, fut) = warp::serve(routes(recorder))
        .tls()
        .cert_path(tls_cert)
        .key_path(tls_key)
        .bind_with_graceful_shutdown(([0, 0, 0, 0], port), async move {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install CTRL+C signal handler");
        });
    fut
}
