//! Admission webhook server.
//!
//! Provides HTTP endpoints for the ValidatingWebhookConfiguration:
//! - `POST /validate-volumesnapshotclass`
//! - `POST /validate-volumegroupsnapshotclass`
//!
//! The API server requires TLS; the certificate and key are mounted into the
//! pod (typically from a cert-manager secret) at `/etc/webhook/certs/`.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use kube::core::DynamicObject;
use serde_json::Value;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
use tracing::{debug, error, info, warn};

use crate::crd::{DefaultClass, VolumeGroupSnapshotClass, VolumeSnapshotClass};
use crate::error::{Error, Result};
use crate::health::HealthState;
use crate::lister::ClassLister;
use crate::webhooks::policies::{ValidationContext, ValidationResult, validate_all};

/// Default path to webhook TLS certificate
pub const WEBHOOK_CERT_PATH: &str = "/etc/webhook/certs/tls.crt";
/// Default path to webhook TLS private key
pub const WEBHOOK_KEY_PATH: &str = "/etc/webhook/certs/tls.key";
/// Default webhook server port
pub const WEBHOOK_PORT: u16 = 9443;

/// Denial reason for requests routed to the wrong endpoint
pub const REASON_UNEXPECTED_RESOURCE: &str = "UnexpectedResource";
/// Denial reason for malformed requests
pub const REASON_INVALID_REQUEST: &str = "InvalidRequest";

/// Shared state for webhook handlers
pub struct WebhookState {
    /// Committed VolumeSnapshotClasses
    pub snapshot_classes: Arc<dyn ClassLister<VolumeSnapshotClass>>,
    /// Committed VolumeGroupSnapshotClasses
    pub group_snapshot_classes: Arc<dyn ClassLister<VolumeGroupSnapshotClass>>,
    /// Optional health state for admission metrics
    pub health_state: Option<Arc<HealthState>>,
}

impl WebhookState {
    pub fn new(
        snapshot_classes: Arc<dyn ClassLister<VolumeSnapshotClass>>,
        group_snapshot_classes: Arc<dyn ClassLister<VolumeGroupSnapshotClass>>,
        health_state: Option<Arc<HealthState>>,
    ) -> Self {
        Self {
            snapshot_classes,
            group_snapshot_classes,
            health_state,
        }
    }
}

/// Create the webhook router
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(
            "/validate-volumesnapshotclass",
            post(validate_volume_snapshot_class),
        )
        .route(
            "/validate-volumegroupsnapshotclass",
            post(validate_volume_group_snapshot_class),
        )
        .with_state(state)
}

async fn validate_volume_snapshot_class(
    State(state): State<Arc<WebhookState>>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    handle_review(&state, state.snapshot_classes.as_ref(), payload)
}

async fn validate_volume_group_snapshot_class(
    State(state): State<Arc<WebhookState>>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    handle_review(&state, state.group_snapshot_classes.as_ref(), payload)
}

type ReviewReply = (StatusCode, Json<AdmissionReview<DynamicObject>>);

fn bad_request(message: String) -> ReviewReply {
    (
        StatusCode::BAD_REQUEST,
        Json(AdmissionResponse::invalid(message).into_review()),
    )
}

/// Decode the review, decide, and encode the response
///
/// A body that is not JSON, or a review without a request, gets a 400. A
/// request whose object does not decode is answered with a denial for its
/// uid so the API server reports the decode error to the client.
fn handle_review<K: DefaultClass + Clone + serde::de::DeserializeOwned>(
    state: &WebhookState,
    lister: &dyn ClassLister<K>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> ReviewReply {
    let Json(value) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            error!(error = %rejection, "Failed to read admission review body");
            return bad_request(format!("Invalid AdmissionReview: {}", rejection));
        }
    };

    let uid = value
        .pointer("/request/uid")
        .and_then(Value::as_str)
        .map(str::to_string);
    let operation = value
        .pointer("/request/operation")
        .and_then(Value::as_str)
        .unwrap_or("UNKNOWN")
        .to_string();

    let review: AdmissionReview<K> = match serde_json::from_value(value) {
        Ok(review) => review,
        Err(e) => {
            let message = format!("Invalid {} object: {}", K::KIND_LABEL, e);
            let Some(uid) = uid else {
                error!(error = %e, "Failed to decode admission review");
                return bad_request(message);
            };
            warn!(uid = %uid, error = %e, "Admission request denied (undecodable object)");
            if let Some(health) = &state.health_state {
                health
                    .metrics
                    .record_admission(K::PLURAL, &operation, false, 0.0);
                health.metrics.record_denial(K::PLURAL, REASON_INVALID_REQUEST);
            }
            let mut response = AdmissionResponse::invalid(message);
            response.uid = uid;
            return (StatusCode::OK, Json(response.into_review()));
        }
    };

    let request: AdmissionRequest<K> = match review.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Failed to extract admission request");
            return bad_request(format!("Invalid AdmissionReview: {}", e));
        }
    };

    let uid = &request.uid;
    debug!(
        uid = %uid,
        operation = ?request.operation,
        name = ?request.name,
        resource = K::PLURAL,
        "Processing admission request"
    );

    let started = Instant::now();
    let result = review_request(&request, lister);
    let operation = operation_label(&request.operation);

    if let Some(health) = &state.health_state {
        health.metrics.record_admission(
            K::PLURAL,
            &operation,
            result.allowed,
            started.elapsed().as_secs_f64(),
        );
        if let Some(reason) = &result.reason {
            health.metrics.record_denial(K::PLURAL, reason);
        }
    }

    (StatusCode::OK, Json(into_response(&request, &result).into_review()))
}

/// Decide an already-decoded admission request.
///
/// Non-write operations are admitted without inspecting the object. Writes
/// must target the resource kind this handler serves and carry an object.
pub fn review_request<K: DefaultClass + Clone>(
    request: &AdmissionRequest<K>,
    lister: &dyn ClassLister<K>,
) -> ValidationResult {
    let uid = &request.uid;

    if !matches!(request.operation, Operation::Create | Operation::Update) {
        info!(uid = %uid, operation = ?request.operation, "Admission request allowed (not a write)");
        return ValidationResult::allowed();
    }

    let expected = gvr_string(
        &<K as kube::Resource>::group(&()),
        &<K as kube::Resource>::version(&()),
        K::PLURAL,
    );
    let found = gvr_string(
        &request.resource.group,
        &request.resource.version,
        &request.resource.resource,
    );
    if expected != found {
        let message = format!(
            "expect resource to be {}, but found {}",
            expected, found
        );
        error!(uid = %uid, %message, "Unexpected resource in admission request");
        return ValidationResult::denied(REASON_UNEXPECTED_RESOURCE, &message);
    }

    let resource = match &request.object {
        Some(obj) => obj,
        None => {
            error!(uid = %uid, "Missing object in request");
            return ValidationResult::denied(REASON_INVALID_REQUEST, "Missing object in request");
        }
    };

    let ctx = ValidationContext {
        operation: request.operation.clone(),
        resource,
        old_resource: request.old_object.as_ref(),
    };

    let result = validate_all(&ctx, lister);
    if result.allowed {
        info!(uid = %uid, name = %resource.name(), "Admission request allowed");
    } else {
        warn!(
            uid = %uid,
            name = %resource.name(),
            driver = %resource.driver(),
            reason = ?result.reason,
            message = %result.message(),
            "Admission request denied"
        );
    }
    result
}

/// Translate a validation result into the admission response for `request`
pub fn into_response<K: DefaultClass>(
    request: &AdmissionRequest<K>,
    result: &ValidationResult,
) -> AdmissionResponse {
    let response = AdmissionResponse::from(request);
    if result.allowed {
        response
    } else {
        response.deny(result.message())
    }
}

fn gvr_string(group: &str, version: &str, resource: &str) -> String {
    format!("{}/{}, Resource={}", group, version, resource)
}

fn operation_label(operation: &Operation) -> String {
    format!("{:?}", operation).to_uppercase()
}

/// Run the webhook server with TLS
///
/// Binds to 0.0.0.0:`port` and serves both validation endpoints.
///
/// # Arguments
/// * `state` - Listers and metrics shared by the handlers
/// * `port` - Listen port
/// * `cert_path` - Path to TLS certificate file (PEM format)
/// * `key_path` - Path to TLS private key file (PEM format)
pub async fn run_webhook_server(
    state: Arc<WebhookState>,
    port: u16,
    cert_path: &str,
    key_path: &str,
) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let app = create_webhook_router(state);

    let config = RustlsConfig::from_pem_file(PathBuf::from(cert_path), PathBuf::from(key_path))
        .await
        .map_err(|e| Error::TlsConfig(e.to_string()))?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "Webhook server listening with TLS");

    axum_server::bind_rustls(addr, config)
        .serve(app.into_make_service())
        .await
        .map_err(|e| Error::Server(e.to_string()))?;

    Ok(())
}
