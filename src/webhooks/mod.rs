//! Webhook module for validating snapshot class admission requests.
//!
//! Both VolumeSnapshotClass and VolumeGroupSnapshotClass writes are checked
//! by the same default-class uniqueness policy.

pub mod policies;
mod server;

pub use policies::{ValidationContext, ValidationResult, validate_all};
pub use server::{
    REASON_INVALID_REQUEST, REASON_UNEXPECTED_RESOURCE, WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH,
    WEBHOOK_PORT, WebhookState, create_webhook_router, into_response, review_request,
    run_webhook_server,
};

// Re-export kube-rs admission types for contract testing
pub use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
