//! Validation policies for snapshot class admission.
//!
//! Only writes are gated: CREATE and UPDATE run the policies, every other
//! operation is admitted as-is.

pub mod default_class;

use kube::core::admission::Operation;

use crate::crd::DefaultClass;
use crate::lister::ClassLister;

/// Denial reason when another default class exists for the same driver
pub const REASON_DEFAULT_CONFLICT: &str = "DefaultClassConflict";
/// Denial reason when the existing classes could not be enumerated
pub const REASON_LIST_FAILED: &str = "ListFailed";

/// Result of a validation check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the validation passed
    pub allowed: bool,
    /// Reason for denial (if not allowed)
    pub reason: Option<String>,
    /// Detailed message (if not allowed)
    pub message: Option<String>,
}

impl ValidationResult {
    /// Create an allowed result
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
            message: None,
        }
    }

    /// Create a denied result
    pub fn denied(reason: &str, message: &str) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.to_string()),
            message: Some(message.to_string()),
        }
    }

    /// Message shown to the requester, empty when allowed
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }
}

/// Context for validation
pub struct ValidationContext<'a, K> {
    /// Admission operation being performed
    pub operation: Operation,
    /// The resource being written
    pub resource: &'a K,
    /// The previously committed resource (UPDATE only)
    pub old_resource: Option<&'a K>,
}

impl<K> ValidationContext<'_, K> {
    /// Whether this operation writes the object
    pub fn is_write(&self) -> bool {
        matches!(self.operation, Operation::Create | Operation::Update)
    }
}

/// Run all validation policies
pub fn validate_all<K: DefaultClass>(
    ctx: &ValidationContext<'_, K>,
    lister: &dyn ClassLister<K>,
) -> ValidationResult {
    if !ctx.is_write() {
        return ValidationResult::allowed();
    }

    let result = default_class::validate(ctx, lister);
    if !result.allowed {
        return result;
    }

    ValidationResult::allowed()
}
