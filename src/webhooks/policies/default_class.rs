//! Default class uniqueness policy.
//!
//! At most one class per CSI driver may carry the is-default annotation.
//! The check runs against the lister's point-in-time view; two concurrent
//! default claims for the same driver can both pass. Existing state that
//! already violates the rule is not audited, only new claims are rejected.

use super::{REASON_DEFAULT_CONFLICT, REASON_LIST_FAILED, ValidationContext, ValidationResult};
use crate::crd::DefaultClass;
use crate::lister::ClassLister;

/// Validate that a default claim does not collide with another default class
pub fn validate<K: DefaultClass>(
    ctx: &ValidationContext<'_, K>,
    lister: &dyn ClassLister<K>,
) -> ValidationResult {
    let new = ctx.resource;

    if !new.is_default() {
        return ValidationResult::allowed();
    }

    // Already default for the same driver: this write cannot introduce a conflict.
    if let Some(old) = ctx.old_resource {
        if old.is_default() && old.driver() == new.driver() {
            return ValidationResult::allowed();
        }
    }

    let mut existing = match lister.list() {
        Ok(classes) => classes,
        Err(e) => return ValidationResult::denied(REASON_LIST_FAILED, &e.to_string()),
    };
    existing.sort_by(|a, b| a.name().cmp(b.name()));

    let conflict = existing
        .iter()
        .filter(|class| class.is_default())
        .find(|class| class.driver() == new.driver());

    if let Some(class) = conflict {
        return ValidationResult::denied(
            REASON_DEFAULT_CONFLICT,
            &format!(
                "default {}: {} already exists for driver: {}",
                K::KIND_LABEL,
                class.name(),
                new.driver()
            ),
        );
    }

    ValidationResult::allowed()
}
