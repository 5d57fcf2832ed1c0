//! Single-owner authorization for mutable records

use crate::{auth::jwt::Identity, error::AppError};

/// A record whose mutations are restricted to one account.
///
/// `owner_email` is fixed at creation from the creator's identity.
pub trait OwnedResource {
    /// Resource kind, used only in logs
    const KIND: &'static str;

    fn owner_email(&self) -> &str;
}

/// Outcome of an ownership check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

pub struct OwnershipGuard;

impl OwnershipGuard {
    pub fn authorize<R: OwnedResource>(identity: &Identity, resource: &R) -> Access {
        if resource.owner_email() == identity.email {
            Access::Allow
        } else {
            Access::Deny
        }
    }

    /// Like `authorize`, but a denial is reported as "not found"
    pub fn require<R: OwnedResource>(identity: &Identity, resource: &R) -> Result<(), AppError> {
        match Self::authorize(identity, resource) {
            Access::Allow => Ok(()),
            Access::Deny => {
                tracing::warn!(
                    kind = R::KIND,
                    caller = %identity.email,
                    "Ownership check denied"
                );
                Err(AppError::NotFound(R::KIND))
            }
        }
    }
}
