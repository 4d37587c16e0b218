//! Ownership guard for post access.

use uuid::Uuid;

use crate::domain::{Post, Principal};
use crate::error::DomainError;

/// Message returned when a principal touches a post it does not own.
pub const NOT_OWNER_MESSAGE: &str =
    "You are not authorized to access this resource. You can only manage your own posts.";

/// Outcome of an ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied,
}

impl Access {
    /// Compare a principal's id with an owner reference.
    pub fn check(principal_id: Uuid, owner_id: Uuid) -> Self {
        if principal_id == owner_id {
            Access::Allowed
        } else {
            Access::Denied
        }
    }

    /// Turn a denial into [`DomainError::Forbidden`].
    pub fn into_result(self) -> Result<(), DomainError> {
        match self {
            Access::Allowed => Ok(()),
            Access::Denied => Err(DomainError::Forbidden(NOT_OWNER_MESSAGE)),
        }
    }
}

/// Ensure `principal` owns `post`.
pub fn ensure_owner(principal: &Principal, post: &Post) -> Result<(), DomainError> {
    Access::check(principal.user_id, post.user_id).into_result()
}
