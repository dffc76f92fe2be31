//! User repository trait defining the interface for user persistence.
//!
//! The core checks existence, fetches, lists, and provisions users. Creation
//! must be a single transaction covering the user row and its default role
//! link, guarded by a unique constraint on the mobile number.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::user::User;
use crate::domain::value_objects::{UserPage, UserQuery};
use crate::errors::DomainResult;

/// Repository trait for User persistence operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Check whether a user with this mobile number exists
    async fn exists_by_mobile(&self, mobile_number: &str) -> DomainResult<bool>;

    /// Find a user by mobile number, roles included
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with this mobile number
    /// * `Err(DomainError)` - Database or other error occurred
    async fn find_by_mobile(&self, mobile_number: &str) -> DomainResult<Option<User>>;

    /// One page of users ordered by id, roles included, plus the number of
    /// users matching the query's mobile prefix
    async fn list_users(&self, query: &UserQuery) -> DomainResult<UserPage>;

    /// Create a user and link it to the default role, atomically
    ///
    /// # Returns
    /// * `Ok(User)` - The created user with its generated id and roles
    /// * `Err(AuthError::UserAlreadyExists)` - Another request created the user first
    /// * `Err(AuthError::IdentityProvisioningFailure)` - Nothing was written
    /// * `Err(InfraError::Database)` - The database could not be reached
    async fn create_with_default_role(
        &self,
        mobile_number: &str,
        registered_at: DateTime<Utc>,
    ) -> DomainResult<User>;
}
