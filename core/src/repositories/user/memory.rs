//! In-memory implementation of UserRepository
//!
//! Backs tests and in-memory runs. The map is keyed by mobile number, which
//! plays the part of the unique index.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::domain::entities::user::{User, ADMIN_ROLE, DEFAULT_ROLE};
use crate::domain::value_objects::{UserPage, UserQuery};
use crate::errors::{AuthError, DomainResult};

use super::trait_::UserRepository;

struct State {
    users: HashMap<String, User>,
    roles: Vec<String>,
    next_id: i64,
}

pub struct InMemoryUserRepository {
    state: Mutex<State>,
    fail_role_assignment: AtomicBool,
}

impl InMemoryUserRepository {
    /// Create a repository with the `admin` and `default` roles seeded
    pub fn new() -> Self {
        Self::with_roles(&[ADMIN_ROLE, DEFAULT_ROLE])
    }

    pub fn with_roles(roles: &[&str]) -> Self {
        Self {
            state: Mutex::new(State {
                users: HashMap::new(),
                roles: roles.iter().map(|r| r.to_string()).collect(),
                next_id: 1,
            }),
            fail_role_assignment: AtomicBool::new(false),
        }
    }

    /// Insert a user as-is, assigning the next id
    pub async fn insert(&self, mut user: User) -> User {
        let mut state = self.state.lock().await;
        user.id = state.next_id;
        state.next_id += 1;
        state.users.insert(user.mobile_number.clone(), user.clone());
        user
    }

    /// Make the role-link step of the next creations fail
    pub fn fail_role_assignment(&self, fail: bool) {
        self.fail_role_assignment.store(fail, Ordering::SeqCst);
    }

    pub async fn count(&self) -> usize {
        self.state.lock().await.users.len()
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn exists_by_mobile(&self, mobile_number: &str) -> DomainResult<bool> {
        Ok(self.state.lock().await.users.contains_key(mobile_number))
    }

    async fn find_by_mobile(&self, mobile_number: &str) -> DomainResult<Option<User>> {
        Ok(self.state.lock().await.users.get(mobile_number).cloned())
    }

    async fn list_users(&self, query: &UserQuery) -> DomainResult<UserPage> {
        let state = self.state.lock().await;
        let mut matching: Vec<&User> = state
            .users
            .values()
            .filter(|user| query.matches(&user.mobile_number))
            .collect();
        matching.sort_by_key(|user| user.id);

        let total = matching.len() as u64;
        let users = matching
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(query.limit() as usize)
            .cloned()
            .collect();
        Ok(UserPage::new(users, total, query))
    }

    async fn create_with_default_role(
        &self,
        mobile_number: &str,
        registered_at: DateTime<Utc>,
    ) -> DomainResult<User> {
        let mut state = self.state.lock().await;

        if state.users.contains_key(mobile_number) {
            return Err(AuthError::UserAlreadyExists.into());
        }
        if !state.roles.iter().any(|r| r == DEFAULT_ROLE) {
            return Err(AuthError::IdentityProvisioningFailure {
                reason: format!("role '{}' is missing", DEFAULT_ROLE),
            }
            .into());
        }
        // Nothing has been stored yet, so failing here leaves no orphan user
        if self.fail_role_assignment.load(Ordering::SeqCst) {
            return Err(AuthError::IdentityProvisioningFailure {
                reason: "role assignment failed".to_string(),
            }
            .into());
        }

        let user = User {
            id: state.next_id,
            mobile_number: mobile_number.to_string(),
            enabled: true,
            registered_at,
            roles: vec![DEFAULT_ROLE.to_string()],
        };
        state.next_id += 1;
        state.users.insert(user.mobile_number.clone(), user.clone());
        Ok(user)
    }
}
