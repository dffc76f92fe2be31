//! User entity owned by the persistence layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role assigned to every newly provisioned user
pub const DEFAULT_ROLE: &str = "default";

/// Role allowed to read other users' profiles
pub const ADMIN_ROLE: &str = "admin";

/// A registered user, identified by a unique mobile number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Database-generated identifier
    pub id: i64,

    /// Mobile number, unique across users
    pub mobile_number: String,

    /// Disabled users cannot log in
    pub enabled: bool,

    /// When the user was first provisioned
    pub registered_at: DateTime<Utc>,

    /// Names of the roles linked to the user
    pub roles: Vec<String>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_checks() {
        let user = User {
            id: 1,
            mobile_number: "09111112222".to_string(),
            enabled: true,
            registered_at: Utc::now(),
            roles: vec![DEFAULT_ROLE.to_string()],
        };
        assert!(user.has_role(DEFAULT_ROLE));
        assert!(!user.is_admin());
    }
}
