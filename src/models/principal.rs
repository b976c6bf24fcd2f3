use serde::{Deserialize, Serialize};

use super::enums::Role;

/// Authenticated caller identity, resolved once at the transport edge
/// and passed explicitly into every lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: i64,
    pub role: Role,
}

impl Principal {
    pub fn patient(user_id: i64) -> Self {
        Self { user_id, role: Role::Patient }
    }

    pub fn doctor(user_id: i64) -> Self {
        Self { user_id, role: Role::Doctor }
    }

    pub fn admin(user_id: i64) -> Self {
        Self { user_id, role: Role::Admin }
    }
}
