use serde::{Deserialize, Serialize};

use super::permissions::PermissionSet;

/// Authenticated staff identity attached to a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub permissions: PermissionSet,
}
