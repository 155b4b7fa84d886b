//! Central identity and session management for the dashboard.
//! Keep the public surface thin and split implementation across sub-modules.

mod permissions;
mod principal;
mod session;
mod provider;

pub use permissions::{PermissionSet, GLOBAL_CODE};
pub use principal::Principal;
pub use session::{Session, SessionToken, SessionManager};
pub use provider::{SqlAuthProvider, LoginRequest, LoginResponse};
