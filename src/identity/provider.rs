use sqlx::MySqlPool;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::security;

use super::permissions::PermissionSet;
use super::principal::Principal;
use super::session::{Session, SessionManager};

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub session: Session,
}

#[derive(sqlx::FromRow)]
struct UserAuthRow {
    username: String,
    password_hash: String,
    permissions: String,
    display_name: Option<String>,
    role: Option<String>,
}

/// SQL-backed login against `plataforma_usuarios`. The same error is returned
/// for an unknown user, an inactive user and a wrong password so the response
/// never reveals which field was wrong.
pub struct SqlAuthProvider {
    pool: MySqlPool,
    pub sm: SessionManager,
}

impl SqlAuthProvider {
    pub fn new(pool: MySqlPool, sm: SessionManager) -> Self { Self { pool, sm } }

    pub async fn login(&self, req: &LoginRequest) -> AppResult<LoginResponse> {
        if req.username.trim().is_empty() || req.password.is_empty() {
            return Err(AppError::user("missing_credentials", "Introduce usuario y contraseña"));
        }
        let row: Option<UserAuthRow> = sqlx::query_as(
            "SELECT usuario AS username, contrasena AS password_hash, \
                    permisos AS permissions, nombre AS display_name, rol AS role \
             FROM plataforma_usuarios WHERE usuario = ? AND activo = 1",
        )
        .bind(req.username.trim())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(invalid_credentials());
        };
        if !security::verify_password(&row.password_hash, &req.password) {
            return Err(invalid_credentials());
        }

        let session = self.sm.issue(principal_from_row(row));
        info!(user = %session.principal.username, sid = %session.session_id, "auth.login");
        Ok(LoginResponse { session })
    }
}

fn invalid_credentials() -> AppError {
    AppError::auth("invalid_credentials", "Credenciales incorrectas")
}

/// Stored row -> session identity; the `permisos` string becomes the parsed
/// permission set and nullable profile columns default to empty.
fn principal_from_row(row: UserAuthRow) -> Principal {
    Principal {
        username: row.username,
        display_name: row.display_name.unwrap_or_default(),
        role: row.role.unwrap_or_default(),
        permissions: PermissionSet::parse(&row.permissions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::Section;

    #[test]
    fn stored_permission_codes_land_in_the_principal() {
        let principal = principal_from_row(UserAuthRow {
            username: "ticketing".to_string(),
            password_hash: "$argon2id$ignored".to_string(),
            permissions: "1,4".to_string(),
            display_name: Some("Área Ticketing".to_string()),
            role: Some("Analista".to_string()),
        });
        assert_eq!(principal.username, "ticketing");
        assert_eq!(principal.display_name, "Área Ticketing");
        assert!(principal.permissions.allows(Section::Stadium));
        assert!(principal.permissions.allows(Section::Hospitality));
        assert!(!principal.permissions.allows(Section::Museum));
    }

    #[test]
    fn null_profile_columns_default_to_empty() {
        let principal = principal_from_row(UserAuthRow {
            username: "admin".to_string(),
            password_hash: String::new(),
            permissions: "0".to_string(),
            display_name: None,
            role: None,
        });
        assert!(principal.display_name.is_empty());
        assert!(principal.role.is_empty());
        assert!(principal.permissions.is_global());
    }
}
