//! User store bootstrap and password hashing.
//!
//! Passwords are stored as Argon2 PHC strings. The legacy dashboard compared
//! plaintext passwords in SQL; rows with a non-PHC value in `contrasena` fail
//! verification and have to be re-provisioned.

use anyhow::{anyhow, Result};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use sqlx::MySqlPool;
use tracing::info;

pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2.hash_password(password.as_bytes(), &salt).map_err(|e| anyhow!(e.to_string()))?.to_string();
    Ok(phc)
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    } else { false }
}

/// Idempotent bootstrap: create the user table if missing and seed the
/// default administrator when no admin row exists. Failures here are logged
/// by the caller and never halt startup.
pub async fn init_users_table(pool: &MySqlPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS plataforma_usuarios (\
            id INT AUTO_INCREMENT PRIMARY KEY,\
            usuario VARCHAR(100) UNIQUE NOT NULL,\
            contrasena VARCHAR(255) NOT NULL,\
            permisos VARCHAR(50) NOT NULL DEFAULT '0',\
            nombre VARCHAR(200),\
            rol VARCHAR(100),\
            activo TINYINT(1) DEFAULT 1,\
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP\
        )",
    )
    .execute(pool)
    .await?;

    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM plataforma_usuarios WHERE usuario = 'admin'")
            .fetch_one(pool)
            .await?;
    if count == 0 {
        let phc = hash_password("admin")?;
        sqlx::query(
            "INSERT INTO plataforma_usuarios (usuario, contrasena, permisos, nombre, rol) \
             VALUES ('admin', ?, '0', 'Administrador', 'Dirección')",
        )
        .bind(phc)
        .execute(pool)
        .await?;
        info!("seeded default admin user; change its password before exposing the service");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let phc = hash_password("s3cr3t!").expect("hash");
        assert!(phc.starts_with("$argon2"));
        assert!(verify_password(&phc, "s3cr3t!"));
        assert!(!verify_password(&phc, "wrong"));
    }

    #[test]
    fn legacy_plaintext_rows_never_verify() {
        // Rows migrated from the plaintext era hold the raw password
        assert!(!verify_password("admin", "admin"));
        assert!(!verify_password("", ""));
    }
}
