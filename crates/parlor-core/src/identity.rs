use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use parlor_db::Database;
use parlor_types::models::User;

use crate::error::{CoreError, CoreResult};

/// Create a user with an Argon2id-hashed password. Returns only the
/// non-secret fields.
pub fn register(db: &Database, username: &str, password: &str) -> CoreResult<User> {
    if username.is_empty() || password.is_empty() {
        return Err(CoreError::InvalidInput(
            "username and password are required".into(),
        ));
    }

    if db.get_user_by_username(username)?.is_some() {
        return Err(CoreError::DuplicateUsername(username.to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CoreError::Storage(anyhow::anyhow!("password hashing failed: {}", e)))?
        .to_string();

    let created_at = parlor_db::now();
    let id = db.create_user(username, &password_hash, &parlor_db::encode_timestamp(created_at))?;

    Ok(User {
        id,
        username: username.to_string(),
        created_at,
    })
}

/// Uniformly false for an unknown username or a wrong password, so the
/// caller cannot distinguish the two.
pub fn authenticate(db: &Database, username: &str, password: &str) -> CoreResult<bool> {
    let Some(user) = db.get_user_by_username(username)? else {
        return Ok(false);
    };

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| CoreError::Storage(anyhow::anyhow!("stored hash unparseable: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Non-secret lookup, used by the gateway to mint tokens after a
/// successful authenticate.
pub fn get_user(db: &Database, username: &str) -> CoreResult<Option<User>> {
    let row = db.get_user_by_username(username)?;
    Ok(row.map(|row| User {
        id: row.id,
        username: row.username,
        created_at: parlor_db::decode_timestamp(&row.created_at),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[test]
    fn register_stores_hash_not_plaintext() {
        let db = testutil::db();

        let user = register(&db, "alice", "correct horse").unwrap();
        assert_eq!(user.username, "alice");

        let row = db.get_user_by_username("alice").unwrap().unwrap();
        assert_ne!(row.password, "correct horse");
        assert!(row.password.starts_with("$argon2"));
    }

    #[test]
    fn duplicate_registration_rejected_once_registered() {
        let db = testutil::db();

        register(&db, "alice", "correct horse").unwrap();
        let err = register(&db, "alice", "other password").unwrap_err();
        assert!(matches!(err, CoreError::DuplicateUsername(ref u) if u == "alice"));

        // exactly one row for the username, with the original hash
        let count: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM users WHERE username = 'alice'",
                    [],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(count, 1);
        assert!(authenticate(&db, "alice", "correct horse").unwrap());
        assert!(!authenticate(&db, "alice", "other password").unwrap());
    }

    #[test]
    fn authenticate_is_uniformly_false() {
        let db = testutil::db();
        register(&db, "alice", "correct horse").unwrap();

        // unknown user and wrong password are indistinguishable
        assert!(!authenticate(&db, "nobody", "whatever").unwrap());
        assert!(!authenticate(&db, "alice", "wrong").unwrap());
        assert!(authenticate(&db, "alice", "correct horse").unwrap());
    }

    #[test]
    fn empty_credentials_rejected() {
        let db = testutil::db();
        assert!(matches!(
            register(&db, "", "pw").unwrap_err(),
            CoreError::InvalidInput(_)
        ));
        assert!(matches!(
            register(&db, "alice", "").unwrap_err(),
            CoreError::InvalidInput(_)
        ));
    }
}
