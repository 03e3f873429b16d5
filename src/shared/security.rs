use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use crate::shared::errors::{AppError, ErrorType};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User UUID.
    pub sub: String,
    /// Personal access token id.
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn generate_jwt(
    user_uuid: &str,
    token_id: &str,
    secret: &str,
    issued_at: i64,
    expires_in: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = issued_at.max(0) as u64;
    let claims = Claims {
        sub: user_uuid.to_string(),
        jti: token_id.to_string(),
        iat: iat as usize,
        exp: (iat + expires_in) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

pub fn decode_jwt(authorization: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token = authorization.trim_start_matches("Bearer ").trim();

    let decoding_key = DecodingKey::from_secret(secret.as_ref());
    let decoded = decode::<Claims>(token, &decoding_key, &Validation::default())?;

    Ok(decoded.claims)
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            AppError::new(
                &format!("Internal Error: {:#?}", err),
                ErrorType::Internal,
            )
        })
}

/// False for a wrong password and for an unparsable stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(hash) => Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok(),
        Err(err) => {
            log::error!("Stored password hash is invalid: {}", err);
            false
        }
    }
}

pub fn generate_secret(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwt_round_trips_claims() {
        let now = chrono::Utc::now().timestamp();
        let token = generate_jwt("user-uuid", "token-1", "secret", now, 3600).unwrap();
        let claims = decode_jwt(&format!("Bearer {}", token), "secret").unwrap();
        assert_eq!(claims.sub, "user-uuid");
        assert_eq!(claims.jti, "token-1");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn jwt_rejects_wrong_secret_and_expiry() {
        let now = chrono::Utc::now().timestamp();
        let token = generate_jwt("u", "t", "secret", now, 3600).unwrap();
        assert!(decode_jwt(&token, "other").is_err());

        let stale = generate_jwt("u", "t", "secret", now - 7200, 60).unwrap();
        assert!(decode_jwt(&stale, "secret").is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("password123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("password123", &hash));
        assert!(!verify_password("password124", &hash));
        assert!(!verify_password("password123", "not-a-hash"));
    }
}
