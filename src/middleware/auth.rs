use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Authenticated caller, attached to request extensions by [`require_auth`].
/// Handlers trust it unconditionally and scope every query to it.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

pub async fn require_auth(
    State(config): State<Config>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Access denied: no token provided".to_string()))?;

    let user_id = verify_token(token, &config.auth_token_secret)?;
    req.extensions_mut().insert(AuthUser(user_id));

    Ok(next.run(req).await)
}

/// Tokens are `<user-uuid>.<hex hmac-sha256 over the uuid>`. Issuance lives
/// with the identity service; this end only verifies.
pub fn verify_token(token: &str, secret: &str) -> Result<Uuid, AppError> {
    let (user_part, signature_part) = token
        .split_once('.')
        .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))?;

    let user_id = Uuid::parse_str(user_part)
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

    let signature = hex::decode(signature_part)
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

    let mut mac = mac_for(secret)?;
    mac.update(user_part.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

    Ok(user_id)
}

/// Mints a token for the given user. Used by operational tooling and tests;
/// the service itself never calls this on a request path.
pub fn sign_token(user_id: Uuid, secret: &str) -> Result<String, AppError> {
    let user_part = user_id.to_string();
    let mut mac = mac_for(secret)?;
    mac.update(user_part.as_bytes());

    Ok(format!(
        "{}.{}",
        user_part,
        hex::encode(mac.finalize().into_bytes())
    ))
}

fn mac_for(secret: &str) -> Result<HmacSha256, AppError> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("auth secret unusable: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key";

    #[test]
    fn signed_token_verifies() {
        let user_id = Uuid::new_v4();
        let token = sign_token(user_id, SECRET).unwrap();

        assert_eq!(verify_token(&token, SECRET).unwrap(), user_id);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_token(Uuid::new_v4(), SECRET).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn tampered_user_id_is_rejected() {
        let token = sign_token(Uuid::new_v4(), SECRET).unwrap();
        let signature = token.split_once('.').unwrap().1;
        let forged = format!("{}.{}", Uuid::new_v4(), signature);

        assert!(verify_token(&forged, SECRET).is_err());
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(verify_token("not-a-token", SECRET).is_err());
        assert!(verify_token("not-a-uuid.abcdef", SECRET).is_err());
        assert!(verify_token(&format!("{}.zzzz", Uuid::new_v4()), SECRET).is_err());
    }
}
