use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims of tokens minted by the identity service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,
    pub token_type: TokenType,
    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
    /// Scopes every query the caller makes.
    pub tenant_id: String,
}

/// Verifies signature and expiry and accepts access tokens only.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())?;

    if claims.token_type != TokenType::Access {
        return Err("refresh tokens cannot call the API".to_string());
    }
    if claims.tenant_id.trim().is_empty() {
        return Err("token carries no tenant".to_string());
    }
    Ok(claims)
}

#[cfg(test)]
pub(crate) mod testing {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use std::time::{SystemTime, UNIX_EPOCH};
    use uuid::Uuid;

    use super::{Claims, TokenType};

    pub const SECRET: &str = "test-secret";

    pub fn claims(role: u8, employee_id: Option<u64>, tenant: &str) -> Claims {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as usize;
        Claims {
            user_id: 1,
            sub: "jdoe".into(),
            role,
            exp: now + 900,
            jti: Uuid::new_v4().to_string(),
            token_type: TokenType::Access,
            employee_id,
            tenant_id: tenant.into(),
        }
    }

    pub fn sign(claims: &Claims) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{SECRET, claims, sign};
    use super::*;

    #[test]
    fn access_token_round_trips() {
        let token = sign(&claims(3, Some(1000), "acme"));
        let verified = verify_token(&token, SECRET).unwrap();
        assert_eq!(verified.employee_id, Some(1000));
        assert_eq!(verified.tenant_id, "acme");
    }

    #[test]
    fn refresh_and_foreign_tokens_are_refused() {
        let mut refresh = claims(3, Some(1000), "acme");
        refresh.token_type = TokenType::Refresh;
        assert!(verify_token(&sign(&refresh), SECRET).is_err());

        let token = sign(&claims(3, Some(1000), "acme"));
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn token_without_tenant_is_refused() {
        assert!(verify_token(&sign(&claims(1, None, "")), SECRET).is_err());
    }
}
