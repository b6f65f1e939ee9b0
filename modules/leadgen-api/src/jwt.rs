use anyhow::Result;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Audience Supabase stamps on tokens of signed-in users.
const AUDIENCE: &str = "authenticated";

/// Claims of a Supabase access token. `sub` is the user id.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub exp: u64,
}

/// Verifies HS256 access tokens signed with the project's JWT secret.
#[derive(Clone)]
pub struct JwtService {
    decoding_key: DecodingKey,
    validation: Validation,
    #[cfg(test)]
    encoding_key: jsonwebtoken::EncodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUDIENCE]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            #[cfg(test)]
            encoding_key: jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Verify and decode a token. Fails on bad signature, audience or expiry.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }

    #[cfg(test)]
    pub fn create_token(&self, sub: &str, ttl_secs: i64, audience: &str) -> Result<String> {
        let exp = jsonwebtoken::get_current_timestamp() as i64 + ttl_secs;
        let claims = Claims {
            sub: sub.to_string(),
            aud: audience.to_string(),
            exp: exp.max(0) as u64,
        };
        jsonwebtoken::encode(&jsonwebtoken::Header::default(), &claims, &self.encoding_key)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::new("test-secret-key")
    }

    #[test]
    fn roundtrip_token() {
        let svc = test_service();
        let token = svc.create_token("user-1", 3600, AUDIENCE).unwrap();
        let claims = svc.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.aud, AUDIENCE);
    }

    #[test]
    fn rejects_invalid_token() {
        assert!(test_service().verify_token("garbage").is_err());
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = JwtService::new("secret-a")
            .create_token("user-1", 3600, AUDIENCE)
            .unwrap();
        assert!(JwtService::new("secret-b").verify_token(&token).is_err());
    }

    #[test]
    fn rejects_wrong_audience() {
        let svc = test_service();
        let token = svc.create_token("user-1", 3600, "anon").unwrap();
        assert!(svc.verify_token(&token).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let svc = test_service();
        let token = svc.create_token("user-1", -3600, AUDIENCE).unwrap();
        assert!(svc.verify_token(&token).is_err());
    }
}
