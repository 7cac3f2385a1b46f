use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{config::JwtConfig, state::AppState};

/// Session-token payload. `sub` is the account id; everything else is
/// standard registered claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub session_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            session_ttl: Duration::from_secs((ttl_minutes as u64) * 60),
        }
    }
}

impl JwtKeys {
    pub fn sign_session(&self, account_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.session_ttl.as_secs() as i64);
        let claims = Claims {
            sub: account_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(account_id = %account_id, "session token signed");
        Ok(token)
    }

    /// Verification seam for anything that later consumes session tokens.
    /// No route in this service is protected today.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(account_id = %data.claims.sub, "session token verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;

    fn make_keys(secret: &str) -> JwtKeys {
        let cfg = JwtConfig {
            secret: secret.into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 60 * 24,
        };
        JwtKeys {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer,
            audience: cfg.audience,
            session_ttl: Duration::from_secs((cfg.ttl_minutes as u64) * 60),
        }
    }

    #[test]
    fn sign_and_verify_session_token() {
        let keys = make_keys("dev-secret");
        let account_id = Uuid::new_v4();
        let token = keys.sign_session(account_id).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, account_id);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        // One-day default TTL.
        assert_eq!(claims.exp - claims.iat, 60 * 60 * 24);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = make_keys("secret-a")
            .sign_session(Uuid::new_v4())
            .expect("sign");
        assert!(make_keys("secret-b").verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let mut keys = make_keys("dev-secret");
        keys.session_ttl = Duration::from_secs(0);
        let token = keys.sign_session(Uuid::new_v4()).expect("sign");
        // Default validation leeway is 60s; shrink it so exp == now fails.
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&keys.audience));
        validation.set_issuer(std::slice::from_ref(&keys.issuer));
        std::thread::sleep(std::time::Duration::from_secs(1));
        assert!(decode::<Claims>(&token, &keys.decoding, &validation).is_err());
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys("dev-secret");
        assert!(keys.verify("not-a-jwt").is_err());
    }
}
