//! Bearer credential verification.
//!
//! The real authorization service lives upstream; this side only decides
//! whether a presented bearer token is acceptable.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

/// Who made the request, as far as this service can tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub subject: String,
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Accept or reject a bearer token. `None` means rejected.
    async fn verify(&self, token: &str) -> Option<Caller>;
}

/// Accepts any non-empty token (gateway trust model) unless an allow-list of
/// tokens is configured.
pub struct ConfiguredTokenVerifier {
    allowed: Vec<SecretString>,
}

impl ConfiguredTokenVerifier {
    pub fn new(allowed: Vec<SecretString>) -> Self {
        Self { allowed }
    }

    pub fn trust_gateway() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl TokenVerifier for ConfiguredTokenVerifier {
    async fn verify(&self, token: &str) -> Option<Caller> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }

        if self.allowed.is_empty() {
            return Some(Caller {
                subject: "gateway".to_string(),
            });
        }

        // Check every entry so timing does not reveal which one matched.
        let mut matched = None;
        for (index, allowed) in self.allowed.iter().enumerate() {
            let equal: bool = allowed
                .expose_secret()
                .as_bytes()
                .ct_eq(token.as_bytes())
                .into();
            if equal && matched.is_none() {
                matched = Some(index);
            }
        }

        matched.map(|index| Caller {
            subject: format!("api-token-{}", index),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string())
    }

    #[tokio::test]
    async fn gateway_mode_accepts_any_token() {
        let verifier = ConfiguredTokenVerifier::trust_gateway();
        assert!(verifier.verify("eyJhbGciOiJIUzI1NiJ9.test").await.is_some());
        assert!(verifier.verify("   ").await.is_none());
    }

    #[tokio::test]
    async fn allow_list_only_accepts_listed_tokens() {
        let verifier = ConfiguredTokenVerifier::new(vec![secret("alpha"), secret("beta")]);

        assert_eq!(
            verifier.verify("beta").await,
            Some(Caller {
                subject: "api-token-1".to_string()
            })
        );
        assert!(verifier.verify("gamma").await.is_none());
        assert!(verifier.verify("alph").await.is_none());
    }
}
