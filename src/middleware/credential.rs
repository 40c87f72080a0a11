//! Turning what a request presents into a policy `Actor`.

use crate::credentials::CredentialStore;
use crate::errors::AppError;
use crate::middleware::policy::{Actor, Denial};
use crate::registry::TokenRegistry;

/// A credential offered by a caller.
#[derive(Clone)]
pub enum Credential {
    Password { username: String, password: String },
    Token(String),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .finish_non_exhaustive(),
            Credential::Token(_) => f.write_str("Token(<redacted>)"),
        }
    }
}

impl Credential {
    /// Pick the credential from optional wire fields. A complete
    /// username/password pair wins over `authority`; a lone username or
    /// password counts as nothing.
    pub fn from_parts(
        username: Option<String>,
        password: Option<String>,
        authority: Option<String>,
    ) -> Option<Self> {
        match (username, password, authority) {
            (Some(username), Some(password), _) => Some(Credential::Password { username, password }),
            (_, _, Some(token)) => Some(Credential::Token(token)),
            _ => None,
        }
    }
}

/// Verify a password or resolve a token. A wrong password is denied here;
/// an unknown token is not, it becomes `Bearer(Invalid)` for the policy.
pub async fn authenticate(
    credential: &Credential,
    credentials: &CredentialStore,
    registry: &TokenRegistry,
) -> Result<Actor, AppError> {
    match credential {
        Credential::Password { username, password } => {
            let user = credentials
                .verify(username, password)
                .await?
                .ok_or(Denial::InvalidCredentials)?;
            Ok(Actor::User { user_id: user.id })
        }
        Credential::Token(value) => Ok(Actor::Bearer(registry.resolve(value).await?)),
    }
}

/// Actor for endpoints that accept only an optional bearer `authority`.
pub async fn bearer_actor(
    authority: Option<&str>,
    registry: &TokenRegistry,
) -> Result<Actor, AppError> {
    match authority {
        None | Some("") => Ok(Actor::Anonymous),
        Some(value) => Ok(Actor::Bearer(registry.resolve(value).await?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn test_password_pair_wins_over_authority() {
        let c = Credential::from_parts(s("alice"), s("pw"), s("tok"));
        assert!(matches!(c, Some(Credential::Password { .. })));
    }

    #[test]
    fn test_partial_pair_falls_back_to_authority() {
        let c = Credential::from_parts(s("alice"), None, s("tok"));
        assert!(matches!(c, Some(Credential::Token(ref t)) if t == "tok"));
        assert!(Credential::from_parts(None, s("pw"), None).is_none());
        assert!(Credential::from_parts(None, None, None).is_none());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let pw = Credential::Password {
            username: "alice".into(),
            password: "hunter2".into(),
        };
        let tok = Credential::Token("abcdef".into());
        assert!(!format!("{:?}", pw).contains("hunter2"));
        assert!(!format!("{:?}", tok).contains("abcdef"));
    }
}
