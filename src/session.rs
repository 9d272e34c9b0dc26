// src/session.rs
//! Authentication context and its persistence.
//!
//! The signed-in user lives in a [`Session`] value that is passed to
//! whatever needs it; there is no ambient singleton. The session is
//! persisted as one JSON file holding the token and the user object,
//! consumed opaquely, and dropped client-side once the token's `exp` claim
//! has passed. The backend remains the authority on token validity; the
//! local expiry check only prevents doomed requests.

use anyhow::{Context, Result};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::fetch::ApiClient;
use crate::types::job::{Role, User};
use crate::types::response::{ApiMessage, AuthResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingSession,
    TokenExpired,
    LoginRejected,
    NotRecruiter,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingSession => "Not signed in. Run `jobport login` first",
            AuthError::TokenExpired => "Session expired. Sign in again",
            AuthError::LoginRejected => "Login rejected by the server",
            AuthError::NotRecruiter => "This operation is only available to recruiter accounts",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AuthError {}

/// The authentication context: current user plus the bearer token backing
/// them, with explicit login/logout mutators.
#[derive(Debug, Clone, Default)]
pub struct Session {
    current_user: Option<User>,
    token: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&mut self, token: String, user: User) {
        info!("Signed in as {} ({:?})", user.email, user.role);
        self.token = Some(token);
        self.current_user = Some(user);
    }

    pub fn logout(&mut self) {
        if let Some(user) = &self.current_user {
            info!("Signed out {}", user.email);
        }
        self.token = None;
        self.current_user = None;
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some() && self.token.is_some()
    }

    pub fn is_recruiter(&self) -> bool {
        matches!(self.current_user(), Some(user) if user.role == Role::Recruiter)
    }

    pub fn require_user(&self) -> Result<&User> {
        self.current_user()
            .ok_or_else(|| AuthError::MissingSession.into())
    }

    pub fn require_recruiter(&self) -> Result<&User> {
        let user = self.require_user()?;
        if user.role != Role::Recruiter {
            return Err(AuthError::NotRecruiter.into());
        }
        Ok(user)
    }
}

/// Whether a stored JWT is past its `exp` claim. The signature is NOT
/// verified (the server does that on every request); this check only
/// decides whether a stored session is worth presenting at all. Tokens
/// that cannot be decoded count as expired.
pub fn token_expired(token: &str) -> bool {
    #[derive(Deserialize)]
    struct Claims {
        #[allow(dead_code)]
        exp: usize,
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_aud = false;

    match decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(_) => false,
        Err(e) => {
            debug!("Treating stored token as expired: {}", e);
            true
        }
    }
}

/// On-disk shape of the persisted session. Matches what the web client
/// keeps in browser storage: the token plus the user object.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: String,
    user: User,
}

/// Loads and saves the session file under the configured state directory.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the persisted session if one exists and its token is still
    /// usable. An expired or unreadable session file is removed and
    /// reported as absent.
    pub async fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read session file: {}", self.path.display()))?;

        let stored: StoredSession = match serde_json::from_str(&content) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Discarding unreadable session file: {}", e);
                self.clear().await?;
                return Ok(None);
            }
        };

        if token_expired(&stored.token) {
            warn!("Discarding expired session for {}", stored.user.email);
            self.clear().await?;
            return Ok(None);
        }

        let mut session = Session::new();
        session.login(stored.token, stored.user);
        Ok(Some(session))
    }

    pub async fn save(&self, session: &Session) -> Result<()> {
        let (token, user) = match (session.token(), session.current_user()) {
            (Some(token), Some(user)) => (token, user),
            _ => anyhow::bail!("Refusing to persist a session with no signed-in user"),
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let stored = StoredSession {
            token: token.to_string(),
            user: user.clone(),
        };
        let content =
            serde_json::to_string_pretty(&stored).context("Failed to serialize session")?;

        tokio::fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write session file: {}", self.path.display()))
    }

    pub async fn clear(&self) -> Result<()> {
        if self.path.exists() {
            tokio::fs::remove_file(&self.path)
                .await
                .with_context(|| format!("Failed to remove session file: {}", self.path.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Client for the user/auth endpoint.
pub struct UserService {
    api: ApiClient,
}

impl UserService {
    pub fn new(base_url: String, timeout_seconds: u64) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(base_url, timeout_seconds)?,
        })
    }

    pub fn with_token(base_url: String, timeout_seconds: u64, token: &str) -> Result<Self> {
        Ok(Self {
            api: ApiClient::with_token(base_url, timeout_seconds, Some(token))?,
        })
    }

    /// Exchange credentials for a token and user object. A response without
    /// both is a rejected login regardless of HTTP status.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User)> {
        let payload = LoginRequest { email, password };
        let response: AuthResponse = self.api.post_json("/login", &payload).await?;

        match (response.success, response.token, response.user) {
            (true, Some(token), Some(user)) => Ok((token, user)),
            (_, _, _) => {
                if let Some(message) = response.message {
                    warn!("Login rejected: {}", message);
                }
                Err(AuthError::LoginRejected.into())
            }
        }
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<(String, User)> {
        let response: AuthResponse = self.api.post_json("/signup", request).await?;
        match (response.success, response.token, response.user) {
            (true, Some(token), Some(user)) => Ok((token, user)),
            (_, _, _) => anyhow::bail!(
                "Signup rejected: {}",
                response
                    .message
                    .unwrap_or_else(|| "no reason given".to_string())
            ),
        }
    }

    /// Server-side logout; failures are reported but never block the local
    /// session from being cleared.
    pub async fn logout(&self) -> Result<ApiMessage> {
        self.api.post_json("/logout", &serde_json::json!({})).await
    }

    pub async fn me(&self) -> Result<AuthResponse> {
        self.api.get_json("/me", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::job::Profile;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn user(role: Role) -> User {
        User {
            id: "u-1".to_string(),
            role,
            email: "pat@example.com".to_string(),
            profile: Profile::default(),
        }
    }

    fn token_with_exp(exp: i64) -> String {
        #[derive(Serialize)]
        struct Claims {
            sub: String,
            exp: i64,
        }
        let claims = Claims {
            sub: "u-1".to_string(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_login_logout_cycle() {
        let mut session = Session::new();
        assert!(!session.is_authenticated());

        session.login("tok".to_string(), user(Role::Candidate));
        assert!(session.is_authenticated());
        assert_eq!(session.current_user().unwrap().email, "pat@example.com");

        session.logout();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_require_recruiter() {
        let mut session = Session::new();
        assert!(session.require_recruiter().is_err());

        session.login("tok".to_string(), user(Role::Candidate));
        assert!(session.require_recruiter().is_err());

        session.login("tok".to_string(), user(Role::Recruiter));
        assert!(session.require_recruiter().is_ok());
    }

    #[test]
    fn test_token_expiry() {
        let future = chrono::Utc::now().timestamp() + 3600;
        let past = chrono::Utc::now().timestamp() - 3600;

        assert!(!token_expired(&token_with_exp(future)));
        assert!(token_expired(&token_with_exp(past)));
        assert!(token_expired("not-a-jwt"));
    }

    #[tokio::test]
    async fn test_session_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("jobport-test-{}", std::process::id()));
        let store = SessionStore::new(dir.join("session.json"));

        assert!(store.load().await.unwrap().is_none());

        let mut session = Session::new();
        session.login(
            token_with_exp(chrono::Utc::now().timestamp() + 3600),
            user(Role::Recruiter),
        );
        store.save(&session).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert!(loaded.is_recruiter());
        assert_eq!(loaded.current_user().unwrap().id, "u-1");

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_expired_session_file_is_dropped() {
        let dir = std::env::temp_dir().join(format!("jobport-test-exp-{}", std::process::id()));
        let store = SessionStore::new(dir.join("session.json"));

        let mut session = Session::new();
        session.login(
            token_with_exp(chrono::Utc::now().timestamp() - 3600),
            user(Role::Candidate),
        );
        store.save(&session).await.unwrap();

        assert!(store.load().await.unwrap().is_none());
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
