//! 認証コラボレータ
//!
//! サインイン状態は外部の ID プロバイダが所有する。
//! Generation Gate は `SessionProvider` を通して状態を読むだけで、書き換えはしない。

pub mod github;

use async_trait::async_trait;
use thiserror::Error;

pub use github::{DeviceCode, GithubDeviceAuth};

/// プロバイダから得たユーザー情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub login: String,
    pub email: Option<String>,
}

impl User {
    /// サイドバーに出す表示名（メールアドレスがあればそれ、なければログイン名）
    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.login)
    }
}

/// サインイン状態
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    SignedOut,
    SignedIn(User),
}

impl SessionState {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::SignedIn(user) => Some(user),
            Self::SignedOut => None,
        }
    }
}

/// プロバイダとのやり取りの失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("GitHub sign-in is not configured (set [auth] client_id or GITHUB_CLIENT_ID)")]
    NotConfigured,
    #[error("sign-in was denied at the provider")]
    Denied,
    #[error("the sign-in code expired before it was confirmed")]
    Expired,
    #[error("identity provider error: {0}")]
    Provider(String),
    #[error("could not reach the identity provider: {0}")]
    Transport(String),
}

/// 外部 ID プロバイダへの窓口。
///
/// `current_session` は読み取りのみ。状態の変更は `sign_in` / `sign_out` に委譲する。
#[async_trait]
pub trait SessionProvider: Send + Sync {
    fn current_session(&self) -> SessionState;

    async fn sign_in(&self) -> Result<User, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_email() {
        let user = User {
            login: "octocat".to_string(),
            email: Some("octocat@github.com".to_string()),
        };
        assert_eq!(user.display_name(), "octocat@github.com");

        let no_email = User {
            login: "octocat".to_string(),
            email: None,
        };
        assert_eq!(no_email.display_name(), "octocat");
    }

    #[test]
    fn default_session_is_signed_out() {
        let state = SessionState::default();
        assert!(!state.is_signed_in());
        assert!(state.user().is_none());
    }
}
