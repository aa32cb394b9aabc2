//! GitHub サインイン（OAuth デバイスフロー）
//!
//! ブラウザでの "Sign in with GitHub" に相当する端末向けのフロー。
//! 認証そのものは GitHub 側で行われ、ここではコードの取得・ポーリング・
//! ユーザー情報の取得だけを行う。セッションはプロセス内のメモリにのみ保持する。

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::AuthConfig;

use super::{AuthError, SessionProvider, SessionState, User};

const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";
/// `slow_down` を受けたときに追加する待ち時間
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);
/// プロバイダが返す `expires_in` / `interval` の上限
const MAX_CODE_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// ユーザーに提示するデバイスコード
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceCode {
    device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub expires_in: u64,
    #[serde(default = "default_interval")]
    pub interval: u64,
}

fn default_interval() -> u64 {
    5
}

type DeviceCodeHandler = Box<dyn Fn(&DeviceCode) + Send + Sync>;

/// GitHub のデバイスフローを使う `SessionProvider`
pub struct GithubDeviceAuth {
    http: reqwest::Client,
    client_id: Option<String>,
    scope: String,
    oauth_base: String,
    api_base: String,
    session: Mutex<SessionState>,
    on_device_code: DeviceCodeHandler,
}

/// トークン取得のポーリング結果
enum TokenPoll {
    Token(String),
    Pending,
    SlowDown,
}

impl GithubDeviceAuth {
    pub fn new(config: &AuthConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("deepcoder/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            http,
            client_id: config.resolved_client_id(),
            scope: config.scope.clone(),
            oauth_base: config.oauth_base.trim_end_matches('/').to_string(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            session: Mutex::new(SessionState::SignedOut),
            on_device_code: Box::new(|_| {}),
        }
    }

    /// デバイスコードを受け取ったときの表示処理を差し替える。
    pub fn with_device_code_handler(
        mut self,
        handler: impl Fn(&DeviceCode) + Send + Sync + 'static,
    ) -> Self {
        self.on_device_code = Box::new(handler);
        self
    }

    fn session(&self) -> MutexGuard<'_, SessionState> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn request_device_code(&self, client_id: &str) -> Result<DeviceCode, AuthError> {
        let response = self
            .http
            .post(format!("{}/login/device/code", self.oauth_base))
            .header(ACCEPT, "application/json")
            .form(&[("client_id", client_id), ("scope", self.scope.as_str())])
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Provider(format!(
                "device code request returned HTTP {status}"
            )));
        }

        response
            .json::<DeviceCode>()
            .await
            .map_err(|e| AuthError::Provider(format!("unexpected device code response: {e}")))
    }

    async fn poll_token(&self, client_id: &str, device_code: &str) -> Result<TokenPoll, AuthError> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: Option<String>,
            error: Option<String>,
            error_description: Option<String>,
        }

        let response = self
            .http
            .post(format!("{}/login/oauth/access_token", self.oauth_base))
            .header(ACCEPT, "application/json")
            .form(&[
                ("client_id", client_id),
                ("device_code", device_code),
                ("grant_type", DEVICE_GRANT_TYPE),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("unexpected token response: {e}")))?;

        if let Some(token) = parsed.access_token {
            return Ok(TokenPoll::Token(token));
        }

        match parsed.error.as_deref() {
            Some("authorization_pending") => Ok(TokenPoll::Pending),
            Some("slow_down") => Ok(TokenPoll::SlowDown),
            Some("expired_token") => Err(AuthError::Expired),
            Some("access_denied") => Err(AuthError::Denied),
            Some(other) => Err(AuthError::Provider(
                parsed.error_description.unwrap_or_else(|| other.to_string()),
            )),
            None => Err(AuthError::Provider(
                "token response had neither a token nor an error".to_string(),
            )),
        }
    }

    async fn fetch_user(&self, token: &str) -> Result<User, AuthError> {
        #[derive(Deserialize)]
        struct GithubUser {
            login: String,
            email: Option<String>,
        }

        let response = self
            .http
            .get(format!("{}/user", self.api_base))
            .header(ACCEPT, "application/vnd.github+json")
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Provider(format!(
                "user lookup returned HTTP {status}"
            )));
        }

        let user: GithubUser = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("unexpected user response: {e}")))?;

        Ok(User {
            login: user.login,
            email: user.email.filter(|e| !e.is_empty()),
        })
    }
}

/// デバイスコードの有効期限。極端な `expires_in` は上限で丸める。
fn code_deadline(now: Instant, expires_in: u64) -> Instant {
    now + Duration::from_secs(expires_in).min(MAX_CODE_LIFETIME)
}

#[async_trait]
impl SessionProvider for GithubDeviceAuth {
    fn current_session(&self) -> SessionState {
        self.session().clone()
    }

    async fn sign_in(&self) -> Result<User, AuthError> {
        let client_id = self.client_id.as_deref().ok_or(AuthError::NotConfigured)?;

        let code = self.request_device_code(client_id).await?;
        debug!(
            verification_uri = %code.verification_uri,
            expires_in = code.expires_in,
            interval = code.interval,
            "Device code issued"
        );
        (self.on_device_code)(&code);

        let deadline = code_deadline(Instant::now(), code.expires_in);
        let mut interval = Duration::from_secs(code.interval).min(MAX_CODE_LIFETIME);

        let token = loop {
            tokio::time::sleep(interval).await;
            if Instant::now() >= deadline {
                warn!("Device code expired while waiting for confirmation");
                return Err(AuthError::Expired);
            }
            match self.poll_token(client_id, &code.device_code).await? {
                TokenPoll::Token(token) => break token,
                TokenPoll::Pending => continue,
                TokenPoll::SlowDown => {
                    interval = (interval + SLOW_DOWN_STEP).min(MAX_CODE_LIFETIME);
                    debug!(interval_secs = interval.as_secs(), "Provider asked to slow down");
                }
            }
        };

        let user = self.fetch_user(&token).await?;
        info!(login = %user.login, "Signed in with GitHub");
        *self.session() = SessionState::SignedIn(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let mut session = self.session();
        if let SessionState::SignedIn(ref user) = *session {
            info!(login = %user.login, "Signed out");
        }
        *session = SessionState::SignedOut;
        Ok(())
    }
}
