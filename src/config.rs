//! 設定ファイル管理
//!
//! `~/.config/deepcoder/config.toml` から TOML 形式の設定を読み込む。
//! ファイルが存在しない場合はテンプレートを生成し、デフォルト値を使用する。
//!
//! API キーは設定ファイルには書かない。`api_key_env` で指定した環境変数
//! （`.env` も可）から読み取る。
//!
//! # 設定ファイル例
//!
//! ```toml
//! [completion]
//! model = "deepseek-coder"
//! max_tokens = 2000
//! timeout_secs = 120
//!
//! [auth]
//! client_id = "Iv1.0123456789abcdef"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

/// Deep Coder の設定全体
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DeepCoderConfig {
    /// 補完 API 関連設定
    pub completion: CompletionConfig,
    /// GitHub サインイン関連設定
    pub auth: AuthConfig,
}

/// 補完 API の設定
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// POST 先のエンドポイント
    pub endpoint: String,
    /// モデル名
    pub model: String,
    /// 最大出力トークン数
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    /// リクエストのタイムアウト秒数（0 = 通信層のデフォルト）
    pub timeout_secs: u64,
    /// API キーを読み取る環境変数名
    pub api_key_env: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.deepseek.ai/v1/completions".to_string(),
            model: "deepseek-coder".to_string(),
            max_tokens: 2000,
            temperature: 0.7,
            top_p: 0.95,
            timeout_secs: 120,
            api_key_env: "DEEPSEEK_API_KEY".to_string(),
        }
    }
}

/// GitHub OAuth（デバイスフロー）の設定
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// OAuth App の Client ID。空なら `GITHUB_CLIENT_ID` 環境変数を見る。
    pub client_id: String,
    /// 要求するスコープ
    pub scope: String,
    /// デバイスフローの接続先（GitHub Enterprise では差し替える）
    pub oauth_base: String,
    /// ユーザー情報 API の接続先
    pub api_base: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            scope: "read:user user:email".to_string(),
            oauth_base: "https://github.com".to_string(),
            api_base: "https://api.github.com".to_string(),
        }
    }
}

impl AuthConfig {
    /// 有効な Client ID を返す。設定ファイル → `GITHUB_CLIENT_ID` の順に探す。
    pub fn resolved_client_id(&self) -> Option<String> {
        let from_file = self.client_id.trim();
        if !from_file.is_empty() {
            return Some(from_file.to_string());
        }
        std::env::var("GITHUB_CLIENT_ID")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

const TEMPLATE: &str = r#"# Deep Coder configuration
#
# The API key is NOT read from this file.
# Put it in the environment (or a .env file), e.g. DEEPSEEK_API_KEY=sk-...

[completion]
# endpoint = "https://api.deepseek.ai/v1/completions"
# model = "deepseek-coder"
# max_tokens = 2000
# temperature = 0.7
# top_p = 0.95
# timeout_secs = 120
# api_key_env = "DEEPSEEK_API_KEY"

[auth]
# client_id = ""
# scope = "read:user user:email"
# oauth_base = "https://github.com"
# api_base = "https://api.github.com"
"#;

impl DeepCoderConfig {
    /// デフォルトの場所から設定ファイルを読み込む。
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// 指定したパスから設定ファイルを読み込む。
    ///
    /// 存在しなければテンプレートを生成してデフォルト値を返す。
    /// 読み込み・パースに失敗した場合は警告を表示してデフォルト値を返す。
    pub fn load_from(path: &Path) -> Self {
        debug!(path = %path.display(), "Loading config file");

        if !path.exists() {
            Self::create_default_config(path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<DeepCoderConfig>(&content) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        endpoint = %config.completion.endpoint,
                        model = %config.completion.model,
                        timeout_secs = config.completion.timeout_secs,
                        auth_configured = !config.auth.client_id.is_empty(),
                        "Config loaded successfully"
                    );
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    eprintln!("deepcoder: warning: failed to parse config file: {e}");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read config file");
                eprintln!("deepcoder: warning: failed to read config file: {e}");
                Self::default()
            }
        }
    }

    /// 設定ファイルのパスを返す。
    ///
    /// `~/.config/deepcoder/config.toml` 固定。
    /// `$HOME` が取得できない場合は `./.config/deepcoder/config.toml`。
    pub fn config_path() -> PathBuf {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".config/deepcoder/config.toml")
    }

    /// 設定ファイルが存在しない場合にテンプレートから生成する。
    /// 失敗しても警告のみで起動は継続する。
    fn create_default_config(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "Failed to create config directory");
                eprintln!("deepcoder: warning: failed to create config directory: {e}");
                return;
            }
        }

        match std::fs::write(path, TEMPLATE) {
            Ok(()) => info!(path = %path.display(), "Created default config file"),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to create default config file");
                eprintln!("deepcoder: warning: failed to create config file: {e}");
            }
        }
    }
}
