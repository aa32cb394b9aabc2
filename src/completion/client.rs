//! 補完 API クライアント
//!
//! プロンプト 1 件につき HTTP POST を 1 回だけ送り、応答から生成結果を取り出す。
//! リトライはしない。タイムアウトは設定ファイルの `timeout_secs` に従う。

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::CompletionConfig;

use super::error::CompletionError;
use super::extract::split_code_block;
use super::request::{CompletionRequest, GenerationSettings};
use super::{CodeGenerator, CompletionResult};

/// `.env` のサンプル値。これが入ったままなら未設定とみなす。
const PLACEHOLDER_API_KEY: &str = "your_deepseek_api_key";

/// 補完 API の HTTP クライアント。呼び出し間で状態を持たない。
pub struct CompletionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    settings: GenerationSettings,
}

impl CompletionClient {
    /// 環境変数（名前は `api_key_env`）から API キーを読み取ってクライアントを作る。
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let api_key = resolve_api_key(&config.api_key_env)?;
        Self::with_api_key(config, api_key)
    }

    /// API キーを直接渡してクライアントを作る。
    pub fn with_api_key(config: &CompletionConfig, api_key: String) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("deepcoder/", env!("CARGO_PKG_VERSION")));
        // 0 のときは通信層のデフォルト（タイムアウトなし）
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let http = builder.build().context("failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key,
            settings: GenerationSettings::from(config),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }
}

#[async_trait]
impl CodeGenerator for CompletionClient {
    async fn generate(&self, prompt: &str) -> Result<CompletionResult, CompletionError> {
        let request = CompletionRequest::new(prompt, &self.settings);

        debug!(
            endpoint = %self.endpoint,
            model = request.model(),
            max_tokens = request.max_tokens(),
            temperature = request.temperature(),
            top_p = request.top_p(),
            stream = request.is_streaming(),
            prompt_length = prompt.len(),
            request_prompt_length = request.prompt().len(),
            "Sending completion request"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, endpoint = %self.endpoint, "Completion request failed before a response");
                CompletionError::transport(&e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!(error = %e, status = %status, "Failed to read completion response body");
            CompletionError::transport(&e)
        })?;

        if !status.is_success() {
            let err = CompletionError::status(status, &body);
            warn!(status = %status, message = err.message(), "Completion service returned an error");
            return Err(err);
        }

        let parsed: CompletionResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, body_length = body.len(), "Failed to parse completion response");
            CompletionError::decode(&body, &e)
        })?;

        let content = parsed.first_text();
        let result = split_code_block(&content);

        info!(
            content_length = content.len(),
            code_length = result.code.len(),
            explanation_length = result.explanation.len(),
            "Completion received"
        );

        Ok(result)
    }
}

/// 成功時のボディ。`choices` が空・欠落していてもエラーにしない。
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Option<Vec<CompletionChoice>>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: Option<String>,
}

impl CompletionResponse {
    /// 最初の choice のテキスト。なければ空文字列。
    fn first_text(self) -> String {
        self.choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.text)
            .unwrap_or_default()
    }
}

/// 環境変数から API キーを読み取る。空やサンプル値のままなら拒否する。
fn resolve_api_key(var: &str) -> Result<String> {
    let key = std::env::var(var)
        .with_context(|| format!("{var} is not set. Code generation is disabled."))?;
    validate_api_key(var, key)
}

fn validate_api_key(var: &str, key: String) -> Result<String> {
    let trimmed = key.trim();
    if trimmed.is_empty() || trimmed == PLACEHOLDER_API_KEY {
        anyhow::bail!("{var} is not configured. Please set a valid API key in .env");
    }
    Ok(trimmed.to_string())
}
