//! 補完リクエストの組み立て

use serde::Serialize;

use crate::config::CompletionConfig;

/// プロンプトを包む固定の指示テンプレート。`{prompt}` がユーザー入力に置き換わる。
const TASK_TEMPLATE: &str = "Generate React/Next.js code for the following requirement:\n{prompt}\nPlease provide the code in a code block with proper comments and explanations.";

/// 生成パラメータ。設定ファイルの `[completion]` セクションから作る。
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "deepseek-coder".to_string(),
            max_tokens: 2000,
            temperature: 0.7,
            top_p: 0.95,
        }
    }
}

impl From<&CompletionConfig> for GenerationSettings {
    fn from(config: &CompletionConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }
}

/// 補完 API に送るリクエストボディ。
///
/// 構築後は変更できない（フィールドは非公開、読み取り専用のアクセサのみ）。
/// `stop` は常に `null` としてシリアライズされる。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    prompt: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    stream: bool,
    stop: Option<Vec<String>>,
}

impl CompletionRequest {
    /// ユーザーのプロンプトをテンプレートに埋め込んでリクエストを作る。
    /// 空文字列かどうかの検証は呼び出し元（Generation Gate）の責務。
    pub fn new(prompt: &str, settings: &GenerationSettings) -> Self {
        Self {
            prompt: TASK_TEMPLATE.replace("{prompt}", prompt),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            top_p: settings.top_p,
            stream: false,
            stop: None,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn top_p(&self) -> f64 {
        self.top_p
    }

    pub fn is_streaming(&self) -> bool {
        self.stream
    }
}
