//! 補完 API 呼び出しのエラー

use serde::Deserialize;
use thiserror::Error;

/// 他に手掛かりがないときに使う汎用メッセージ
pub(crate) const GENERIC_FAILURE: &str = "Failed to generate code";

/// 補完 API 呼び出しの失敗。
///
/// どの失敗も人が読めるメッセージを 1 つだけ持つ。
/// メッセージの優先順位: サービスが返した `error` フィールド → 通信層のメッセージ → 汎用メッセージ。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// 応答を受け取れなかった（接続失敗、タイムアウトなど）
    #[error("{message}")]
    Transport { message: String },
    /// 2xx 以外のステータスが返った
    #[error("{message}")]
    Status { status: u16, message: String },
    /// 2xx だったがボディが期待した形ではなかった
    #[error("{message}")]
    Decode { message: String },
}

impl CompletionError {
    /// 通信層のエラーから作る。
    pub(crate) fn transport(err: &reqwest::Error) -> Self {
        Self::Transport {
            message: pick_message(None, &err.to_string()),
        }
    }

    /// 2xx 以外の応答から作る。ボディに `error` があればそれを優先する。
    pub(crate) fn status(status: reqwest::StatusCode, body: &str) -> Self {
        let transport = format!("completion service returned HTTP {status}");
        Self::Status {
            status: status.as_u16(),
            message: pick_message(service_error(body).as_deref(), &transport),
        }
    }

    /// パースに失敗した 2xx 応答から作る。
    pub(crate) fn decode(body: &str, err: &serde_json::Error) -> Self {
        let transport = format!("malformed response from completion service: {err}");
        Self::Decode {
            message: pick_message(service_error(body).as_deref(), &transport),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Transport { message } | Self::Status { message, .. } | Self::Decode { message } => {
                message
            }
        }
    }
}

/// 空でない最初の候補を選ぶ。どれも空なら汎用メッセージ。
fn pick_message(service: Option<&str>, transport: &str) -> String {
    [service.unwrap_or_default(), transport]
        .into_iter()
        .map(str::trim)
        .find(|m| !m.is_empty())
        .unwrap_or(GENERIC_FAILURE)
        .to_string()
}

/// エラーボディから `error` フィールドを取り出す。
///
/// `{"error": "text"}` のほか、よくある `{"error": {"message": "text"}}` も受け付ける。
pub(crate) fn service_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ErrorField {
        Text(String),
        Object { message: Option<String> },
    }

    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: Option<ErrorField>,
    }

    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let message = match envelope.error? {
        ErrorField::Text(text) => text,
        ErrorField::Object { message } => message?,
    };
    if message.trim().is_empty() {
        None
    } else {
        Some(message)
    }
}
