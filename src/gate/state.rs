//! Generation Gate の状態と分類

use std::fmt;

use crate::completion::{CompletionError, CompletionResult};

/// 失敗の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 空のプロンプト、未サインイン（ゲート内で処理され、アダプタには届かない）
    ValidationError,
    /// ID プロバイダでのサインイン/サインアウト失敗
    AuthError,
    /// 応答を受け取れなかった
    NetworkError,
    /// 補完サービスがエラーまたは想定外の応答を返した
    ServiceError,
}

impl ErrorKind {
    /// アダプタのエラーを発生元で分類する。
    pub fn classify(err: &CompletionError) -> Self {
        match err {
            CompletionError::Transport { .. } => Self::NetworkError,
            CompletionError::Status { .. } | CompletionError::Decode { .. } => Self::ServiceError,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ValidationError => "validation error",
            Self::AuthError => "authentication error",
            Self::NetworkError => "network error",
            Self::ServiceError => "service error",
        };
        f.write_str(label)
    }
}

/// 生成のライフサイクル
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    Generating,
    Succeeded(CompletionResult),
    Failed(ErrorKind, String),
}

impl GenerationState {
    pub fn is_generating(&self) -> bool {
        matches!(self, Self::Generating)
    }
}

/// 状態遷移を伴わない利用者向けの案内
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// 空白を除くとプロンプトが空
    EnterDescription,
    /// サインインしていない
    SignInRequired,
}

impl Advisory {
    pub fn kind(self) -> ErrorKind {
        ErrorKind::ValidationError
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::EnterDescription => "Please enter a description of the app you want to build.",
            Self::SignInRequired => "Please sign in with GitHub to generate code (/login).",
        }
    }
}

/// `submit` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 前提条件を満たさなかった（状態は変わらない）
    Advisory(Advisory),
    /// 生成中のため、またはゲート停止後のため無視された
    Ignored,
    /// アダプタの呼び出しが完了し、状態が確定した
    Settled(GenerationState),
    /// 完了したが、その時点でゲートが停止していたため結果を捨てた
    Discarded,
}
