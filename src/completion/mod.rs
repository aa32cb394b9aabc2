//! Completion モジュール: コード生成 API アダプタ
//!
//! 自由入力のプロンプトから補完リクエストを組み立てて外部の補完 API に送信し、
//! 返ってきたテキストからコードブロックと説明文を取り出す。
//! UI 層には依存しない。

mod client;
mod error;
mod extract;
mod request;

use async_trait::async_trait;

pub use client::CompletionClient;
pub use error::CompletionError;

/// 補完 API から取り出した生成結果。
///
/// 呼び出しが成功した場合 `code` は常に存在する（空文字列の場合もある）。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionResult {
    /// 応答中の最初のフェンス付きコードブロック（なければ応答全文）
    pub code: String,
    /// コードブロックを除いた残りのテキスト
    pub explanation: String,
}

/// プロンプトからコードを生成する能力。
///
/// Generation Gate はこのトレイト越しにアダプタを呼び出す。
/// テストではフェイク実装に差し替える。
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    /// プロンプト 1 件につき外部呼び出しをちょうど 1 回行い、結果を返す。
    async fn generate(&self, prompt: &str) -> Result<CompletionResult, CompletionError>;
}
