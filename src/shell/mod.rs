//! Shell モジュール: REPL ループと画面状態の管理
//!
//! `Shell` 構造体に REPL の状態を集約し、入力ハンドリング、スラッシュコマンド、
//! サインイン、生成リクエストの各責務をサブモジュールに分離する。

mod auth_flow;
mod commands;
mod editor;
mod generate;
mod input;

use std::sync::Arc;

use reedline::{EditCommand, Reedline, Signal};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::auth::{GithubDeviceAuth, SessionProvider};
use crate::cli::coder::coder_device_code;
use crate::cli::prompt::CoderPrompt;
use crate::completion::CompletionClient;
use crate::config::DeepCoderConfig;
use crate::gate::{GenerationGate, SubmitOutcome};

pub use commands::COMMANDS;

/// Deep Coder の REPL 状態を管理する構造体。
pub struct Shell {
    editor: Reedline,
    prompt: CoderPrompt,
    session: Arc<dyn SessionProvider>,
    /// API キー未設定時は `None`（生成機能を無効化）
    gate: Option<GenerationGate>,
    /// 生成を無効化した理由（案内表示用）
    disabled_reason: Option<String>,
    /// Ctrl-C で待つのをやめた生成タスク（結果を表示するまで保持する）
    detached: Vec<JoinHandle<SubmitOutcome>>,
}

impl Shell {
    /// 設定からサインインプロバイダ、補完クライアント、Generation Gate を組み立てる。
    pub fn new(config: &DeepCoderConfig) -> Self {
        let session: Arc<dyn SessionProvider> =
            Arc::new(GithubDeviceAuth::new(&config.auth).with_device_code_handler(coder_device_code));

        let (gate, disabled_reason) = match CompletionClient::new(&config.completion) {
            Ok(client) => {
                info!(
                    endpoint = client.endpoint(),
                    model = %client.settings().model,
                    "Completion client initialized successfully"
                );
                let gate = GenerationGate::new(Arc::clone(&session), Arc::new(client));
                (Some(gate), None)
            }
            Err(e) => {
                warn!("Code generation disabled: {e}");
                eprintln!("deepcoder: warning: code generation disabled: {e}");
                (None, Some(e.to_string()))
            }
        };

        Self::with_parts(session, gate, disabled_reason)
    }

    /// 組み立て済みの部品から Shell を作る。
    pub fn with_parts(
        session: Arc<dyn SessionProvider>,
        gate: Option<GenerationGate>,
        disabled_reason: Option<String>,
    ) -> Self {
        let prompt = CoderPrompt::new(Arc::clone(&session), gate.clone());
        Self {
            editor: editor::build_editor(),
            prompt,
            session,
            gate,
            disabled_reason,
            detached: Vec::new(),
        }
    }

    /// REPL ループを実行する。
    ///
    /// 戻り値: 終了コード（通常 0、REPL 内部エラー時 1）
    pub async fn run(&mut self) -> i32 {
        crate::cli::banner::print_hero();

        let mut exit_code = 0;

        loop {
            self.report_detached().await;
            self.load_draft();

            match self.editor.read_line(&self.prompt) {
                Ok(Signal::Success(line)) => {
                    if !self.handle_input(&line).await {
                        break;
                    }
                }
                Ok(Signal::CtrlC) => {
                    println!();
                }
                Ok(Signal::CtrlD) => {
                    info!("Ctrl-D received, exiting");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "REPL error, exiting");
                    eprintln!("deepcoder: error: {e}");
                    exit_code = 1;
                    break;
                }
            }
        }

        // 処理中の生成があっても、その結果は以後反映しない
        if let Some(ref gate) = self.gate {
            gate.shutdown();
        }

        crate::cli::banner::print_goodbye();
        exit_code
    }

    /// `select_suggestion` で入った下書きを入力欄に流し込む。
    fn load_draft(&mut self) {
        let draft = self.gate.as_ref().and_then(GenerationGate::take_draft);
        if let Some(text) = draft {
            self.editor
                .run_edit_commands(&[EditCommand::Clear, EditCommand::InsertString(text)]);
        }
    }
}
