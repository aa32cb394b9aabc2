//! Generation Gate: 生成リクエストの前提条件チェックと状態遷移
//!
//! - 空白を除いたプロンプトが空なら案内を返す（状態は変えない）
//! - サインインしていなければ案内を返す（状態は変えない）
//! - 生成中の再送信は無視する。1 インスタンスにつき同時に走るアダプタ呼び出しは高々 1 つ
//! - 停止（`shutdown`）後に届いた結果は捨てる
//!
//! ロックは状態の読み書きの間だけ保持し、await をまたがない。

mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::auth::SessionProvider;
use crate::completion::{CodeGenerator, CompletionError, CompletionResult};

pub use state::{Advisory, ErrorKind, GenerationState, SubmitOutcome};

struct GateInner {
    state: GenerationState,
    /// `select_suggestion` で入力欄に入れる予定のテキスト
    draft: Option<String>,
    alive: bool,
}

/// 生成リクエストの門番。`Clone` しても同じ状態を共有する。
#[derive(Clone)]
pub struct GenerationGate {
    inner: Arc<Mutex<GateInner>>,
    session: Arc<dyn SessionProvider>,
    generator: Arc<dyn CodeGenerator>,
}

impl GenerationGate {
    pub fn new(session: Arc<dyn SessionProvider>, generator: Arc<dyn CodeGenerator>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(GateInner {
                state: GenerationState::Idle,
                draft: None,
                alive: true,
            })),
            session,
            generator,
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 現在の状態（描画用のスナップショット）
    pub fn state(&self) -> GenerationState {
        self.lock().state.clone()
    }

    /// プロンプトを送信する。
    ///
    /// 前提条件を満たせば `Generating` に遷移してアダプタを 1 回だけ呼び出し、
    /// 結果に応じて `Succeeded` / `Failed` に遷移する。
    pub async fn submit(&self, prompt: &str) -> SubmitOutcome {
        if let Err(outcome) = self.begin(prompt) {
            return outcome;
        }

        let result = self.generator.generate(prompt).await;
        self.settle(result)
    }

    /// 前提条件を確認し、満たしていれば `Generating` に遷移する。
    fn begin(&self, prompt: &str) -> Result<(), SubmitOutcome> {
        let mut inner = self.lock();

        if !inner.alive {
            debug!("Submit after shutdown ignored");
            return Err(SubmitOutcome::Ignored);
        }
        if inner.state.is_generating() {
            debug!("Submit while generating ignored");
            return Err(SubmitOutcome::Ignored);
        }
        if prompt.trim().is_empty() {
            debug!("Submit with empty prompt rejected");
            return Err(SubmitOutcome::Advisory(Advisory::EnterDescription));
        }
        if !self.session.current_session().is_signed_in() {
            debug!("Submit while signed out rejected");
            return Err(SubmitOutcome::Advisory(Advisory::SignInRequired));
        }

        // 前回の結果・エラーはここで捨てる
        inner.state = GenerationState::Generating;
        info!(prompt_length = prompt.len(), "Generation started");
        Ok(())
    }

    /// アダプタの結果を状態に反映する。停止後なら捨てる。
    fn settle(&self, result: Result<CompletionResult, CompletionError>) -> SubmitOutcome {
        let mut inner = self.lock();

        if !inner.alive {
            debug!(ok = result.is_ok(), "Result arrived after shutdown, discarded");
            return SubmitOutcome::Discarded;
        }

        inner.state = match result {
            Ok(result) => {
                info!(code_length = result.code.len(), "Generation succeeded");
                GenerationState::Succeeded(result)
            }
            Err(err) => {
                let kind = ErrorKind::classify(&err);
                warn!(kind = %kind, error = %err, "Generation failed");
                GenerationState::Failed(kind, err.message().to_string())
            }
        };
        SubmitOutcome::Settled(inner.state.clone())
    }

    /// 候補テキストを入力欄に入れる。送信はしない。
    pub fn select_suggestion(&self, text: &str) {
        debug!(suggestion = %text, "Suggestion selected");
        self.lock().draft = Some(text.to_string());
    }

    /// 入力欄に入れる予定のテキストを取り出す。
    pub fn take_draft(&self) -> Option<String> {
        self.lock().draft.take()
    }

    /// ゲートを停止する。以降の送信は無視し、処理中の結果は捨てる。
    pub fn shutdown(&self) {
        let mut inner = self.lock();
        if inner.alive {
            info!(generating = inner.state.is_generating(), "Generation gate shut down");
        }
        inner.alive = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthError, SessionState, User};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct FakeSession {
        signed_in: AtomicBool,
    }

    impl FakeSession {
        fn new(signed_in: bool) -> Arc<Self> {
            Arc::new(Self {
                signed_in: AtomicBool::new(signed_in),
            })
        }
    }

    #[async_trait]
    impl SessionProvider for FakeSession {
        fn current_session(&self) -> SessionState {
            if self.signed_in.load(Ordering::SeqCst) {
                SessionState::SignedIn(User {
                    login: "octocat".to_string(),
                    email: None,
                })
            } else {
                SessionState::SignedOut
            }
        }

        async fn sign_in(&self) -> Result<User, AuthError> {
            self.signed_in.store(true, Ordering::SeqCst);
            Ok(User {
                login: "octocat".to_string(),
                email: None,
            })
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            self.signed_in.store(false, Ordering::SeqCst);
            Ok(())
        }
    }

    /// 呼び出し回数を数え、決まった結果を返すジェネレータ
    struct ScriptedGenerator {
        calls: AtomicUsize,
        result: Result<CompletionResult, CompletionError>,
    }

    impl ScriptedGenerator {
        fn ok(code: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                result: Ok(CompletionResult {
                    code: code.to_string(),
                    explanation: String::new(),
                }),
            })
        }

        fn err(err: CompletionError) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                result: Err(err),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CodeGenerator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<CompletionResult, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    /// `release` が通知されるまで完了しないジェネレータ
    struct GatedGenerator {
        calls: AtomicUsize,
        started: Notify,
        release: Notify,
    }

    impl GatedGenerator {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                started: Notify::new(),
                release: Notify::new(),
            })
        }
    }

    #[async_trait]
    impl CodeGenerator for GatedGenerator {
        async fn generate(&self, prompt: &str) -> Result<CompletionResult, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.started.notify_one();
            self.release.notified().await;
            Ok(CompletionResult {
                code: prompt.to_string(),
                explanation: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn successful_submit_settles_with_result() {
        let generator = ScriptedGenerator::ok("const X=1;");
        let gate = GenerationGate::new(FakeSession::new(true), generator.clone());

        let outcome = gate.submit("Build a todo list").await;

        let expected = GenerationState::Succeeded(CompletionResult {
            code: "const X=1;".to_string(),
            explanation: String::new(),
        });
        assert_eq!(outcome, SubmitOutcome::Settled(expected.clone()));
        assert_eq!(gate.state(), expected);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn empty_prompt_is_advisory_without_call() {
        let generator = ScriptedGenerator::ok("x");
        let gate = GenerationGate::new(FakeSession::new(true), generator.clone());

        for prompt in ["", "   ", "\n\t"] {
            assert_eq!(
                gate.submit(prompt).await,
                SubmitOutcome::Advisory(Advisory::EnterDescription)
            );
        }
        assert_eq!(gate.state(), GenerationState::Idle);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn signed_out_submit_is_advisory_without_call() {
        let generator = ScriptedGenerator::ok("x");
        let gate = GenerationGate::new(FakeSession::new(false), generator.clone());

        assert_eq!(
            gate.submit("X").await,
            SubmitOutcome::Advisory(Advisory::SignInRequired)
        );
        assert_eq!(gate.state(), GenerationState::Idle);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn empty_prompt_is_reported_before_sign_in() {
        let gate = GenerationGate::new(FakeSession::new(false), ScriptedGenerator::ok("x"));
        assert_eq!(
            gate.submit(" ").await,
            SubmitOutcome::Advisory(Advisory::EnterDescription)
        );
    }

    #[tokio::test]
    async fn advisory_keeps_previous_result() {
        let gate = GenerationGate::new(FakeSession::new(true), ScriptedGenerator::ok("old"));
        gate.submit("first").await;
        let before = gate.state();

        gate.submit("  ").await;
        assert_eq!(gate.state(), before);
    }

    #[tokio::test]
    async fn transport_failure_is_network_error() {
        let generator = ScriptedGenerator::err(CompletionError::Transport {
            message: "connection refused".to_string(),
        });
        let gate = GenerationGate::new(FakeSession::new(true), generator);

        gate.submit("Build a todo list").await;
        assert_eq!(
            gate.state(),
            GenerationState::Failed(ErrorKind::NetworkError, "connection refused".to_string())
        );
    }

    #[tokio::test]
    async fn status_failure_is_service_error() {
        let generator = ScriptedGenerator::err(CompletionError::Status {
            status: 402,
            message: "Insufficient balance".to_string(),
        });
        let gate = GenerationGate::new(FakeSession::new(true), generator);

        gate.submit("x").await;
        assert_eq!(
            gate.state(),
            GenerationState::Failed(ErrorKind::ServiceError, "Insufficient balance".to_string())
        );
    }

    #[tokio::test]
    async fn resubmit_after_failure_starts_fresh() {
        let failing = ScriptedGenerator::err(CompletionError::Transport {
            message: "down".to_string(),
        });
        let gate = GenerationGate::new(FakeSession::new(true), failing.clone());
        gate.submit("x").await;
        assert!(matches!(gate.state(), GenerationState::Failed(..)));

        // Failed からでも再送信でき、アダプタがもう一度呼ばれる
        let outcome = gate.submit("x").await;
        assert!(matches!(
            outcome,
            SubmitOutcome::Settled(GenerationState::Failed(ErrorKind::NetworkError, _))
        ));
        assert_eq!(failing.calls(), 2);
    }

    #[tokio::test]
    async fn repeated_submit_while_generating_is_ignored() {
        let generator = GatedGenerator::new();
        let gate = GenerationGate::new(FakeSession::new(true), generator.clone());

        let background = gate.clone();
        let handle = tokio::spawn(async move { background.submit("Build a todo list").await });

        generator.started.notified().await;
        assert_eq!(gate.state(), GenerationState::Generating);

        assert_eq!(gate.submit("again").await, SubmitOutcome::Ignored);
        assert_eq!(gate.submit("and again").await, SubmitOutcome::Ignored);

        generator.release.notify_one();
        let outcome = handle.await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Settled(GenerationState::Succeeded(_))));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn result_after_shutdown_is_discarded() {
        let generator = GatedGenerator::new();
        let gate = GenerationGate::new(FakeSession::new(true), generator.clone());

        let background = gate.clone();
        let handle = tokio::spawn(async move { background.submit("x").await });
        generator.started.notified().await;

        gate.shutdown();
        generator.release.notify_one();

        assert_eq!(handle.await.unwrap(), SubmitOutcome::Discarded);
        assert_eq!(gate.state(), GenerationState::Generating);
    }

    #[tokio::test]
    async fn submit_after_shutdown_is_ignored() {
        let generator = ScriptedGenerator::ok("x");
        let gate = GenerationGate::new(FakeSession::new(true), generator.clone());
        gate.shutdown();

        assert_eq!(gate.submit("x").await, SubmitOutcome::Ignored);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn select_suggestion_seeds_draft_without_submitting() {
        let generator = ScriptedGenerator::ok("x");
        let gate = GenerationGate::new(FakeSession::new(true), generator.clone());

        gate.select_suggestion("Pomodoro timer");

        assert_eq!(gate.take_draft().as_deref(), Some("Pomodoro timer"));
        assert_eq!(gate.take_draft(), None);
        assert_eq!(gate.state(), GenerationState::Idle);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn sign_in_through_provider_unlocks_submit() {
        let session = FakeSession::new(false);
        let generator = ScriptedGenerator::ok("x");
        let gate = GenerationGate::new(session.clone(), generator.clone());

        assert_eq!(
            gate.submit("X").await,
            SubmitOutcome::Advisory(Advisory::SignInRequired)
        );
        session.sign_in().await.unwrap();
        assert!(matches!(gate.submit("X").await, SubmitOutcome::Settled(_)));
        assert_eq!(generator.calls(), 1);
    }
}
