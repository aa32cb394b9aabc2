//! 生成リクエストのルーティング
//!
//! アプリの説明文を Generation Gate に渡し、結果を表示する。
//! 送信はタスクとして起動するので、Ctrl-C で待つのをやめても
//! リクエスト自体は走り続け、結果は Gate の状態に残る。

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cli::coder::{coder_advisory, coder_spinner, coder_talk, print_state};
use crate::config::DeepCoderConfig;
use crate::gate::{GenerationState, SubmitOutcome};

use super::Shell;

/// 完了したタスクだけを取り出す。未完了のものは `tasks` に残る。
pub(super) fn take_finished<T>(tasks: &mut Vec<JoinHandle<T>>) -> Vec<JoinHandle<T>> {
    let (finished, pending): (Vec<_>, Vec<_>) = std::mem::take(tasks)
        .into_iter()
        .partition(JoinHandle::is_finished);
    *tasks = pending;
    finished
}

/// `submit` の結果を表示する。
pub(super) fn render_outcome(outcome: SubmitOutcome) {
    match outcome {
        SubmitOutcome::Advisory(advisory) => {
            debug!(kind = %advisory.kind(), ?advisory, "Submit rejected before generation");
            coder_advisory(advisory)
        }
        SubmitOutcome::Ignored => {
            coder_talk("Still working on your previous request. Check /status in a moment.")
        }
        SubmitOutcome::Settled(state) => print_state(&state),
        SubmitOutcome::Discarded => debug!("Outcome discarded after shutdown"),
    }
}

impl Shell {
    /// 説明文を Gate に送信し、完了を待って結果を表示する。
    pub(super) async fn route_to_gate(&mut self, line: &str) {
        let Some(gate) = self.gate.clone() else {
            self.explain_disabled();
            return;
        };

        // 待っている間に終わった前回の結果を先に出す
        self.report_detached().await;

        let prompt = line.to_string();
        let mut task = tokio::spawn(async move { gate.submit(&prompt).await });

        let spinner = coder_spinner();
        let joined = tokio::select! {
            joined = &mut task => joined,
            _ = tokio::signal::ctrl_c() => {
                spinner.finish_and_clear();
                info!("Ctrl-C while generating, detaching from the request");
                coder_talk("Stopped waiting. The request keeps running; /status shows the result.");
                self.detached.push(task);
                return;
            }
        };
        spinner.finish_and_clear();

        match joined {
            Ok(outcome) => render_outcome(outcome),
            Err(e) => {
                warn!(error = %e, "Generation task failed to complete");
                eprintln!("deepcoder: error: generation task failed: {e}");
            }
        }
    }

    /// 待つのをやめた生成が終わっていれば結果を表示する。
    pub(super) async fn report_detached(&mut self) {
        for task in take_finished(&mut self.detached) {
            match task.await {
                Ok(outcome @ SubmitOutcome::Settled(_)) => {
                    coder_talk("Your earlier request has finished:");
                    render_outcome(outcome);
                    println!();
                }
                Ok(outcome) => render_outcome(outcome),
                Err(e) => warn!(error = %e, "Detached generation task failed to complete"),
            }
        }
    }

    /// 生成機能が無効な理由を案内する。
    pub(super) fn explain_disabled(&self) {
        let reason = self.disabled_reason.as_deref().unwrap_or("no API key");
        coder_talk(&format!(
            "Code generation is disabled ({reason}). Set the API key in your environment or .env and restart."
        ));
        debug!(
            config = %DeepCoderConfig::config_path().display(),
            "Generation requested while disabled"
        );
    }

    /// 一度だけ生成して終了する（`--prompt`）。
    ///
    /// 戻り値: 終了コード（成功 0、生成失敗 1、案内 2）
    pub async fn run_once(&mut self, prompt: &str, login: bool) -> i32 {
        let Some(gate) = self.gate.clone() else {
            self.explain_disabled();
            return 1;
        };

        if login && !self.session.current_session().is_signed_in() && !self.sign_in().await {
            return 1;
        }

        let spinner = coder_spinner();
        let outcome = gate.submit(prompt).await;
        spinner.finish_and_clear();
        gate.shutdown();

        let code = match &outcome {
            SubmitOutcome::Settled(GenerationState::Succeeded(_)) => 0,
            SubmitOutcome::Advisory(_) => 2,
            _ => 1,
        };
        render_outcome(outcome);
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn take_finished_keeps_running_tasks() {
        let done = tokio::spawn(async { 1 });
        let (release, gate) = oneshot::channel::<()>();
        let running = tokio::spawn(async move {
            let _ = gate.await;
            2
        });
        while !done.is_finished() {
            tokio::task::yield_now().await;
        }

        let mut tasks = vec![done, running];
        let finished = take_finished(&mut tasks);

        assert_eq!(finished.len(), 1);
        assert_eq!(tasks.len(), 1);
        for task in finished {
            assert_eq!(task.await.unwrap(), 1);
        }

        release.send(()).unwrap();
        let rest = tasks.pop().unwrap();
        assert_eq!(rest.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn second_detached_task_does_not_replace_the_first() {
        let mut tasks = vec![tokio::spawn(async { "first" })];
        tasks.push(tokio::spawn(async { "second" }));
        while !tasks.iter().all(JoinHandle::is_finished) {
            tokio::task::yield_now().await;
        }

        let mut results = Vec::new();
        for task in take_finished(&mut tasks) {
            results.push(task.await.unwrap());
        }

        assert!(tasks.is_empty());
        assert_eq!(results, vec!["first", "second"]);
    }
}
