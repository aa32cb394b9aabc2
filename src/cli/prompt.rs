use std::borrow::Cow;
use std::sync::Arc;

use chrono::Local;
use reedline::{Color, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};

use super::palette::Tone;
use crate::auth::{SessionProvider, SessionState};
use crate::gate::GenerationGate;

/// Deep Coder のプロンプト。
///
/// ```text
/// deepcoder as octocat
/// ❯
/// ```
///
/// 生成中は `⟳ generating` を付ける。
pub struct CoderPrompt {
    session: Arc<dyn SessionProvider>,
    gate: Option<GenerationGate>,
}

impl CoderPrompt {
    pub fn new(session: Arc<dyn SessionProvider>, gate: Option<GenerationGate>) -> Self {
        Self { session, gate }
    }
}

/// 左プロンプトの本体。セッションと生成中かどうかだけで決まる。
fn format_left(session: &SessionState, generating: bool) -> String {
    let who = match session.user() {
        Some(user) => format!("as {}", Tone::Success.paint(&user.login)),
        None => Tone::Muted.paint("(not signed in)"),
    };
    let busy = if generating {
        format!(" {}", Tone::Highlight.paint("⟳ generating"))
    } else {
        String::new()
    };
    format!("{} {who}{busy}\n", Tone::Accent.paint("deepcoder"))
}

impl Prompt for CoderPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        let generating = self
            .gate
            .as_ref()
            .is_some_and(|gate| gate.state().is_generating());
        Cow::Owned(format_left(&self.session.current_session(), generating))
    }

    fn get_prompt_color(&self) -> Color {
        Color::White
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        let now = Local::now().format("%H:%M:%S").to_string();
        Cow::Owned(Tone::Body.paint(&now))
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Owned(Tone::Success.paint("\u{276f} "))
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed(" :: ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "(failed) ",
        };
        Cow::Owned(format!("{prefix}(search: '{}') ", history_search.term))
    }
}
