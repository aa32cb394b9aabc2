//! スラッシュコマンド
//!
//! `/login` `/suggest 2` のように `/` で始まる入力を処理する。
//! 引数を取るコマンドは clap の `try_parse_from` で解析する。

use clap::Parser;
use tracing::{debug, info};

use crate::cli::banner::{format_suggestions, SUGGESTIONS};
use crate::cli::coder::{coder_talk, print_state};
use crate::cli::palette::Tone;
use crate::cli::faq::print_faq;
use crate::cli::sidebar::print_sidebar;

use super::Shell;

/// コマンド名と説明（`/help` と Tab 補完で使う）
pub const COMMANDS: &[(&str, &str)] = &[
    ("/exit", "Leave Deep Coder"),
    ("/faq", "Frequently asked questions"),
    ("/help", "Show this list"),
    ("/login", "Sign in with GitHub (signs out when already signed in)"),
    ("/logout", "Sign out"),
    ("/status", "Show the latest generation result"),
    ("/suggest", "List app ideas, or put idea N into the prompt"),
    ("/whoami", "Show who is signed in"),
];

/// List app ideas, or put one into the prompt
#[derive(Parser, Debug)]
#[command(name = "/suggest")]
struct SuggestArgs {
    /// Idea number (1-based) to put into the prompt
    index: Option<usize>,
}

/// clap の `try_parse_from` を使って引数をパースする共通ヘルパー。
///
/// - パース成功 → `Some(T)`
/// - `--help` → stdout に出力し `None`
/// - 引数エラー → stderr に出力し `None`
fn parse_args<T: Parser>(cmd: &str, args: &[&str]) -> Option<T> {
    match T::try_parse_from(std::iter::once(cmd).chain(args.iter().copied())) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            let msg = e.to_string();
            if e.use_stderr() {
                eprint!("{msg}");
            } else {
                print!("{msg}");
            }
            None
        }
    }
}

fn format_help() -> String {
    let width = COMMANDS.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let mut text = String::from("Describe the app you want and press Enter, or use a command:\n");
    for (name, desc) in COMMANDS {
        let padded = format!("{name:<width$}");
        text.push_str(&format!(
            "  {}  {}\n",
            Tone::Accent.paint(&padded),
            Tone::Body.paint(desc)
        ));
    }
    text
}

/// `/suggest N` の番号を候補テキストに解決する（1 始まり）。
fn resolve_suggestion(index: usize) -> Option<&'static str> {
    index.checked_sub(1).and_then(|i| SUGGESTIONS.get(i)).copied()
}

impl Shell {
    /// スラッシュコマンドを処理する。
    ///
    /// 戻り値: `true` = REPL ループ続行、`false` = 終了
    pub(super) async fn handle_command(&mut self, line: &str) -> bool {
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return true;
        };
        let args: Vec<&str> = tokens.collect();
        debug!(command = %name, args = ?args, "Dispatching slash command");

        match name {
            "/exit" | "/quit" => {
                info!("Exit command received");
                return false;
            }
            "/help" => print!("{}", format_help()),
            "/faq" => print_faq(),
            "/whoami" => print_sidebar(&self.session.current_session()),
            "/login" => self.toggle_auth().await,
            "/logout" => self.sign_out().await,
            "/status" => match self.gate {
                Some(ref gate) => print_state(&gate.state()),
                None => self.explain_disabled(),
            },
            "/suggest" => self.suggest(&args),
            other => eprintln!("deepcoder: unknown command: {other} (try /help)"),
        }
        true
    }

    fn suggest(&self, args: &[&str]) {
        let Some(parsed) = parse_args::<SuggestArgs>("/suggest", args) else {
            return;
        };

        let Some(index) = parsed.index else {
            print!("{}", format_suggestions());
            return;
        };

        let Some(text) = resolve_suggestion(index) else {
            eprintln!(
                "deepcoder: /suggest: no idea numbered {index} (1-{})",
                SUGGESTIONS.len()
            );
            return;
        };

        match self.gate {
            Some(ref gate) => {
                gate.select_suggestion(text);
                coder_talk("Added to the prompt. Edit it or press Enter to generate.");
            }
            None => self.explain_disabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_every_command() {
        let text = format_help();
        for (name, _) in COMMANDS {
            assert!(text.contains(name), "missing {name}");
        }
    }

    #[test]
    fn suggestion_numbers_are_one_based() {
        assert_eq!(resolve_suggestion(1), Some(SUGGESTIONS[0]));
        assert_eq!(resolve_suggestion(SUGGESTIONS.len()), SUGGESTIONS.last().copied());
        assert_eq!(resolve_suggestion(0), None);
        assert_eq!(resolve_suggestion(SUGGESTIONS.len() + 1), None);
    }

    #[test]
    fn suggest_args_accept_optional_index() {
        let args = SuggestArgs::try_parse_from(["/suggest"]).unwrap();
        assert_eq!(args.index, None);
        let args = SuggestArgs::try_parse_from(["/suggest", "3"]).unwrap();
        assert_eq!(args.index, Some(3));
        assert!(SuggestArgs::try_parse_from(["/suggest", "three"]).is_err());
    }

    #[test]
    fn parse_args_rejects_extra_arguments() {
        assert!(parse_args::<SuggestArgs>("/suggest", &["1", "2"]).is_none());
    }
}
