use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use termimad::MadSkin;

use crate::auth::DeviceCode;
use crate::completion::CompletionResult;
use crate::gate::{Advisory, ErrorKind, GenerationState};

use super::palette::Tone;

/// アシスタントが発話するときに使う共通関数。
pub fn coder_talk(message: &str) {
    println!("⚡ {}", Tone::Body.paint(message));
}

/// 閉じてよい通知（サインアウト完了、認証エラーなど）。
pub fn coder_notice(title: &str, detail: Option<&str>) {
    match detail {
        Some(detail) => println!(
            "🔔 {} {}",
            Tone::Body.paint(title),
            Tone::Muted.paint(detail)
        ),
        None => println!("🔔 {}", Tone::Body.paint(title)),
    }
}

pub fn coder_advisory(advisory: Advisory) {
    println!("💡 {}", Tone::Highlight.paint(advisory.message()));
}

/// 生成待ちの間に表示するスピナーを生成・開始する。
/// 呼び出し元で `finish_and_clear()` を呼んで停止すること。
pub fn coder_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("⚡ {spinner} {msg}")
            .expect("Invalid spinner template"),
    );
    spinner.set_message("Generating... (Ctrl-C to stop waiting)");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// GitHub のデバイスコードを案内する。
pub fn coder_device_code(code: &DeviceCode) {
    println!(
        "🔑 Open {} and enter the code {}",
        Tone::Accent.paint(&code.verification_uri),
        Tone::Heading.paint(&code.user_code)
    );
    println!("   {}", Tone::Muted.paint("Waiting for confirmation on GitHub..."));
}

/// 失敗の種類ごとの見出し
fn failure_headline(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NetworkError => "Could not reach the code generator. Check your connection and try again.",
        ErrorKind::ServiceError => "The code generator returned an error.",
        ErrorKind::AuthError => "Authentication error.",
        ErrorKind::ValidationError => "That request could not be sent.",
    }
}

pub fn format_failure(kind: ErrorKind, message: &str) -> String {
    format!(
        "✗ {} {}",
        Tone::Error.paint(failure_headline(kind)),
        Tone::Muted.paint(message)
    )
}

/// 生成結果を表示する。コードはコピーしやすいよう装飾しない。
pub fn print_result(result: &CompletionResult) {
    println!("{}", Tone::Heading.paint("── code ─────────────────────────────"));
    if result.code.is_empty() {
        println!("{}", Tone::Muted.paint("(the model returned no code)"));
    } else {
        println!("{}", result.code);
    }
    println!("{}", Tone::Heading.paint("─────────────────────────────────────"));

    if !result.explanation.is_empty() {
        println!();
        MadSkin::default().print_text(&result.explanation);
    }
}

/// 現在の生成状態を表示する（`/status`）。
pub fn print_state(state: &GenerationState) {
    match state {
        GenerationState::Idle => coder_talk("Nothing generated yet. Describe your app to start."),
        GenerationState::Generating => coder_talk("Still generating, hang tight."),
        GenerationState::Succeeded(result) => print_result(result),
        GenerationState::Failed(kind, message) => println!("{}", format_failure(*kind, message)),
    }
}
