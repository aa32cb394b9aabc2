use chrono::{Local, Timelike};
use rand::Rng;

use super::coder::coder_talk;
use super::palette::Tone;

/// 入力欄に入れられるアプリ案の一覧（`/suggest N` で選ぶ）
pub const SUGGESTIONS: &[&str] = &[
    "A quiz app about world capitals",
    "A SaaS landing page with pricing tiers",
    "A pomodoro timer with a task list",
    "A markdown blog with tags",
    "A flashcard app for learning Japanese",
    "A dashboard comparing time zones",
];

/// 時間帯に応じた挨拶を返す。
///  - 5〜11時:  "Good morning"
///  - 12〜17時: "Good afternoon"
///  - 18〜4時:  "Good evening"
fn time_greeting() -> &'static str {
    match Local::now().hour() {
        5..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

/// 番号付きの候補一覧
pub fn format_suggestions() -> String {
    let mut out = String::new();
    for (i, text) in SUGGESTIONS.iter().enumerate() {
        let number = format!("[{}]", i + 1);
        out.push_str(&format!(
            "  {} {}\n",
            Tone::Highlight.paint(&number),
            Tone::Body.paint(text)
        ));
    }
    out
}

/// 起動時のヒーローバナーを表示する。
pub fn print_hero() {
    let version = env!("CARGO_PKG_VERSION");

    let art_lines: &[&str] = &[
        r#" ____                    ____          _           "#,
        r#"|  _ \  ___  ___ _ __   / ___|___   __| | ___ _ __ "#,
        r#"| | | |/ _ \/ _ \ '_ \ | |   / _ \ / _` |/ _ \ '__|"#,
        r#"| |_| |  __/  __/ |_) || |__| (_) | (_| |  __/ |   "#,
        r#"|____/ \___|\___| .__/  \____\___/ \__,_|\___|_|   "#,
        r#"                |_|                                "#,
    ];

    println!();
    for line in art_lines {
        println!("{}", Tone::Heading.paint(line));
    }
    println!("{}", Tone::Highlight.paint(&format!("  v{version}")));
    println!();
    println!(
        "{}",
        Tone::Body.paint("Let the world's best open source model create a react app for you.")
    );
    println!(
        "{} {} {}",
        Tone::Muted.paint("Responses are saved in the open dataset"),
        Tone::Accent.paint("react-code-instructions"),
        Tone::Muted.paint("· Help us add to it!")
    );
    println!();
    println!("{}", Tone::Muted.paint("Describe your dream react app, or pick one:"));
    print!("{}", format_suggestions());
    println!();
    coder_talk(&format!(
        "{}. Type /help for commands, /login to connect GitHub.",
        time_greeting()
    ));
    println!();
}

/// 終了時のメッセージを表示する。
pub fn print_goodbye() {
    let messages: &[&str] = &[
        "Happy shipping.",
        "See you next build.",
        "Go make something people want.",
        "Your components will miss you.",
    ];

    let idx = rand::rng().random_range(0..messages.len());

    println!();
    coder_talk(messages[idx]);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_greeting_returns_valid_string() {
        let g = time_greeting();
        assert!(
            g == "Good morning" || g == "Good afternoon" || g == "Good evening",
            "unexpected greeting: {g}"
        );
    }

    #[test]
    fn suggestions_are_numbered_from_one() {
        let listing = format_suggestions();
        assert!(listing.contains("[1]"));
        assert!(listing.contains(&format!("[{}]", SUGGESTIONS.len())));
        assert!(!listing.contains("[0]"));
    }
}
