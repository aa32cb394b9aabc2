//! 端末出力の配色
//!
//! 色そのものではなく用途で呼び分ける。

use nu_ansi_term::{Color, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// URL やコマンド名の強調
    Accent,
    /// バナーやコード枠の見出し
    Heading,
    /// セクションのタイトル
    Title,
    /// 本文
    Body,
    /// 補足
    Muted,
    /// 番号や案内
    Highlight,
    Success,
    Error,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Accent => Style::new().fg(Color::Cyan),
            Self::Heading => Color::Cyan.bold(),
            Self::Title => Color::White.bold(),
            Self::Body => Style::new().fg(Color::LightGray),
            Self::Muted => Style::new().fg(Color::DarkGray),
            Self::Highlight => Style::new().fg(Color::Yellow),
            Self::Success => Style::new().fg(Color::LightGreen),
            Self::Error => Style::new().fg(Color::LightRed),
        }
    }

    pub fn paint(self, text: &str) -> String {
        self.style().paint(text).to_string()
    }
}
