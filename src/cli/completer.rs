//! コマンド補完: Tab キーでスラッシュコマンドと候補番号を補完
//!
//! - 先頭トークンが `/` で始まる: スラッシュコマンド名（説明付き）
//! - `/suggest ` の後: 候補番号（候補テキストを説明に表示）
//! - それ以外（アプリの説明文）: 補完しない

use reedline::{Completer, Span, Suggestion};

use super::banner::SUGGESTIONS;
use crate::shell::COMMANDS;

/// Deep Coder 用の補完エンジン
pub struct CoderCompleter;

impl CoderCompleter {
    fn suggestion(value: String, description: &str, span: Span) -> Suggestion {
        Suggestion {
            value,
            description: Some(description.to_string()),
            style: None,
            extra: None,
            span,
            append_whitespace: true,
            match_indices: None,
        }
    }

    /// コマンド名補完（先頭トークン）
    fn complete_command(&self, partial: &str, span: Span) -> Vec<Suggestion> {
        COMMANDS
            .iter()
            .filter(|(name, _)| name.starts_with(partial))
            .map(|(name, desc)| Self::suggestion((*name).to_string(), desc, span))
            .collect()
    }

    /// `/suggest` の引数補完
    fn complete_suggestion_index(&self, partial: &str, span: Span) -> Vec<Suggestion> {
        SUGGESTIONS
            .iter()
            .enumerate()
            .map(|(i, text)| ((i + 1).to_string(), text))
            .filter(|(index, _)| index.starts_with(partial))
            .map(|(index, text)| Self::suggestion(index, text, span))
            .collect()
    }

    /// カーソルより前の文字列から、補完対象トークンの開始位置を返す。
    fn token_start(line: &str, pos: usize) -> usize {
        let before = &line[..pos];
        before.rfind(' ').map(|i| i + 1).unwrap_or(0)
    }
}

impl Completer for CoderCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let start = Self::token_start(line, pos);
        let partial = &line[start..pos];
        let span = Span::new(start, pos);

        if start == 0 {
            if partial.starts_with('/') {
                return self.complete_command(partial, span);
            }
            return vec![];
        }

        let first = line[..start].trim();
        if first == "/suggest" {
            self.complete_suggestion_index(partial, span)
        } else {
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(suggestions: Vec<Suggestion>) -> Vec<String> {
        suggestions.into_iter().map(|s| s.value).collect()
    }

    #[test]
    fn completes_slash_commands() {
        let mut completer = CoderCompleter;
        let got = values(completer.complete("/lo", 3));
        assert!(got.contains(&"/login".to_string()));
        assert!(got.contains(&"/logout".to_string()));
        assert!(!got.contains(&"/faq".to_string()));
    }

    #[test]
    fn plain_text_is_not_completed() {
        let mut completer = CoderCompleter;
        assert!(completer.complete("Build a to", 10).is_empty());
    }

    #[test]
    fn completes_suggestion_indices() {
        let mut completer = CoderCompleter;
        let got = values(completer.complete("/suggest ", 9));
        assert_eq!(got.len(), SUGGESTIONS.len());
        assert_eq!(got[0], "1");
    }
}
