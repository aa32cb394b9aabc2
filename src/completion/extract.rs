//! 応答テキストからのコードブロック抽出
//!
//! 単一の正規表現で最初のフェンス付きコードブロックだけを取り出す。
//! 入れ子のフェンスや許可リスト外の言語タグには対応しない（互換性のため現状維持）。

use std::sync::OnceLock;

use regex::Regex;

use super::CompletionResult;

/// 言語タグは許可リストのいずれか、または省略。タグ直後の改行は必須。
const CODE_BLOCK_PATTERN: &str = r"```(?:jsx|tsx|javascript|typescript)?\n([\s\S]*?)```";

fn code_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CODE_BLOCK_PATTERN).expect("invalid code block pattern"))
}

/// 応答テキストを `code` と `explanation` に分割する。
///
/// - コードブロックあり → `code` は最初のブロックの中身（trim 済み）、
///   `explanation` はそのブロックを取り除いた残り（trim 済み）
/// - コードブロックなし → `code` は全文（trim 済み）、`explanation` は空
pub fn split_code_block(content: &str) -> CompletionResult {
    let re = code_block_regex();
    match re.captures(content) {
        Some(caps) => {
            let code = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
            // Regex::replace は最初の一致だけを置換する
            let explanation = re.replace(content, "").trim().to_string();
            CompletionResult { code, explanation }
        }
        None => CompletionResult {
            code: content.trim().to_string(),
            explanation: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_tagged_block_and_explanation() {
        let result = split_code_block("Here:\n```tsx\nconst X=1;\n```\nDone.");
        assert_eq!(result.code, "const X=1;");
        assert_eq!(result.explanation, "Here:\n\nDone.");
    }

    #[test]
    fn extracts_untagged_block() {
        let result = split_code_block("```\nfn main() {}\n```");
        assert_eq!(result.code, "fn main() {}");
        assert_eq!(result.explanation, "");
    }

    #[test]
    fn only_first_block_is_taken() {
        let content = "A\n```jsx\nfirst();\n```\nB\n```jsx\nsecond();\n```\nC";
        let result = split_code_block(content);
        assert_eq!(result.code, "first();");
        // 2 つ目のブロックは説明文側に残る
        assert!(result.explanation.contains("second();"));
        assert!(!result.explanation.contains("first();"));
    }

    #[test]
    fn no_block_falls_back_to_whole_text() {
        let result = split_code_block("  just some prose\n");
        assert_eq!(result.code, "just some prose");
        assert!(result.explanation.is_empty());
    }

    #[test]
    fn empty_content_yields_empty_code() {
        let result = split_code_block("");
        assert_eq!(result, CompletionResult::default());
    }

    #[test]
    fn multiline_block_is_preserved() {
        let content = "```typescript\nconst a = 1;\n\nconst b = 2;\n```";
        let result = split_code_block(content);
        assert_eq!(result.code, "const a = 1;\n\nconst b = 2;");
    }

    #[test]
    fn tag_outside_allow_list_does_not_match_at_that_fence() {
        // ```python\n はタグ部分で一致せず、フェンスが 1 組しかないのでブロックなし扱い
        let content = "```python\nprint(1)\n```";
        let result = split_code_block(content);
        assert_eq!(result.code, content);
        assert!(result.explanation.is_empty());
    }
}
