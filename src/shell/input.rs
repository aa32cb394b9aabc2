//! 入力ハンドリング
//!
//! ユーザー入力を受け取り、スラッシュコマンドとアプリの説明文に振り分ける。

use tracing::{debug, info};

use super::Shell;

/// スラッシュコマンドかどうか。説明文の途中の `/` は対象外。
pub(super) fn is_command(line: &str) -> bool {
    line.trim_start().starts_with('/')
}

impl Shell {
    /// ユーザー入力を処理する。
    ///
    /// 戻り値: `true` = REPL ループ続行、`false` = 終了
    pub(super) async fn handle_input(&mut self, line: &str) -> bool {
        info!("\n\n==== USER INPUT RECEIVED, START PROCESS ====");

        if is_command(line) {
            debug!(input = %line.trim(), "Slash command received");
            let keep_going = self.handle_command(line.trim()).await;
            println!();
            return keep_going;
        }

        // 空の入力も Gate に渡す（説明の入力を促す案内が返る）
        debug!(prompt_length = line.len(), "Description received");
        self.route_to_gate(line).await;
        println!();

        info!("\n==== FINISHED PROCESS ====\n\n");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_prefix_is_a_command() {
        assert!(is_command("/login"));
        assert!(is_command("  /suggest 2"));
    }

    #[test]
    fn descriptions_are_not_commands() {
        assert!(!is_command("Build a todo app with add/remove buttons"));
        assert!(!is_command(""));
        assert!(!is_command("   "));
    }
}
