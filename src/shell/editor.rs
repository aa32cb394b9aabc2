//! reedline エディタの構築
//!
//! 補完メニュー、キーバインディング、オートサジェストを設定した
//! reedline エディタを構築する。履歴はセッション内のメモリだけに持つ。

use nu_ansi_term::{Color, Style};
use reedline::{
    default_emacs_keybindings, ColumnarMenu, DefaultHinter, Emacs, KeyCode, KeyModifiers,
    MenuBuilder, Reedline, ReedlineEvent, ReedlineMenu,
};

use crate::cli::completer::CoderCompleter;

pub fn build_editor() -> Reedline {
    let completion_menu = Box::new(ColumnarMenu::default().with_name("completion_menu"));

    // Fish ライクなオートサジェスト（セッション内の入力履歴から）
    let hinter = Box::new(
        DefaultHinter::default()
            .with_style(Style::new().fg(Color::DarkGray))
            .with_min_chars(2),
    );

    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );

    Reedline::create()
        .with_hinter(hinter)
        .with_completer(Box::new(CoderCompleter))
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_edit_mode(Box::new(Emacs::new(keybindings)))
}
