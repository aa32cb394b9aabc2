//! サイドバー相当のアカウント表示（`/whoami`）

use crate::auth::SessionState;

use super::palette::Tone;

pub fn format_sidebar(session: &SessionState) -> String {
    let mut out = format!(
        "{} {}\n",
        Tone::Heading.paint("Kline"),
        Tone::Body.paint("Coder AI")
    );
    match session.user() {
        Some(user) => {
            out.push_str(&format!("  {}\n", Tone::Muted.paint("Signed in as:")));
            out.push_str(&format!("  {}\n", Tone::Body.paint(user.display_name())));
            out.push_str(&format!("  {}\n", Tone::Highlight.paint("/logout to sign out")));
        }
        None => {
            out.push_str(&format!("  {}\n", Tone::Muted.paint("Not signed in.")));
            out.push_str(&format!("  {}\n", Tone::Highlight.paint("/login to connect GitHub")));
        }
    }
    out
}

pub fn print_sidebar(session: &SessionState) {
    print!("{}", format_sidebar(session));
}
