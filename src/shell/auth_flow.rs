//! GitHub サインイン / サインアウト
//!
//! `/login` はサインイン状態を反転するトグル。サインイン待ちの間は
//! Ctrl-C で待機を打ち切れる。

use tracing::{info, warn};

use crate::cli::coder::coder_notice;
use crate::gate::ErrorKind;

use super::Shell;

impl Shell {
    /// サインイン済みならサインアウト、未サインインならサインインする。
    pub(super) async fn toggle_auth(&self) {
        if self.session.current_session().is_signed_in() {
            self.sign_out().await;
        } else {
            self.sign_in().await;
        }
    }

    pub(super) async fn sign_in(&self) -> bool {
        let outcome = tokio::select! {
            outcome = self.session.sign_in() => outcome,
            _ = tokio::signal::ctrl_c() => {
                info!("Sign-in cancelled by Ctrl-C");
                coder_notice("Sign-in cancelled", None);
                return false;
            }
        };

        match outcome {
            Ok(user) => {
                info!(login = %user.login, "Signed in");
                coder_notice("Signed in", Some(&format!("as {}", user.display_name())));
                true
            }
            Err(e) => {
                warn!(kind = %ErrorKind::AuthError, error = %e, "Sign-in failed");
                coder_notice("Authentication error", Some(&e.to_string()));
                false
            }
        }
    }

    pub(super) async fn sign_out(&self) {
        match self.session.sign_out().await {
            Ok(()) => {
                info!("Signed out");
                coder_notice("Signed out successfully", None);
            }
            Err(e) => {
                warn!(kind = %ErrorKind::AuthError, error = %e, "Sign-out failed");
                coder_notice("Authentication error", Some(&e.to_string()));
            }
        }
    }
}
