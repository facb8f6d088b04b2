use unitdeck_core::SessionGuard;

use crate::ops::ui::print_warning;

/// Session guard for a terminal surface: the navigation-to-login analog is
/// a notice telling the operator how to sign back in. The credential has
/// already been cleared by the time this fires.
pub struct TerminalGuard;

impl SessionGuard for TerminalGuard {
    fn session_expired(&self) {
        println!();
        print_warning("Session expired. Sign in again with 'login <username>'.");
    }
}
