//! Bearer-token persistence across two mirrored surfaces.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use tracing::debug;

use crate::error::Result;

/// Lifetime of a stored credential. A new login fully replaces the token;
/// it is never refreshed in place.
const COOKIE_MAX_AGE_DAYS: i64 = 30;

/// Cookie value used to clear the mirror: an already-expired date.
const EXPIRED_COOKIE: &str = "token=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT";

/// Holds the current bearer token in a state directory, mirrored onto two
/// surfaces: a durable `token` file (what [`get`](Self::get) reads) and a
/// server-readable `cookie` file carrying a `token=...` cookie string with
/// a 30-day horizon and root path. Both are written and cleared together;
/// the route-guard collaborator only ever consults the cookie, so a
/// half-written pair degrades to "unauthenticated".
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CredentialStore { dir: dir.into() }
    }

    pub fn token_path(&self) -> PathBuf {
        self.dir.join("token")
    }

    pub fn cookie_path(&self) -> PathBuf {
        self.dir.join("cookie")
    }

    /// Write the token to both surfaces. Token contents are not validated
    /// client-side; only the API's response to its use decides validity.
    pub fn set(&self, token: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.token_path(), token)?;
        let expires = Utc::now() + Duration::days(COOKIE_MAX_AGE_DAYS);
        let cookie = format!(
            "token={}; Path=/; Max-Age={}; Expires={}",
            token,
            COOKIE_MAX_AGE_DAYS * 24 * 60 * 60,
            expires.format("%a, %d %b %Y %H:%M:%S GMT"),
        );
        fs::write(self.cookie_path(), cookie)?;
        debug!("credential stored");
        Ok(())
    }

    /// Read the durable surface. Absence of the file is absence of a session.
    pub fn get(&self) -> Option<String> {
        let token = fs::read_to_string(self.token_path()).ok()?;
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    /// Destroy the credential: remove the durable file and expire the cookie
    /// mirror in place.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(self.token_path()) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        if self.dir.exists() {
            fs::write(self.cookie_path(), EXPIRED_COOKIE)?;
        }
        debug!("credential cleared");
        Ok(())
    }
}

/// Whether a stored cookie string still names a live session. This is what
/// the route guard checks; exposed so tests can pin the mirror invariant.
pub fn cookie_is_live(cookie: &str) -> bool {
    let Some(value) = cookie
        .split(';')
        .next()
        .and_then(|pair| pair.trim().strip_prefix("token="))
    else {
        return false;
    };
    if value.is_empty() {
        return false;
    }
    for attr in cookie.split(';').skip(1) {
        if let Some(date) = attr.trim().strip_prefix("Expires=") {
            if let Ok(expires) = chrono::DateTime::parse_from_rfc2822(date) {
                return expires > Utc::now();
            }
        }
    }
    true
}

/// Default state directory under the platform config root.
pub fn default_state_dir(config_root: Option<&Path>) -> PathBuf {
    config_root
        .map(|root| root.join("unitdeck"))
        .unwrap_or_else(|| PathBuf::from(".unitdeck"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn set_writes_both_surfaces() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());

        store.set("tok-123").unwrap();
        assert_eq!(store.get().as_deref(), Some("tok-123"));

        let cookie = fs::read_to_string(store.cookie_path()).unwrap();
        assert!(cookie.starts_with("token=tok-123; Path=/;"));
        assert!(cookie.contains("Max-Age=2592000"));
        assert!(cookie_is_live(&cookie));
    }

    #[test]
    fn clear_removes_token_and_expires_cookie() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());

        store.set("tok-123").unwrap();
        store.clear().unwrap();

        assert_eq!(store.get(), None);
        let cookie = fs::read_to_string(store.cookie_path()).unwrap();
        assert!(cookie.contains("Expires=Thu, 01 Jan 1970"));
        assert!(!cookie_is_live(&cookie));
    }

    #[test]
    fn clear_is_idempotent_without_a_session() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("nested"));
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn new_login_replaces_the_token() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());

        store.set("first").unwrap();
        store.set("second").unwrap();

        assert_eq!(store.get().as_deref(), Some("second"));
        let cookie = fs::read_to_string(store.cookie_path()).unwrap();
        assert!(cookie.starts_with("token=second;"));
    }

    #[test]
    fn blank_token_file_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());
        fs::write(store.token_path(), "  \n").unwrap();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn default_dir_falls_back_to_cwd() {
        let root = PathBuf::from("/home/user/.config");
        assert_eq!(
            default_state_dir(Some(&root)),
            PathBuf::from("/home/user/.config/unitdeck")
        );
        assert_eq!(default_state_dir(None), PathBuf::from(".unitdeck"));
    }
}
