//! Bearer token session
//!
//! The token is the only state persisted between runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::fmt;
use std::sync::RwLock;

type LogoutHook = Box<dyn Fn() + Send + Sync>;

/// Plain-file token persistence
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token, `None` when absent or blank
    pub fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn write(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, token)
    }

    pub fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Current authentication state shared by every request
pub struct Session {
    token: RwLock<Option<String>>,
    store: TokenStore,
    on_logout: RwLock<Vec<LogoutHook>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("store", &self.store)
            .finish()
    }
}

impl Session {
    /// Session restored from the token file, if any
    pub fn load(store: TokenStore) -> io::Result<Self> {
        let token = store.read()?;
        Ok(Self {
            token: RwLock::new(token),
            store,
            on_logout: RwLock::new(Vec::new()),
        })
    }

    /// Session that starts signed out
    pub fn anonymous(store: TokenStore) -> Self {
        Self {
            token: RwLock::new(None),
            store,
            on_logout: RwLock::new(Vec::new()),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Store a token issued by the backend
    pub fn login(&self, token: &str) -> io::Result<()> {
        let token = token.trim();
        self.store.write(token)?;
        if let Ok(mut current) = self.token.write() {
            *current = Some(token.to_string());
        }
        tracing::info!("Session token stored at {}", self.store.path().display());
        Ok(())
    }

    /// Run `hook` on every logout, explicit or forced by a `401`
    pub fn on_logout(&self, hook: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut hooks) = self.on_logout.write() {
            hooks.push(Box::new(hook));
        }
    }

    /// Forget the token in memory and on disk
    pub fn logout(&self) {
        if let Ok(mut current) = self.token.write() {
            *current = None;
        }
        if let Err(e) = self.store.remove() {
            tracing::warn!("Failed to remove token file {}: {}", self.store.path().display(), e);
        }
        if let Ok(hooks) = self.on_logout.read() {
            for hook in hooks.iter() {
                hook();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_login_persists_and_restores() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nested").join("token"));

        let session = Session::anonymous(store.clone());
        assert!(!session.is_authenticated());
        session.login("  abc123\n").unwrap();
        assert_eq!(session.token().as_deref(), Some("abc123"));

        let restored = Session::load(store).unwrap();
        assert_eq!(restored.token().as_deref(), Some("abc123"));
    }

    #[test]
    fn test_logout_removes_file() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token"));
        let session = Session::anonymous(store.clone());

        session.login("abc").unwrap();
        session.logout();

        assert!(!session.is_authenticated());
        assert!(!store.path().exists());
        // logging out twice is harmless
        session.logout();
    }

    #[test]
    fn test_logout_runs_hooks() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let dir = tempdir().unwrap();
        let session = Session::anonymous(TokenStore::new(dir.path().join("token")));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        session.on_logout(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        session.login("abc").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        session.logout();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_file_means_signed_out() {
        let dir = tempdir().unwrap();
        let session = Session::load(TokenStore::new(dir.path().join("absent"))).unwrap();
        assert!(session.token().is_none());
    }
}
