// ── Session token storage ──
//
// Client-side home of the opaque session token. Presence of a token only
// means "optimistically logged in"; the device decides whether it is
// still valid.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

/// Where the session token lives between calls.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<SecretString>;
    fn save(&self, token: &SecretString) -> std::io::Result<()>;
    fn clear(&self) -> std::io::Result<()>;
}

/// Process-local token, gone when the process exits.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: ArcSwapOption<SecretString>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: SecretString) -> Self {
        Self {
            token: ArcSwapOption::from_pointee(token),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<SecretString> {
        self.token.load_full().map(|t| SecretString::clone(&t))
    }

    fn save(&self, token: &SecretString) -> std::io::Result<()> {
        self.token.store(Some(Arc::new(token.clone())));
        Ok(())
    }

    fn clear(&self) -> std::io::Result<()> {
        self.token.store(None);
        Ok(())
    }
}

/// Token persisted to a file so consecutive CLI invocations share a
/// session. The file is created owner-only on Unix.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<SecretString> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| SecretString::from(token.to_owned()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "cannot read session token");
                None
            }
        }
    }

    fn save(&self, token: &SecretString) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        // `mode` only applies on creation; tighten a file left by an
        // older run.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(token.expose_secret().as_bytes())?;

        debug!(path = %self.path.display(), "session token saved");
        Ok(())
    }

    fn clear(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
