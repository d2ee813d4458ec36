use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use tracing::warn;

/// Default file the API key is read from, relative to the working directory.
pub const SECRET_FILE: &str = "secrets";

/// API key read from a plaintext file.
///
/// The key is loaded once and never changes afterwards. A missing key is kept as
/// `None` so it can never end up as an empty `key=` query parameter.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    source: PathBuf,
    key: Option<String>,
}

impl Credential {
    /// Read the key from `path`.
    ///
    /// A missing or unreadable file is not an error here: a warning is logged and
    /// the credential stays unset until something actually needs it.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        let key = match fs::read_to_string(path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                if trimmed.is_empty() {
                    warn!(path = %path.display(), "credential file is empty");
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "no credential file found, please create one"
                );
                None
            }
        };

        Self { source: path.to_path_buf(), key }
    }

    /// Build a credential from a key that is already in memory.
    pub fn from_key(key: impl Into<String>) -> Self {
        let key = key.into().trim().to_string();
        Self {
            source: PathBuf::from("<memory>"),
            key: (!key.is_empty()).then_some(key),
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn is_set(&self) -> bool {
        self.key.is_some()
    }

    /// Where the key was (or would have been) read from.
    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("source", &self.source)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
