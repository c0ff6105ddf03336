use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ClientError;

/// Backend location plus the admin token, if logged in.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub backend_url: String,
    pub token: Option<String>,
}

impl Session {
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            token: None,
        }
    }

    pub fn token(&self) -> Result<&str, ClientError> {
        self.token.as_deref().ok_or(ClientError::NotLoggedIn)
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }
}

/// Where the session survives between invocations.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.ems-admin-session.json`, or the working directory without a home.
    pub fn default_path() -> PathBuf {
        let dir = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
        dir.join(".ems-admin-session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the saved session. A missing file, or one saved for a different
    /// backend, yields a logged-out session for `backend_url`.
    pub fn load(&self, backend_url: &str) -> Result<Session, ClientError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Session::new(backend_url)),
            Err(err) => return Err(err.into()),
        };
        let session: Session = serde_json::from_str(&raw)?;
        if session.backend_url != backend_url {
            log::debug!(
                "Ignoring session for {}, backend is now {}",
                session.backend_url,
                backend_url
            );
            return Ok(Session::new(backend_url));
        }
        Ok(session)
    }

    pub fn save(&self, session: &Session) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://127.0.0.1:3000";

    #[test]
    fn missing_file_is_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("session.json"));

        let session = file.load(URL).unwrap();
        assert!(!session.is_logged_in());
        assert!(matches!(session.token(), Err(ClientError::NotLoggedIn)));
    }

    #[test]
    fn save_load_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("nested/session.json"));

        let mut session = Session::new(URL);
        session.token = Some("abc.def.ghi".to_string());
        file.save(&session).unwrap();
        assert_eq!(file.load(URL).unwrap(), session);

        // a different backend does not reuse the token
        assert!(!file.load("http://other:3000").unwrap().is_logged_in());

        file.clear().unwrap();
        assert!(!file.path().exists());
        assert!(!file.load(URL).unwrap().is_logged_in());
        file.clear().unwrap();
    }
}
