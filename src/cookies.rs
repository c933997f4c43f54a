use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// One browser cookie as persisted to the session file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub expires: f64,
    #[serde(rename = "httpOnly")]
    pub http_only: bool,
    pub secure: bool,
}

#[derive(Debug)]
pub enum CookieError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for CookieError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CookieError::Io(err) => write!(f, "cookie file I/O error: {}", err),
            CookieError::Json(err) => write!(f, "cookie file JSON error: {}", err),
        }
    }
}

impl Error for CookieError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CookieError::Io(err) => Some(err),
            CookieError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CookieError {
    fn from(value: std::io::Error) -> Self {
        CookieError::Io(value)
    }
}

impl From<serde_json::Error> for CookieError {
    fn from(value: serde_json::Error) -> Self {
        CookieError::Json(value)
    }
}

pub fn load(path: &Path) -> Result<Vec<SessionCookie>, CookieError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

pub fn save(path: &Path, cookies: &[SessionCookie]) -> Result<(), CookieError> {
    let mut text = serde_json::to_string_pretty(cookies)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load, save, SessionCookie};

    fn workspace_file(name: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock should be after the epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("kousu-cookies-{}-{nanos}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir.join(name)
    }

    #[test]
    fn round_trips_cookie_files() {
        let path = workspace_file("cookies.json");
        let cookies = vec![SessionCookie {
            name: "JSESSIONID".to_string(),
            value: "abc123".to_string(),
            domain: "example.com".to_string(),
            path: "/maeyes".to_string(),
            expires: -1.0,
            http_only: true,
            secure: true,
        }];
        save(&path, &cookies).expect("save should succeed");
        let loaded = load(&path).expect("load should succeed");
        assert_eq!(loaded, cookies);
        let _ = std::fs::remove_dir_all(path.parent().expect("file should have a parent"));
    }

    #[test]
    fn load_reports_missing_file() {
        let path = workspace_file("absent.json");
        assert!(matches!(load(&path), Err(super::CookieError::Io(_))));
    }
}
