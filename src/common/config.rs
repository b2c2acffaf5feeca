// src/common/config.rs
//! Environment-driven service configuration

use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use tracing::warn;

const DEFAULT_SESSION_SECRET: &str = "replace_with_strong_session_secret";
const DEFAULT_ADMIN_EMAIL: &str = "admin@adventz.com";
const DEFAULT_ADMIN_PASSWORD: &str = "12345";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub admin_email: String,
    pub admin_password: String,
    pub allowed_extensions: HashSet<String>,
    pub max_upload_bytes: usize,
    pub cors_origins: Vec<String>,
    pub host: String,
    pub port: u16,
    pub reset_db: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let session_secret = env::var("SESSION_SECRET")
            .or_else(|_| env::var("JWT_SECRET"))
            .unwrap_or_else(|_| DEFAULT_SESSION_SECRET.to_string());

        let allowed_extensions = parse_extensions(
            &env::var("ALLOWED_RESUME_EXTENSIONS").unwrap_or_else(|_| "pdf,doc,docx".to_string()),
        );

        let max_upload_mb = env::var("MAX_UPLOAD_MB")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(16);

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://recruitment.db".to_string()),
            upload_dir: PathBuf::from(
                env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            ),
            session_secret,
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|h| *h > 0)
                .unwrap_or(12),
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string())
                .trim()
                .to_lowercase(),
            admin_password: env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string()),
            allowed_extensions,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            cors_origins,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(5000),
            reset_db: env::var("RESET_DB")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                == "true",
        }
    }

    /// Logs a warning for every setting still on its insecure built-in default
    pub fn warn_insecure_defaults(&self) {
        if self.session_secret == DEFAULT_SESSION_SECRET {
            warn!("SESSION_SECRET not set - using the built-in development secret");
        }
        if self.admin_password == DEFAULT_ADMIN_PASSWORD {
            warn!("ADMIN_PASSWORD not set - the default admin account uses the built-in password");
        }
    }

    /// Comma-separated list of allowed resume extensions, sorted for messages
    pub fn allowed_extensions_display(&self) -> String {
        let mut exts: Vec<&str> = self.allowed_extensions.iter().map(String::as_str).collect();
        exts.sort_unstable();
        exts.join(", ")
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_extensions(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
impl AppConfig {
    /// Configuration for in-memory tests, rooted at the given upload directory
    pub fn for_tests(upload_dir: PathBuf) -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            upload_dir,
            session_secret: "test_session_secret".to_string(),
            session_ttl_hours: 1,
            admin_email: "admin@example.com".to_string(),
            admin_password: "admin-pass".to_string(),
            allowed_extensions: parse_extensions("pdf,doc,docx"),
            max_upload_bytes: 1024 * 1024,
            cors_origins: vec!["*".to_string()],
            host: "127.0.0.1".to_string(),
            port: 0,
            reset_db: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extensions_normalizes_entries() {
        let exts = parse_extensions(" PDF, .docx ,,doc");
        assert_eq!(exts.len(), 3);
        assert!(exts.contains("pdf"));
        assert!(exts.contains("docx"));
        assert!(exts.contains("doc"));
    }

    #[test]
    fn test_allowed_extensions_display_is_sorted() {
        let config = AppConfig::for_tests(PathBuf::from("/tmp"));
        assert_eq!(config.allowed_extensions_display(), "doc, docx, pdf");
    }

    #[test]
    fn test_any_origin_detection() {
        let mut config = AppConfig::for_tests(PathBuf::from("/tmp"));
        assert!(config.allows_any_origin());
        config.cors_origins = vec!["http://localhost:3000".to_string()];
        assert!(!config.allows_any_origin());
        config.cors_origins.clear();
        assert!(config.allows_any_origin());
    }
}
