use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::shared::constants::{DEFAULT_ORGANIZATION, MAX_EMAIL_SIZE};

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub swagger: SwaggerConfig,
    pub mail: MailConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Outbound SMTP configuration.
///
/// Built once at startup and injected into the mail transport; credentials are
/// never read from anywhere else.
#[derive(Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_name: String,
    pub from_address: String,
    pub recipient: String,
    pub send_timeout: Duration,
}

/// Rendering and packaging settings for shift reports
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Optional logo embedded at the top of the first page
    pub logo_path: PathBuf,
    /// Organization line printed in the document header
    pub organization: String,
    /// Largest archive (in bytes) accepted for email delivery
    pub max_archive_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            mail: MailConfig::from_env()?,
            report: ReportConfig::from_env()?,
        })
    }
}

impl AppConfig {
    // Attachments are capped by the archive ceiling; leave room for multipart overhead
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 64 * 1024 * 1024;

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Shift Report Service API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Shift report submission and delivery".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl MailConfig {
    const DEFAULT_SMTP_PORT: u16 = 587;
    const DEFAULT_SEND_TIMEOUT_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, String> {
        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| Self::DEFAULT_SMTP_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| "SMTP_PORT must be a valid port number".to_string())?;

        let smtp_username = env::var("SMTP_USERNAME")
            .map_err(|_| "SMTP_USERNAME environment variable is required".to_string())?;

        let smtp_password = env::var("SMTP_PASSWORD")
            .map_err(|_| "SMTP_PASSWORD environment variable is required".to_string())?;

        let from_name =
            env::var("MAIL_FROM_NAME").unwrap_or_else(|_| "RELATÓRIO AUTOMÁTICO".to_string());

        // Sender address defaults to the authenticated account
        let from_address = env::var("MAIL_FROM_ADDRESS")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| smtp_username.clone());

        let recipient = env::var("MAIL_RECIPIENT")
            .map_err(|_| "MAIL_RECIPIENT environment variable is required".to_string())?;

        let send_timeout_secs = env::var("MAIL_SEND_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_SEND_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "MAIL_SEND_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            from_name,
            from_address,
            recipient,
            send_timeout: Duration::from_secs(send_timeout_secs),
        })
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"***")
            .field("from_name", &self.from_name)
            .field("from_address", &self.from_address)
            .field("recipient", &self.recipient)
            .field("send_timeout", &self.send_timeout)
            .finish()
    }
}

impl ReportConfig {
    pub fn from_env() -> Result<Self, String> {
        let logo_path = env::var("REPORT_LOGO_PATH")
            .unwrap_or_else(|_| "assets/logo.jpg".to_string())
            .into();

        let organization =
            env::var("REPORT_ORGANIZATION").unwrap_or_else(|_| DEFAULT_ORGANIZATION.to_string());

        let max_archive_size = env::var("MAX_ARCHIVE_SIZE")
            .unwrap_or_else(|_| MAX_EMAIL_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_ARCHIVE_SIZE must be a valid number".to_string())?;

        Ok(Self {
            logo_path,
            organization,
            max_archive_size,
        })
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            logo_path: PathBuf::from("assets/logo.jpg"),
            organization: DEFAULT_ORGANIZATION.to_string(),
            max_archive_size: MAX_EMAIL_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mail_config_debug_redacts_password() {
        let config = MailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "reports@example.com".to_string(),
            smtp_password: "app-password".to_string(),
            from_name: "RELATÓRIO AUTOMÁTICO".to_string(),
            from_address: "reports@example.com".to_string(),
            recipient: "chief@example.com".to_string(),
            send_timeout: Duration::from_secs(30),
        };

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("app-password"));
        assert!(rendered.contains("smtp.example.com"));
    }

    #[test]
    fn test_report_config_default_ceiling() {
        let config = ReportConfig::default();
        assert_eq!(config.max_archive_size, 25 * 1024 * 1024);
    }
}
