use std::env;
use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use subtle::ConstantTimeEq;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_KEY_PREFIX: &str = "employee_profiles";
const DEFAULT_MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Empty(&'static str),
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Empty(key) => write!(f, "{} cannot be empty", key),
            ConfigError::Invalid(key, msg) => write!(f, "{} is invalid: {}", key, msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub enum AdminSecret {
    Plain(String),
    Argon2Hash(String),
}

/// The single admin identity allowed to log in.
#[derive(Clone)]
pub struct AdminCredentials {
    email: String,
    secret: AdminSecret,
}

impl AdminCredentials {
    pub fn new(email: impl Into<String>, secret: AdminSecret) -> Self {
        Self {
            email: email.into(),
            secret,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Both halves are always checked so a wrong email and a wrong password
    /// take the same path.
    pub fn verify(&self, email: &str, password: &str) -> bool {
        let email_ok: bool = self.email.as_bytes().ct_eq(email.as_bytes()).into();
        let password_ok = match &self.secret {
            AdminSecret::Plain(expected) => expected.as_bytes().ct_eq(password.as_bytes()).into(),
            AdminSecret::Argon2Hash(phc) => match PasswordHash::new(phc) {
                Ok(parsed) => Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok(),
                Err(err) => {
                    log::error!("ADMIN_PASSWORD_HASH is not a valid PHC string: {}", err);
                    false
                }
            },
        };
        email_ok & password_ok
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub bucket: String,
    pub region: Option<String>,
    pub public_base_url: String,
    pub key_prefix: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub admin: AdminCredentials,
    pub media: MediaConfig,
    pub max_image_bytes: usize,
}

impl fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminSecret::Plain(_) => f.write_str("Plain(..)"),
            AdminSecret::Argon2Hash(_) => f.write_str("Argon2Hash(..)"),
        }
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    let value = env::var(key).map_err(|_| ConfigError::Missing(key))?;
    if value.trim().is_empty() {
        return Err(ConfigError::Empty(key));
    }
    Ok(value)
}

fn optional(key: &'static str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match optional(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err: T::Err| ConfigError::Invalid(key, err.to_string())),
        None => Ok(default),
    }
}

impl Config {
    /// Reads the process environment. Call `dotenv()` first to pick up a
    /// `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = match (optional("ADMIN_PASSWORD_HASH"), optional("ADMIN_PASSWORD")) {
            (Some(hash), _) => {
                PasswordHash::new(&hash)
                    .map_err(|err| ConfigError::Invalid("ADMIN_PASSWORD_HASH", err.to_string()))?;
                AdminSecret::Argon2Hash(hash)
            }
            (None, Some(password)) => AdminSecret::Plain(password),
            (None, None) => return Err(ConfigError::Missing("ADMIN_PASSWORD")),
        };

        let bucket = required("AWS_S3_BUCKET")?;
        let public_base_url = match optional("MEDIA_PUBLIC_BASE_URL") {
            Some(raw) => {
                url::Url::parse(&raw)
                    .map_err(|err| ConfigError::Invalid("MEDIA_PUBLIC_BASE_URL", err.to_string()))?;
                raw.trim_end_matches('/').to_string()
            }
            None => format!("https://{}.s3.amazonaws.com", bucket),
        };

        Ok(Config {
            host: optional("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parsed("PORT", DEFAULT_PORT)?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            admin: AdminCredentials::new(required("ADMIN_EMAIL")?, secret),
            media: MediaConfig {
                bucket,
                region: optional("AWS_REGION"),
                public_base_url,
                key_prefix: optional("MEDIA_KEY_PREFIX")
                    .unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string()),
            },
            max_image_bytes: parsed("MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
        })
    }
}
