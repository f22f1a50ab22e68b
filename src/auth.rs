use chrono::{DateTime, Utc};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::error::BoardError;
use crate::models::User;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SocialProvider {
    Google,
    Github,
    Linkedin,
}

impl SocialProvider {
    pub fn label(&self) -> &'static str {
        match self {
            SocialProvider::Google => "Google",
            SocialProvider::Github => "GitHub",
            SocialProvider::Linkedin => "LinkedIn",
        }
    }
}

/// Per-field validation messages. A field is valid when its entry is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("name", self.name.as_deref()),
            ("email", self.email.as_deref()),
            ("password", self.password.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, msg)| msg.map(|m| (field, m)))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(field, msg)| format!("{}: {}", field, msg)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl AuthForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();

        if self.mode == AuthMode::SignUp && self.name.trim().is_empty() {
            errors.name = Some("Name is required".to_string());
        }

        if self.email.trim().is_empty() {
            errors.email = Some("Email is required".to_string());
        } else if !EMAIL_RE.is_match(&self.email) {
            errors.email = Some("Invalid email format".to_string());
        }

        if self.password.is_empty() {
            errors.password = Some("Password is required".to_string());
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.password = Some("Password must be at least 6 characters".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Simulated sign-in: any well-formed form succeeds.
    pub fn into_user(self, now: DateTime<Utc>) -> Result<User, BoardError> {
        self.validate().map_err(BoardError::Validation)?;

        let name = if self.name.trim().is_empty() {
            self.email.split('@').next().unwrap_or_default().to_string()
        } else {
            self.name.trim().to_string()
        };

        Ok(User {
            id: now.timestamp_millis(),
            name,
            email: self.email,
            avatar: None,
        })
    }
}

pub fn social_user(provider: SocialProvider, now: DateTime<Utc>) -> User {
    User {
        id: now.timestamp_millis(),
        name: format!("{} User", provider.label()),
        email: format!("user@{}.com", provider.label().to_lowercase()),
        avatar: None,
    }
}
