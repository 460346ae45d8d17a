use serde::Serialize;

pub(crate) mod checkout;
pub(crate) mod config;
pub(crate) mod menu;
pub(crate) mod order;
pub(crate) mod user;

pub(crate) type UserId = i64;
pub(crate) type OrderId = i64;

/// Body of every response that only carries a message
#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Field checks mirroring the storefront's form rules
pub(crate) mod validation {
    pub fn required(field: &str, value: &str, max_chars: usize) -> Result<(), String> {
        let len = value.trim().chars().count();
        if len == 0 {
            return Err(format!("{field} is required"));
        }
        if len > max_chars {
            return Err(format!("{field} must be at most {max_chars} characters"));
        }
        Ok(())
    }

    pub fn email(value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err("email is required".to_string());
        }
        match value.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err("Invalid email".to_string()),
        }
    }

}
