use crate::server::model::validation;
use crate::server::model::UserId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Profile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetProfileResponse {
    pub profile: Profile,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ContactUpdate {
    pub street: String,
    pub city: String,
    pub phone: String,
}

impl ContactUpdate {
    pub fn validate(&self) -> Result<(), String> {
        validation::required("street", &self.street, 20)?;
        validation::required("city", &self.city, 20)?;
        validation::required("phone", &self.phone, 10)
    }

    pub fn trimmed(&self) -> Self {
        Self {
            street: self.street.trim().to_string(),
            city: self.city.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), String> {
        validation::required("username", &self.username, 10)?;
        validation::email(&self.email)?;
        validation::required("street", &self.street, 20)?;
        validation::required("city", &self.city, 20)?;
        validation::required("phone", &self.phone, 10)?;
        if self.password.chars().count() < 3 {
            return Err("Password must have min 3 characters".to_string());
        }
        if self.confirm_password.is_empty() {
            return Err("Password confirmation is required".to_string());
        }
        Ok(())
    }
}

/// A user ready to be inserted, password already hashed
#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub street: String,
    pub city: String,
    pub phone: String,
}
