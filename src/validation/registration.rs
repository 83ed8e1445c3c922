use crate::models::user::RegistrationRequest;
use thiserror::Error;

pub const NAME_MIN_LEN: usize = 1;
pub const NAME_MAX_LEN: usize = 100;
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 100;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be at least {min} characters, got {actual}")]
    TooShort {
        field: &'static str,
        min: usize,
        actual: usize,
    },

    #[error("{field} must be at most {max} characters, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("Invalid request body: {0}")]
    MalformedBody(String),
}

/// A registration request whose fields passed the length rules.
///
/// Only obtainable through `RegistrationRequest::validate`, so stores never
/// see unchecked input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRegistration {
    first_name: String,
    last_name: String,
    username: String,
    password: String,
}

impl ValidatedRegistration {
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl RegistrationRequest {
    pub fn validate(self) -> Result<ValidatedRegistration, ValidationError> {
        check_length("first_name", &self.first_name, NAME_MIN_LEN, NAME_MAX_LEN)?;
        check_length("last_name", &self.last_name, NAME_MIN_LEN, NAME_MAX_LEN)?;
        check_length("username", &self.username, USERNAME_MIN_LEN, USERNAME_MAX_LEN)?;
        check_length("password", &self.password, PASSWORD_MIN_LEN, PASSWORD_MAX_LEN)?;

        Ok(ValidatedRegistration {
            first_name: self.first_name,
            last_name: self.last_name,
            username: self.username,
            password: self.password,
        })
    }
}

// Lengths count characters, not bytes
fn check_length(field: &'static str, value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();

    if actual < min {
        return Err(ValidationError::TooShort { field, min, actual });
    }

    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }

    Ok(())
}
