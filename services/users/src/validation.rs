//! Input validation utilities

use common::error::ValidationErrors;
use regex::Regex;
use std::sync::OnceLock;

use crate::models::{UserToPostDto, UserUpdateDto};

/// Wire name of the login field
pub const LOGIN: &str = "login";
/// Wire name of the first name field
pub const FIRST_NAME: &str = "firstName";
/// Wire name of the last name field
pub const LAST_NAME: &str = "lastName";

/// Validate login: required, letters and digits only
pub fn validate_login(login: Option<&str>) -> Result<(), String> {
    let login = match login {
        Some(login) if !login.is_empty() => login,
        _ => return Err("Login is required".to_string()),
    };

    static LOGIN_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = LOGIN_REGEX
        .get_or_init(|| Regex::new(r"^[\p{L}\p{Nd}]+$").expect("Failed to compile login regex"));

    if !regex.is_match(login) {
        return Err("Unallowed chars in Login".to_string());
    }

    Ok(())
}

fn validate_required(value: Option<&str>, message: &str) -> Result<(), String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(()),
        _ => Err(message.to_string()),
    }
}

/// Validate a creation request
pub fn validate_new_user(user: &UserToPostDto) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(message) = validate_login(user.login.as_deref()) {
        errors.add(LOGIN, message);
    }

    errors.into_result()
}

/// Validate a full replacement, or a projection after a patch was applied
pub fn validate_user_update(user: &UserUpdateDto) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(message) = validate_login(user.login.as_deref()) {
        errors.add(LOGIN, message);
    }

    if let Err(message) = validate_required(user.first_name.as_deref(), "First name is required") {
        errors.add(FIRST_NAME, message);
    }

    if let Err(message) = validate_required(user.last_name.as_deref(), "Last name is required") {
        errors.add(LAST_NAME, message);
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_accepts_letters_and_digits() {
        assert!(validate_login(Some("abc123")).is_ok());
        assert!(validate_login(Some("Пётр2")).is_ok());
    }

    #[test]
    fn test_login_rejects_other_chars() {
        assert_eq!(
            validate_login(Some("ab!c")),
            Err("Unallowed chars in Login".to_string())
        );
        assert!(validate_login(Some("john doe")).is_err());
        assert!(validate_login(Some("john_doe")).is_err());
    }

    #[test]
    fn test_login_rejects_non_decimal_numbers() {
        assert!(validate_login(Some("Ⅻ")).is_err());
        assert!(validate_login(Some("x²")).is_err());
        assert!(validate_login(Some("٣٤")).is_ok());
    }

    #[test]
    fn test_login_required() {
        assert_eq!(validate_login(Some("")), Err("Login is required".to_string()));
        assert_eq!(validate_login(None), Err("Login is required".to_string()));
    }

    #[test]
    fn test_update_collects_every_field() {
        let errors = validate_user_update(&UserUpdateDto {
            login: Some("a b".to_string()),
            first_name: None,
            last_name: Some(" ".to_string()),
        })
        .unwrap_err();

        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![LOGIN, FIRST_NAME, LAST_NAME]);
    }

    #[test]
    fn test_new_user_only_checks_login() {
        let user = UserToPostDto {
            login: Some("johndoe".to_string()),
            ..Default::default()
        };
        assert!(validate_new_user(&user).is_ok());
    }
}
