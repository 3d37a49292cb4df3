//! Submitted forms and their field validation.
//!
//! `validate` covers everything that can be decided from the submitted values
//! alone. Checks needing the database (uniqueness, referenced rows) are added
//! by the handlers onto the same `FormErrors`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key for errors that belong to the form as a whole.
pub const NON_FIELD_ERRORS: &str = "__all__";

const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
const MAX_NAME_LENGTH: usize = 255;
const MAX_USERNAME_LENGTH: usize = 150;
const MIN_PASSWORD_LENGTH: usize = 8;
const LICENSE_LENGTH: usize = 8;

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "1234567890",
    "qwertyuiop",
    "qwerty123",
    "iloveyou",
    "sunshine",
    "football",
    "baseball",
    "welcome1",
    "letmein1",
    "trustno1",
    "superman",
    "abc12345",
    "passw0rd",
];

/// Field name -> messages, rendered back with the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}

fn require(errors: &mut FormErrors, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, REQUIRED);
        return false;
    }
    true
}

fn max_length(errors: &mut FormErrors, field: &'static str, value: &str, max: usize) {
    let len = value.chars().count();
    if len > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})."),
        );
    }
}

/// Licence numbers are three uppercase letters followed by five digits.
pub fn validate_license_number(value: &str) -> Result<(), String> {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() != LICENSE_LENGTH {
        return Err(format!(
            "License number must consist of {LICENSE_LENGTH} characters."
        ));
    }
    let (letters, digits) = chars.split_at(3);
    if !letters.iter().all(char::is_ascii_uppercase) {
        return Err("First 3 characters must be uppercase letters.".to_string());
    }
    if !digits.iter().all(char::is_ascii_digit) {
        return Err("Last 5 characters must be digits.".to_string());
    }
    Ok(())
}

fn validate_username(value: &str) -> Result<(), String> {
    let valid = value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err("Enter a valid username. This value may contain only letters, numbers, \
             and @/./+/-/_ characters."
            .to_string())
    }
}

/// Strength checks applied to a new password.
pub fn validate_password(password: &str, username: &str) -> Vec<String> {
    let mut problems = Vec::new();
    let lowered = password.to_lowercase();
    let user = username.trim().to_lowercase();

    if !user.is_empty() && (lowered.contains(&user) || user.contains(&lowered)) {
        problems.push("The password is too similar to the username.".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        problems.push(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
        ));
    }
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        problems.push("This password is too common.".to_string());
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }
    problems
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ManufacturerForm {
    pub name: String,
    pub country: String,
}

impl ManufacturerForm {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        if require(&mut errors, "name", &self.name) {
            max_length(&mut errors, "name", &self.name, MAX_NAME_LENGTH);
        }
        if require(&mut errors, "country", &self.country) {
            max_length(&mut errors, "country", &self.country, MAX_NAME_LENGTH);
        }
        errors
    }
}

/// Registration form for a new driver account.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DriverCreationForm {
    pub username: String,
    #[serde(skip_serializing)]
    pub password1: String,
    #[serde(skip_serializing)]
    pub password2: String,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
}

impl DriverCreationForm {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        let username = self.username.trim();

        if require(&mut errors, "username", username) {
            max_length(&mut errors, "username", username, MAX_USERNAME_LENGTH);
            if let Err(msg) = validate_username(username) {
                errors.add("username", msg);
            }
        }
        max_length(&mut errors, "first_name", &self.first_name, MAX_USERNAME_LENGTH);
        max_length(&mut errors, "last_name", &self.last_name, MAX_USERNAME_LENGTH);

        let has_password1 = require(&mut errors, "password1", &self.password1);
        let has_password2 = require(&mut errors, "password2", &self.password2);
        if has_password1 && has_password2 {
            if self.password1 != self.password2 {
                errors.add("password2", "The two password fields didn't match.");
            } else {
                for problem in validate_password(&self.password2, username) {
                    errors.add("password2", problem);
                }
            }
        }

        check_license_number(&mut errors, &self.license_number);
        errors
    }
}

fn check_license_number(errors: &mut FormErrors, value: &str) {
    let value = value.trim();
    if require(errors, "license_number", value) {
        if let Err(msg) = validate_license_number(value) {
            errors.add("license_number", msg);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DriverLicenseUpdateForm {
    pub license_number: String,
}

impl DriverLicenseUpdateForm {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        check_license_number(&mut errors, &self.license_number);
        errors
    }
}

/// Car form; `drivers` arrives as a repeated key (`drivers=1&drivers=3`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CarForm {
    pub model: String,
    pub manufacturer: String,
    pub drivers: Vec<String>,
}

impl CarForm {
    /// Validates the fields and returns the parsed manufacturer id. Driver
    /// values that are not ids are reported here; whether they name existing
    /// drivers is left to the caller.
    pub fn validate(&self) -> (Option<i64>, FormErrors) {
        let mut errors = FormErrors::default();
        if require(&mut errors, "model", &self.model) {
            max_length(&mut errors, "model", &self.model, MAX_NAME_LENGTH);
        }

        let mut manufacturer_id = None;
        if require(&mut errors, "manufacturer", &self.manufacturer) {
            match self.manufacturer.trim().parse::<i64>() {
                Ok(id) => manufacturer_id = Some(id),
                Err(_) => errors.add("manufacturer", INVALID_CHOICE),
            }
        }

        if let Some(bad) = self.drivers.iter().find(|raw| raw.trim().parse::<i64>().is_err()) {
            errors.add(
                "drivers",
                format!("Select a valid choice. {bad} is not one of the available choices."),
            );
        }
        (manufacturer_id, errors)
    }

    /// Parsed driver ids with duplicates removed, keeping submission order.
    pub fn driver_ids(&self) -> Vec<i64> {
        let mut ids = Vec::with_capacity(self.drivers.len());
        for id in self.drivers.iter().filter_map(|raw| raw.trim().parse::<i64>().ok()) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn license_number_format() {
        assert!(validate_license_number("ASD84321").is_ok());
        assert!(validate_license_number("NAB30473").is_ok());
        assert!(validate_license_number("asd84321").is_err());
        assert!(validate_license_number("ASD8432").is_err());
        assert!(validate_license_number("ASD843210").is_err());
        assert!(validate_license_number("AS184321").is_err());
        assert!(validate_license_number("ASDF4321").is_err());
        assert!(validate_license_number("ÄSD84321").is_err());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("pass123word098test", "Andriy").is_empty());
        assert!(!validate_password("short1", "Andriy").is_empty());
        assert!(!validate_password("1234567890", "Andriy").is_empty());
        assert!(!validate_password("password123", "Andriy").is_empty());
        assert!(!validate_password("andriy2024", "Andriy").is_empty());
    }

    #[test]
    fn driver_form_mismatched_passwords() {
        let form = DriverCreationForm {
            username: "Andriy".to_string(),
            password1: "pass123word098test".to_string(),
            password2: "pass123word098tesT".to_string(),
            license_number: "ASH84321".to_string(),
            ..Default::default()
        };
        let errors = form.validate();
        assert_eq!(errors.get("password2"), ["The two password fields didn't match."]);
        assert!(!errors.has("license_number"));
    }

    #[test]
    fn driver_form_valid() {
        let form = DriverCreationForm {
            username: "Andriy".to_string(),
            password1: "pass123word098test".to_string(),
            password2: "pass123word098test".to_string(),
            license_number: "ASH84321".to_string(),
            ..Default::default()
        };
        assert!(form.validate().is_empty());
    }

    #[test]
    fn driver_form_rejects_bad_username() {
        let form = DriverCreationForm {
            username: "test user".to_string(),
            password1: "pass123word098test".to_string(),
            password2: "pass123word098test".to_string(),
            license_number: "ASH84321".to_string(),
            ..Default::default()
        };
        assert!(form.validate().has("username"));
    }

    #[test]
    fn manufacturer_form_requires_fields() {
        let errors = ManufacturerForm::default().validate();
        assert_eq!(errors.get("name"), [REQUIRED]);
        assert_eq!(errors.get("country"), [REQUIRED]);
    }

    #[test]
    fn car_form_parses_manufacturer() {
        let form = CarForm {
            model: "Doblo".to_string(),
            manufacturer: "3".to_string(),
            drivers: vec!["2".to_string(), "1".to_string(), "2".to_string()],
        };
        let (manufacturer_id, errors) = form.validate();
        assert!(errors.is_empty());
        assert_eq!(manufacturer_id, Some(3));
        assert_eq!(form.driver_ids(), vec![2, 1]);

        let bad = CarForm {
            manufacturer: "fiat".to_string(),
            ..form
        };
        let (manufacturer_id, errors) = bad.validate();
        assert_eq!(manufacturer_id, None);
        assert!(errors.has("manufacturer"));
    }

    #[test]
    fn car_form_reports_unparseable_drivers() {
        let form = CarForm {
            model: "Doblo".to_string(),
            manufacturer: "3".to_string(),
            drivers: vec!["1".to_string(), "abc".to_string(), String::new()],
        };
        let (manufacturer_id, errors) = form.validate();
        assert_eq!(manufacturer_id, Some(3));
        assert_eq!(
            errors.get("drivers"),
            ["Select a valid choice. abc is not one of the available choices."]
        );
        assert_eq!(form.driver_ids(), vec![1]);
    }

    #[test]
    fn driver_form_trims_username_and_license() {
        let form = DriverCreationForm {
            username: " Andriy ".to_string(),
            password1: "pass123word098test".to_string(),
            password2: "pass123word098test".to_string(),
            license_number: " ASH84321 ".to_string(),
            ..Default::default()
        };
        assert!(form.validate().is_empty());

        let update = DriverLicenseUpdateForm {
            license_number: "ASH84321\n".to_string(),
        };
        assert!(update.validate().is_empty());
    }

    #[test]
    fn password_fields_are_not_echoed() {
        let form = DriverCreationForm {
            username: "Andriy".to_string(),
            password1: "secret-value-1".to_string(),
            password2: "secret-value-1".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&form).unwrap();
        assert!(json.get("password1").is_none());
        assert!(json.get("password2").is_none());
        assert_eq!(json["username"], "Andriy");
    }
}
