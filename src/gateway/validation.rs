use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::gateway::dto::AddUserBody;
use crate::users::repo_types::NewUser;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0} phone number is not valid")]
    InvalidPhone(String),
    #[error("{0} must not be empty")]
    MissingField(&'static str),
    #[error("height must be a positive number")]
    InvalidHeight,
    #[error("invalid integer value: {0}")]
    InvalidId(String),
}

pub(crate) fn is_valid_phone(phone: &str) -> bool {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^[0-9]{10}$").unwrap();
    }
    PHONE_RE.is_match(phone)
}

/// Check an add-user body and turn it into a [`NewUser`].
pub fn validate_new_user(body: AddUserBody) -> Result<NewUser, ValidationError> {
    let fname = body.fname.trim().to_string();
    let city = body.city.trim().to_string();
    if fname.is_empty() {
        return Err(ValidationError::MissingField("fname"));
    }
    if city.is_empty() {
        return Err(ValidationError::MissingField("city"));
    }
    if !is_valid_phone(&body.phone) {
        return Err(ValidationError::InvalidPhone(body.phone));
    }
    if !body.height.is_finite() || body.height <= 0.0 {
        return Err(ValidationError::InvalidHeight);
    }
    Ok(NewUser {
        fname,
        city,
        phone: body.phone,
        height: body.height,
        married: body.married,
    })
}

/// Flatten `user_ids` values such as `["1, 2", "3"]` into ids. Spaces are
/// ignored and empty elements skipped.
pub fn parse_user_ids<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<i64>, ValidationError> {
    let mut ids = Vec::new();
    for input in inputs {
        let cleaned: String = input.as_ref().chars().filter(|c| *c != ' ').collect();
        for element in cleaned.split(',').filter(|e| !e.is_empty()) {
            let id = element
                .parse::<i64>()
                .map_err(|_| ValidationError::InvalidId(element.to_string()))?;
            ids.push(id);
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(phone: &str) -> AddUserBody {
        AddUserBody {
            fname: "Test User".into(),
            city: "Test City".into(),
            phone: phone.into(),
            height: 170.5,
            married: false,
        }
    }

    #[test]
    fn phone_must_be_exactly_ten_ascii_digits() {
        assert!(is_valid_phone("1234567890"));
        assert!(!is_valid_phone("123456789"));
        assert!(!is_valid_phone("12345678901"));
        assert!(!is_valid_phone("12345-7890"));
        assert!(!is_valid_phone("١٢٣٤٥٦٧٨٩٠"));
    }

    #[test]
    fn valid_body_becomes_new_user() {
        let user = validate_new_user(AddUserBody {
            fname: "  Test User ".into(),
            ..body("1234567890")
        })
        .unwrap();
        assert_eq!(user.fname, "Test User");
        assert_eq!(user.phone, "1234567890");
    }

    #[test]
    fn invalid_bodies_are_rejected() {
        assert_eq!(
            validate_new_user(body("12345")).unwrap_err(),
            ValidationError::InvalidPhone("12345".into())
        );
        assert_eq!(
            validate_new_user(AddUserBody {
                city: " ".into(),
                ..body("1234567890")
            })
            .unwrap_err(),
            ValidationError::MissingField("city")
        );
        assert_eq!(
            validate_new_user(AddUserBody {
                height: f32::NAN,
                ..body("1234567890")
            })
            .unwrap_err(),
            ValidationError::InvalidHeight
        );
    }

    #[test]
    fn user_ids_are_flattened() {
        assert_eq!(parse_user_ids(&["1, 2,3", "4", ""]).unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(parse_user_ids(&["1,,2,"]).unwrap(), vec![1, 2]);
        assert!(parse_user_ids::<&str>(&[]).unwrap().is_empty());
    }

    #[test]
    fn bad_user_id_is_reported() {
        let err = parse_user_ids(&["1,x"]).unwrap_err();
        assert_eq!(err.to_string(), "invalid integer value: x");
    }
}
