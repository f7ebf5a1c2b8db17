use validator::{Validate, ValidationError, ValidationErrors};

use crate::{CoreError, CoreResult};

/// Runs the derived field checks and folds any failures into one
/// `ValidationError`, fields in name order.
pub fn validate<T: Validate>(input: &T) -> CoreResult<()> {
    input.validate().map_err(describe)
}

/// Whitespace-only counts as blank; `length(min = 1)` would let it through.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

fn describe(errors: ValidationErrors) -> CoreError {
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let reasons: Vec<String> = errs
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            format!("{} {}", field, reasons.join(", "))
        })
        .collect();
    fields.sort();
    CoreError::ValidationError(fields.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemPatch, NewUser, UserPatch};

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_blank_values() {
        assert!(not_blank("Drill").is_ok());
        assert!(not_blank("").is_err());
        assert!(not_blank("   ").is_err());
    }

    #[test]
    fn test_new_user_fields() {
        assert!(validate(&new_user("Ann", "ann@example.com")).is_ok());
        assert!(validate(&new_user("Ann", "first.last@mail.example.org")).is_ok());
        assert!(validate(&new_user("Ann", "ann.example.com")).is_err());
        assert!(validate(&new_user("Ann", "@example.com")).is_err());
        assert!(validate(&new_user("Ann", "us er@example.com")).is_err());
        assert!(validate(&new_user("  ", "ann@example.com")).is_err());
    }

    #[test]
    fn test_failures_name_every_field() {
        let err = validate(&new_user(" ", "nope")).unwrap_err();
        match err {
            CoreError::ValidationError(message) => {
                assert!(message.starts_with("email "), "{}", message);
                assert!(message.contains("name must not be blank"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_patches_only_check_present_fields() {
        assert!(validate(&UserPatch::default()).is_ok());
        assert!(validate(&UserPatch {
            name: None,
            email: Some("not-an-email".to_string()),
        })
        .is_err());
        assert!(validate(&ItemPatch {
            name: Some(" ".to_string()),
            ..ItemPatch::default()
        })
        .is_err());
        assert!(validate(&ItemPatch {
            available: Some(false),
            ..ItemPatch::default()
        })
        .is_ok());
    }
}
