pub mod assets;
pub mod auth;
pub mod health;
pub mod history;
pub mod portfolio;
pub mod quote;
pub mod trade;

use validator::Validate;

use crate::views::Apology;

/// Validates a form and reports the first failing field in `fields` order,
/// which is the order the fields appear on the page.
pub(crate) fn validate_form<T: Validate>(form: &T, fields: &[&str]) -> Result<(), Apology> {
    let Err(errors) = form.validate() else {
        return Ok(());
    };

    let field_errors = errors.field_errors();
    let message = fields
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .filter_map(|errs| errs.first())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "invalid form".to_string());

    Err(Apology::bad_request(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::RegisterForm;
    use axum::http::StatusCode;

    #[test]
    fn test_first_missing_field_wins() {
        let form = RegisterForm {
            username: String::new(),
            password: String::new(),
            confirmation: "x".to_string(),
        };
        let apology = validate_form(&form, RegisterForm::FIELDS).unwrap_err();
        assert_eq!(apology.status, StatusCode::BAD_REQUEST);
        assert_eq!(apology.message, "must provide username");

        let form = RegisterForm {
            username: "ann".to_string(),
            password: "pw".to_string(),
            confirmation: String::new(),
        };
        let apology = validate_form(&form, RegisterForm::FIELDS).unwrap_err();
        assert_eq!(apology.message, "must confirm password");
    }

    #[test]
    fn test_complete_form_passes() {
        let form = RegisterForm {
            username: "ann".to_string(),
            password: "pw".to_string(),
            confirmation: "pw".to_string(),
        };
        assert!(validate_form(&form, RegisterForm::FIELDS).is_ok());
    }
}
