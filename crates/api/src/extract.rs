//! Request body extractor that runs `validator` rules after deserializing.

use axum::extract::{FromRequest, Request};
use axum::Json;
use railway_core::error::CoreError;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

/// JSON body that has passed its `#[validate(...)]` rules.
///
/// Malformed JSON is a 400 `BAD_REQUEST`; a rule violation is a 400
/// `VALIDATION_ERROR` naming every failing field.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| AppError::Core(CoreError::Validation(describe(&errors))))?;

        Ok(ValidatedJson(value))
    }
}

/// Render field errors as `field: reason` pairs, sorted by field name.
fn describe(errors: &ValidationErrors) -> String {
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
            format!("{field}: {}", reasons.join(", "))
        })
        .collect();
    fields.sort();
    fields.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, max = 63, message = "must be 1-63 characters"))]
        name: String,
        #[validate(range(min = 1))]
        cargo_count: i32,
    }

    #[test]
    fn describes_each_failing_field() {
        let sample = Sample {
            name: String::new(),
            cargo_count: 0,
        };
        let message = describe(&sample.validate().unwrap_err());
        assert_eq!(
            message,
            "cargo_count: range; name: must be 1-63 characters"
        );
    }

    #[test]
    fn valid_input_passes() {
        let sample = Sample {
            name: "Intercity".to_string(),
            cargo_count: 2,
        };
        assert!(sample.validate().is_ok());
    }
}
