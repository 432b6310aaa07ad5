//! Request bodies checked with `validator` before the handler runs.
//!
//! A body that is not JSON, does not match the DTO, or breaks a field rule
//! becomes `DomainError::Validation` and is rendered by `domain_error`, so
//! it carries the same envelope and status as any other rejected input.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::{domain_error, ApiError};
use crate::domain::DomainError;

/// `Json<T>` whose value has passed `T::validate()`
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                domain_error(DomainError::Validation(format!(
                    "invalid request body: {}",
                    rejection.body_text()
                )))
            })?;

        value
            .validate()
            .map_err(|errors| domain_error(field_errors(&errors)))?;

        Ok(Self(value))
    }
}

/// One `field: reason` entry per broken rule, ordered by field name.
fn field_errors(errors: &ValidationErrors) -> DomainError {
    let mut reasons: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let reason = e.message.as_ref().unwrap_or(&e.code);
                format!("{}: {}", field, reason)
            })
        })
        .collect();
    reasons.sort();

    if reasons.is_empty() {
        return DomainError::Validation("request body failed validation".into());
    }
    DomainError::Validation(reasons.join("; "))
}
