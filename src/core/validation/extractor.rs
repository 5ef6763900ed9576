//! Axum extractor for validated request bodies
//!
//! `ValidatedJson<T>` deserializes the body into a typed request struct and
//! runs its `validator` rules before the handler sees it.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::core::error::{PortalError, ValidationError};

/// Axum extractor that deserializes and validates a JSON body
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_payment(
///     ValidatedJson(request): ValidatedJson<CreatePaymentRequest>,
/// ) -> PortalResult<Json<Value>> {
///     // request is already validated
/// }
/// ```
///
/// Malformed JSON, unknown enum values and failed rules all reject with 400.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    /// Get the inner request
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = PortalError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ValidationError::InvalidJson {
                message: rejection.body_text(),
            })?;

        payload.validate()?;
        Ok(ValidatedJson(payload))
    }
}
