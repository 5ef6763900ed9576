//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes
//! - Error responses carry a stable code and structured details
//! - Conversions from infrastructure errors keep their category

use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::Value;
use tenant_portal::core::error::FieldValidationError;
use tenant_portal::core::{EntityError, PaymentError, RequestError, StorageError, ValidationError};
use tenant_portal::prelude::*;

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_entity_not_found_returns_404() {
        let err: PortalError = EntityError::not_found("payment", Uuid::new_v4()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_duplicate_returns_409() {
        let err: PortalError = EntityError::AlreadyExists {
            entity_type: "House".to_string(),
            field: "houseNo".to_string(),
            value: "A1".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "House with houseNo 'A1' already exists");
    }

    #[test]
    fn test_identity_errors() {
        let err: PortalError = RequestError::Unauthorized {
            message: "missing token".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let err: PortalError = RequestError::Forbidden {
            message: "admin only".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_payment_errors_return_400() {
        let err: PortalError = PaymentError::NotCash {
            payment_id: Uuid::new_v4(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_error_returns_500() {
        let err: PortalError = StorageError::ConnectionError {
            backend: "mongodb".to_string(),
            message: "connection refused".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// =============================================================================
// Response Body Tests
// =============================================================================

mod response_tests {
    use super::*;

    async fn body_of(err: PortalError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let id = Uuid::new_v4();
        let (status, body) = body_of(EntityError::not_found("rental", id).into()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "ENTITY_NOT_FOUND");
        assert_eq!(body["message"], "Rental not found");
        assert_eq!(body["details"]["entity_type"], "rental");
        assert_eq!(body["details"]["id"], id.to_string());
    }

    #[tokio::test]
    async fn test_field_errors_body() {
        let err = ValidationError::FieldErrors(vec![
            FieldValidationError {
                field: "amount".to_string(),
                message: "Amount must be a positive number".to_string(),
            },
            FieldValidationError {
                field: "month".to_string(),
                message: "Month is required".to_string(),
            },
        ]);
        let (status, body) = body_of(err.into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(
            body["message"],
            "Amount must be a positive number, Month is required"
        );
        assert_eq!(body["details"]["fields"][1]["field"], "month");
    }

    #[tokio::test]
    async fn test_invalid_transition_body() {
        let err = PaymentError::InvalidTransition {
            payment_id: Uuid::new_v4(),
            from: PaymentStatus::Successful,
            to: PaymentStatus::Successful,
        };
        let (status, body) = body_of(err.into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "PAYMENT_INVALID_TRANSITION");
        assert_eq!(body["details"]["from"], "successful");
        assert_eq!(body["details"]["to"], "successful");
    }

    #[tokio::test]
    async fn test_errors_without_details_omit_the_field() {
        let (_, body) = body_of(PortalError::Internal("boom".to_string())).await;
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert!(body.get("details").is_none());
    }
}

// =============================================================================
// Conversion Tests
// =============================================================================

mod conversion_tests {
    use super::*;

    #[test]
    fn test_anyhow_error_becomes_storage_error() {
        let err: PortalError = anyhow::anyhow!("socket closed").into();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert!(err.to_string().contains("socket closed"));
    }

    #[test]
    fn test_wrapped_portal_error_survives_anyhow() {
        let wrapped: anyhow::Error = PortalError::from(RequestError::Forbidden {
            message: "nope".to_string(),
        })
        .into();
        let err: PortalError = wrapped.into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_uuid_parse_error_is_validation() {
        let parse_err = "not-a-uuid".parse::<Uuid>().unwrap_err();
        let err: PortalError = parse_err.into();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(matches!(
            err,
            PortalError::Validation(ValidationError::InvalidUuid { .. })
        ));
    }

    #[test]
    fn test_error_matching() {
        let result: PortalResult<Payment> =
            Err(EntityError::not_found("payment", Uuid::nil()).into());

        match result {
            Err(PortalError::Entity(EntityError::NotFound { entity_type, .. })) => {
                assert_eq!(entity_type, "payment");
            }
            _ => panic!("expected a NotFound error"),
        }
    }
}
