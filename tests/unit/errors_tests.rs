/*!
 * Tests for error types and conversions
 */

use adscribe::errors::{
    AppError, DeserializationError, GenerationError, IntakeError, RefinementError, ServiceError, SessionError,
};

#[test]
fn test_serviceError_apiError_shouldDisplayStatusAndMessage() {
    let error = ServiceError::ApiError {
        status_code: 502,
        message: "Bad gateway".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("502"));
    assert!(display.contains("Bad gateway"));
}

#[test]
fn test_serviceError_connectionError_shouldDisplayCorrectly() {
    let error = ServiceError::ConnectionError("Host unreachable".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Connection error"));
    assert!(display.contains("Host unreachable"));
}

#[test]
fn test_generationError_shouldWrapServiceMessage() {
    let error = GenerationError::from(ServiceError::ParseError("missing field `script`".to_string()));
    assert_eq!(
        error.to_string(),
        "Failed to generate script: Failed to parse API response: missing field `script`"
    );
}

#[test]
fn test_intakeError_fromGeneration_shouldBeTransparent() {
    let error: IntakeError = GenerationError::from(ServiceError::ConnectionError("refused".to_string())).into();
    assert!(error.to_string().starts_with("Failed to generate script"));
}

#[test]
fn test_deserializationError_missing_shouldMatchEmptyStateMessage() {
    assert_eq!(DeserializationError::Missing.to_string(), "No script data available");
}

#[test]
fn test_refinementError_emptyResponse_shouldDisplayCorrectly() {
    let display = RefinementError::EmptyResponse.to_string();
    assert!(display.starts_with("Failed to refine script"));
    assert!(display.contains("no replacement line"));
}

#[test]
fn test_refinementError_lineUnavailable_shouldNotBlameTheService() {
    let display = RefinementError::LineUnavailable { line: 2 }.to_string();
    assert_eq!(display, "Failed to refine script: line 2 is no longer in the script");
    assert!(!display.contains("no replacement line"));
}

#[test]
fn test_sessionError_lineOutOfRange_shouldMentionLength() {
    let error = SessionError::LineOutOfRange { index: 5, len: 2 };
    assert!(error.to_string().contains("2 lines"));
}

#[test]
fn test_appError_conversions_shouldPickTheRightVariant() {
    let from_io: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(from_io, AppError::File(_)));

    let from_anyhow: AppError = anyhow::anyhow!("something odd").into();
    assert!(matches!(from_anyhow, AppError::Unknown(ref message) if message == "something odd"));

    let from_session: AppError = SessionError::NotLoaded.into();
    assert_eq!(from_session.to_string(), "Session error: No script data available");

    let from_refine: AppError = RefinementError::EmptyResponse.into();
    assert!(matches!(from_refine, AppError::Refinement(_)));
}
