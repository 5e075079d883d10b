//! Unit tests for the mock SMS service and the gateway adapter

use sf_core::services::sms_otp::SmsGateway;

use crate::sms::gateway_adapter::SmsGatewayAdapter;
use crate::sms::mock_sms::MockSmsService;
use crate::sms::sms_service::SmsService;

#[tokio::test]
async fn test_mock_delivers_and_counts() {
    let service = MockSmsService::new();

    let id = service
        .send_sms("+61412345678", "test message")
        .await
        .unwrap();

    assert!(id.starts_with("mock_"));
    assert_eq!(service.get_message_count(), 1);
}

#[tokio::test]
async fn test_mock_rejects_invalid_phone() {
    let service = MockSmsService::new();

    let result = service.send_sms("12345", "test message").await;

    assert!(result.is_err());
    assert_eq!(service.get_message_count(), 0);
}

#[tokio::test]
async fn test_failing_mock_reports_error() {
    let service = MockSmsService::failing();

    let result = service.send_sms("+61412345678", "test message").await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_adapter_wraps_code_into_message() {
    let mock = MockSmsService::new();
    let counter = mock.clone();
    let adapter = SmsGatewayAdapter::new(Box::new(mock));

    let id = adapter.send_otp("+61412345678", "123456").await.unwrap();

    assert!(id.starts_with("mock_"));
    assert_eq!(counter.get_message_count(), 1);
}

#[tokio::test]
async fn test_adapter_flattens_provider_errors() {
    let adapter = SmsGatewayAdapter::new(Box::new(MockSmsService::failing()));

    let result = adapter.send_otp("+61412345678", "123456").await;

    assert!(result.is_err());
}
