//! Tests for SMS service implementations

mod mock_sms_tests;
