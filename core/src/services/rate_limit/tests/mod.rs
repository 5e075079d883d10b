//! Tests for the rate limiting service
