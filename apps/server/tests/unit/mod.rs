//! Unit tests module
//!
//! Contains tests for individual components in isolation.

mod email_service_test;
mod tracking_test;
