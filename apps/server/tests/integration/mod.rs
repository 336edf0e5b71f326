//! Integration tests module
//!
//! Contains tests that exercise the HTTP surface and the tokio-hosted rotation driver.

mod rotation_driver_test;
