//! Billboard Server Library
//!
//! This module exposes the server components for testing purposes.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod rotation;
pub mod routes;
pub mod services;
pub mod tracking;
