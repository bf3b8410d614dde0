//! NameSentry Server Library
//!
//! This module exposes the server components for testing purposes.

pub mod config;
pub mod error;
pub mod github;
pub mod routes;
pub mod services;
