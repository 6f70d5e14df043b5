//! # TaskHub API Server Library
//!
//! This library provides the core functionality for the TaskHub API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `mailer`: Outbound mail (logging implementation)
//! - `middleware`: Resolution and authorization guards
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod mailer;
pub mod middleware;
pub mod routes;
