//! HTTP front-end for the coderunner toolchain runner.
//!
//! Accepts source code over `POST /runner/{version}/run`, executes it through
//! [`coderunner_exec::Runner`], and answers with either one JSON object or a
//! stream of labeled JSON lines. This crate contains the router, request
//! schema, error mapping and environment configuration.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod schema;
pub mod state;
