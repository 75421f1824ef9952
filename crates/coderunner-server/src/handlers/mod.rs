//! HTTP handler modules for the runner API.
//!
//! Handlers are thin: they validate the request, hand it to the shared
//! [`Runner`](coderunner_exec::Runner), and shape the response. Process
//! orchestration lives in `coderunner-exec`.

pub mod fallback;
pub mod health;
pub mod run;
