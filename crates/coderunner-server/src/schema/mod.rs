//! API schema types for request/response definitions.
//!
//! Types use serde derives for JSON serialization/deserialization. The
//! buffered run response is [`coderunner_exec::BufferedResult`] and the
//! streamed frames are [`coderunner_exec::StreamFrame`], both serialized
//! as-is.

pub mod health;
pub mod run;
