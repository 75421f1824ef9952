//! Toolchain process orchestration for the coderunner service.
//!
//! Builds argv-based invocations of an external compiler/interpreter,
//! runs them to completion ([`Runner::run_buffered`]) or exposes their
//! output live as a fan-in of labeled frames ([`Runner::stream`]).
//! User code only ever reaches the toolchain through a stdin pipe.

pub mod config;
pub mod decode;
pub mod error;
pub mod invocation;
pub mod params;
mod process;
pub mod runner;
pub mod stream;

pub use config::RunnerConfig;
pub use decode::Utf8ChunkDecoder;
pub use error::ExecError;
pub use invocation::ToolchainInvocation;
pub use params::ExecutionParams;
pub use runner::{BufferedResult, Runner};
pub use stream::{FrameKind, FrameStream, StreamFrame};
