//! Labeled output frames and the fan-in that produces them.
//!
//! Every pipe of every child becomes one labeled source. Sources are merged
//! with [`select_all`]: whichever source has a chunk ready first is
//! forwarded first. Order within a source is preserved; order across
//! sources is whatever the OS delivers.

use std::pin::Pin;

use futures_util::stream::{self, select_all, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::decode::Utf8ChunkDecoder;

/// Origin of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    /// Output of the version query (stdout and stderr alike).
    Version,
    /// Execution stdout.
    Stdout,
    /// Execution stderr.
    Stderr,
}

impl FrameKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameKind::Version => "version",
            FrameKind::Stdout => "stdout",
            FrameKind::Stderr => "stderr",
        }
    }
}

/// One chunk of child output, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFrame {
    pub kind: FrameKind,
    pub text: String,
}

impl StreamFrame {
    pub fn new(kind: FrameKind, text: impl Into<String>) -> Self {
        StreamFrame {
            kind,
            text: text.into(),
        }
    }

    /// Serializes the frame as one newline-terminated JSON record.
    pub fn to_json_line(&self) -> serde_json::Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

/// Boxed frame stream, as returned by [`Runner::stream`](crate::Runner::stream).
pub type FrameStream = Pin<Box<dyn Stream<Item = StreamFrame> + Send>>;

/// Turns a pipe into a stream of frames, one per chunk read.
pub(crate) fn labeled<R>(pipe: R, kind: FrameKind) -> FrameStream
where
    R: AsyncRead + Send + Unpin + 'static,
{
    Box::pin(async_stream::stream! {
        let mut chunks = ReaderStream::new(pipe);
        let mut decoder = Utf8ChunkDecoder::new();

        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(bytes) => {
                    let text = decoder.decode(&bytes);
                    if !text.is_empty() {
                        yield StreamFrame::new(kind, text);
                    }
                }
                Err(err) => {
                    tracing::debug!(kind = kind.as_str(), error = %err, "pipe read failed");
                    break;
                }
            }
        }

        if let Some(rest) = decoder.finish() {
            yield StreamFrame::new(kind, rest);
        }
    })
}

/// A single frame, used when a source could not be started at all.
pub(crate) fn single(frame: StreamFrame) -> FrameStream {
    stream::once(async move { frame }).boxed()
}

/// Merges labeled sources, first ready first forwarded.
pub(crate) fn fan_in(sources: Vec<FrameStream>) -> impl Stream<Item = StreamFrame> + Send + Unpin {
    select_all(sources)
}
