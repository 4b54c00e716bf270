// src/exec/stream.rs

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio_stream::Stream;

/// Lazy, finite, non-restartable sequence of output fragments.
///
/// For a real run the last item is always the status line. Dropping the
/// stream early counts as a client disconnect and stops the process.
pub struct OutputStream {
    inner: Pin<Box<dyn Stream<Item = String> + Send>>,
}

impl OutputStream {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = String> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// A stream that yields the given fragments and ends.
    pub fn from_fragments(fragments: Vec<String>) -> Self {
        Self::new(tokio_stream::iter(fragments))
    }
}

impl Stream for OutputStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        self.inner.as_mut().poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl std::fmt::Debug for OutputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputStream").finish_non_exhaustive()
    }
}
