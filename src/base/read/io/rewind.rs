// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A buffered reader over a forward-only source which can push consumed bytes back in front of its cursor.
//!
//! Record parsing over a non-seekable source occasionally needs to look ahead (eg. peeking at the next signature to
//! decide whether an entry has any data). Rather than requiring a seekable source, bytes consumed whilst recording can
//! be rewound and are served again before any further bytes are taken from the source.
//!
//! Decoders are driven through [`AsyncBufRead`] and only consume the bytes they use, so anything buffered past the end
//! of an entry remains in front of the cursor for the next record.

use crate::base::read::io::poll_result_ok;

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use futures_lite::io::{AsyncBufRead, AsyncRead};
use pin_project::pin_project;

/// A buffered reader which supports recording consumed bytes and pushing them back.
#[pin_project]
pub struct RewindableStream<R> {
    #[pin]
    inner: R,
    buffer: Vec<u8>,
    pos: usize,
    filled: usize,
    capacity: usize,
    recording: Option<Vec<u8>>,
    position: u64,
}

impl<R> RewindableStream<R>
where
    R: AsyncRead + Unpin,
{
    /// Constructs a new stream with the given buffer capacity.
    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        let capacity = capacity.max(1);
        Self { inner, buffer: vec![0; capacity], pos: 0, filled: 0, capacity, recording: None, position: 0 }
    }

    /// Returns the number of bytes consumed from this stream so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Returns the bytes currently buffered in front of the cursor.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer[self.pos..self.filled]
    }

    /// Starts recording all consumed bytes, discarding any previous recording.
    pub fn start_recording(&mut self) {
        self.recording = Some(Vec::new());
    }

    /// Stops recording and discards the recorded bytes.
    pub fn stop_recording(&mut self) {
        self.recording = None;
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Stops recording and pushes every byte consumed since [`Self::start_recording`] back in front of the cursor.
    pub fn rewind(&mut self) {
        if let Some(recorded) = self.recording.take() {
            self.unread(&recorded);
        }
    }

    /// Pushes bytes back in front of the cursor so that they're the next to be read.
    ///
    /// The bytes are expected to be those most recently consumed, as the stream's position is moved back by their
    /// length.
    pub fn unread(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }

        if self.pos >= bytes.len() {
            self.pos -= bytes.len();
            self.buffer[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        } else {
            let mut buffer = Vec::with_capacity((bytes.len() + self.filled - self.pos).max(self.capacity));
            buffer.extend_from_slice(bytes);
            buffer.extend_from_slice(&self.buffer[self.pos..self.filled]);
            self.filled = buffer.len();
            buffer.resize(buffer.capacity(), 0);
            self.buffer = buffer;
            self.pos = 0;
        }

        self.position = self.position.saturating_sub(bytes.len() as u64);
        if let Some(recording) = self.recording.as_mut() {
            let kept = recording.len().saturating_sub(bytes.len());
            recording.truncate(kept);
        }
    }

    /// Consumes this stream and returns the inner source, dropping any buffered bytes.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R> AsyncBufRead for RewindableStream<R>
where
    R: AsyncRead + Unpin,
{
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<&[u8]>> {
        let this = self.project();

        if *this.pos >= *this.filled {
            if this.buffer.len() < *this.capacity {
                this.buffer.resize(*this.capacity, 0);
            }

            let read = poll_result_ok!(ready!(this.inner.poll_read(cx, this.buffer)));
            *this.pos = 0;
            *this.filled = read;
        }

        Poll::Ready(Ok(&this.buffer[*this.pos..*this.filled]))
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        let this = self.project();
        let amt = amt.min(*this.filled - *this.pos);

        if let Some(recording) = this.recording.as_mut() {
            recording.extend_from_slice(&this.buffer[*this.pos..*this.pos + amt]);
        }

        *this.pos += amt;
        *this.position += amt as u64;
    }
}

impl<R> AsyncRead for RewindableStream<R>
where
    R: AsyncRead + Unpin,
{
    fn poll_read(mut self: Pin<&mut Self>, c: &mut Context<'_>, b: &mut [u8]) -> Poll<std::io::Result<usize>> {
        // Bypass the buffer for large reads when there's nothing buffered or recorded.
        if self.pos >= self.filled && self.recording.is_none() && b.len() >= self.capacity {
            let this = self.project();
            let read = poll_result_ok!(ready!(this.inner.poll_read(c, b)));
            *this.position += read as u64;
            return Poll::Ready(Ok(read));
        }

        let available = poll_result_ok!(ready!(self.as_mut().poll_fill_buf(c)));
        let read = available.len().min(b.len());
        b[..read].copy_from_slice(&available[..read]);
        self.consume(read);

        Poll::Ready(Ok(read))
    }
}
