//! Streaming sink: encoder chunks → one contiguous buffer.
//!
//! The encoder runs on a blocking thread and writes through a
//! [`ChunkWriter`]; each write becomes a [`SinkMessage::Chunk`] on a bounded
//! channel. The async side drains that channel with a [`StreamingSink`],
//! appending chunks in arrival order until the producer signals
//! [`SinkMessage::Finish`] or [`SinkMessage::Fail`].
//!
//! ```text
//!  spawn_blocking                       async task
//! ┌──────────────────┐   mpsc(cap)    ┌──────────────────┐
//! │ lopdf save_to    │ ─ Chunk(..) ─▶ │ StreamingSink    │
//! │  └ BufWriter     │ ─ Chunk(..) ─▶ │   .drain()       │──▶ Bytes
//! │     └ ChunkWriter│ ─ Finish ────▶ │                  │
//! └──────────────────┘                └──────────────────┘
//! ```
//!
//! The channel is bounded, so a slow consumer back-pressures the encoder
//! instead of letting chunks pile up in memory twice.

use crate::error::InvoiceError;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use std::io;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, trace};

/// One event from the encoder side of the channel.
#[derive(Debug)]
pub enum SinkMessage {
    /// Next slice of the document, in order.
    Chunk(Bytes),
    /// The document is complete.
    Finish,
    /// The producer gave up; everything received so far is discarded.
    Fail(io::Error),
}

/// Create a connected writer/sink pair with room for `capacity` in-flight
/// chunks.
pub fn channel(capacity: usize) -> (ChunkWriter, StreamingSink) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ChunkWriter::new(tx), StreamingSink::new(rx))
}

// ── Producer side ────────────────────────────────────────────────────────

/// Blocking `io::Write` adapter that forwards every write as a chunk.
///
/// Must be driven from a thread that is not running async tasks
/// (`spawn_blocking` or a plain `std::thread`). Wrap it in a `BufWriter`
/// to control chunk size.
pub struct ChunkWriter {
    tx: Option<mpsc::Sender<SinkMessage>>,
    error: Option<io::Error>,
    chunks: usize,
}

impl ChunkWriter {
    pub fn new(tx: mpsc::Sender<SinkMessage>) -> Self {
        Self {
            tx: Some(tx),
            error: None,
            chunks: 0,
        }
    }

    /// The first delivery failure, if any. Later writes keep failing.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn chunks_sent(&self) -> usize {
        self.chunks
    }

    /// Signal a complete document.
    pub fn finish(mut self) -> io::Result<()> {
        let tx = self.tx.take().ok_or_else(closed)?;
        tx.blocking_send(SinkMessage::Finish).map_err(|_| closed())
    }

    /// Signal failure. The sink resolves with `err`; a consumer that is
    /// already gone is not an error here.
    pub fn fail(mut self, err: io::Error) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.blocking_send(SinkMessage::Fail(err));
        }
    }
}

impl io::Write for ChunkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let Some(tx) = self.tx.as_ref() else {
            return Err(closed());
        };
        if tx
            .blocking_send(SinkMessage::Chunk(Bytes::copy_from_slice(buf)))
            .is_err()
        {
            self.tx = None;
            if self.error.is_none() {
                self.error = Some(closed());
            }
            return Err(closed());
        }
        self.chunks += 1;
        trace!("Sent chunk {} ({} bytes)", self.chunks, buf.len());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "streaming sink closed")
}

// ── Consumer side ────────────────────────────────────────────────────────

/// Collects chunks into a single buffer. Resolves exactly once.
pub struct StreamingSink {
    stream: ReceiverStream<SinkMessage>,
}

impl StreamingSink {
    pub fn new(rx: mpsc::Receiver<SinkMessage>) -> Self {
        Self {
            stream: ReceiverStream::new(rx),
        }
    }

    /// Append chunks until the producer finishes or fails.
    ///
    /// A producer that hangs up without either signal is treated as a
    /// failure: the document is incomplete.
    pub async fn drain(mut self) -> Result<Bytes, InvoiceError> {
        let mut buffer = BytesMut::new();
        let mut chunks = 0usize;

        while let Some(message) = self.stream.next().await {
            match message {
                SinkMessage::Chunk(bytes) => {
                    chunks += 1;
                    buffer.extend_from_slice(&bytes);
                }
                SinkMessage::Finish => {
                    debug!("Sink finished: {} chunks, {} bytes", chunks, buffer.len());
                    return Ok(buffer.freeze());
                }
                SinkMessage::Fail(err) => {
                    debug!("Sink failed after {} chunks: {}", chunks, err);
                    return Err(InvoiceError::Sink(err));
                }
            }
        }

        Err(InvoiceError::Sink(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "encoder hung up before finishing the document",
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufWriter, Write};

    #[tokio::test]
    async fn chunks_are_joined_in_order() {
        let (mut writer, sink) = channel(2);
        let producer = std::thread::spawn(move || {
            for part in [&b"%PDF-"[..], b"1.7\n", b"body", b"%%EOF"] {
                writer.write_all(part).unwrap();
            }
            assert_eq!(writer.chunks_sent(), 4);
            writer.finish().unwrap();
        });

        let bytes = sink.drain().await.unwrap();
        producer.join().unwrap();
        assert_eq!(&bytes[..], b"%PDF-1.7\nbody%%EOF");
    }

    #[tokio::test]
    async fn buffered_writer_controls_chunk_size() {
        let (writer, sink) = channel(4);
        let producer = std::thread::spawn(move || {
            let mut buf = BufWriter::with_capacity(8, writer);
            buf.write_all(&[7u8; 40]).unwrap();
            let writer = buf.into_inner().map_err(|e| e.into_error()).unwrap();
            writer.finish().unwrap();
        });

        let bytes = sink.drain().await.unwrap();
        producer.join().unwrap();
        assert_eq!(bytes.len(), 40);
        assert!(bytes.iter().all(|b| *b == 7));
    }

    #[tokio::test]
    async fn fail_discards_partial_data() {
        let (mut writer, sink) = channel(4);
        let producer = std::thread::spawn(move || {
            writer.write_all(b"partial").unwrap();
            writer.fail(io::Error::other("disk full"));
        });

        let err = sink.drain().await.unwrap_err();
        producer.join().unwrap();
        assert!(matches!(err, InvoiceError::Sink(_)));
        assert!(err.to_string().contains("disk full"));
    }

    #[tokio::test]
    async fn hang_up_without_signal_is_unexpected_eof() {
        let (mut writer, sink) = channel(4);
        let producer = std::thread::spawn(move || {
            writer.write_all(b"half a document").unwrap();
            drop(writer);
        });

        let err = sink.drain().await.unwrap_err();
        producer.join().unwrap();
        match err {
            InvoiceError::Sink(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn write_after_consumer_dropped_is_broken_pipe() {
        let (mut writer, sink) = channel(1);
        drop(sink);

        let err = writer.write(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        let recorded = writer.take_error().unwrap();
        assert_eq!(recorded.kind(), io::ErrorKind::BrokenPipe);
        assert!(writer.write(b"y").is_err());
        assert!(writer.finish().is_err());
    }

    #[test]
    fn empty_write_sends_nothing() {
        let (mut writer, _sink) = channel(1);
        assert_eq!(writer.write(b"").unwrap(), 0);
        assert_eq!(writer.chunks_sent(), 0);
    }
}
