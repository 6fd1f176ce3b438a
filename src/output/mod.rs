//! Output sinks for console text
//!
//! The evaluator writes everything `cout` produces through an [`OutputSink`].
//! [`BufferSink`] keeps the text in memory for tests and the viewer;
//! [`WriterSink`] streams it to any [`std::io::Write`], typically stdout.

use std::io::{self, Write};

/// Append-only text sink.
pub trait OutputSink {
    fn write(&mut self, text: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// In-memory sink
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    text: String,
}

impl BufferSink {
    pub fn new() -> Self {
        BufferSink::default()
    }

    /// Everything written so far
    pub fn contents(&self) -> &str {
        &self.text
    }

    /// Written text split into lines, without a trailing empty line when the
    /// output ends with a newline
    pub fn lines(&self) -> Vec<String> {
        let mut result: Vec<String> = self.text.split('\n').map(|s| s.to_string()).collect();
        if result.last().is_some_and(|s| s.is_empty()) {
            result.pop();
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl OutputSink for BufferSink {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.text.push_str(text);
        Ok(())
    }
}

/// Sink over an [`io::Write`]; flushed when dropped.
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        WriterSink { writer }
    }
}

impl<W: Write> OutputSink for WriterSink<W> {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<W: Write> Drop for WriterSink<W> {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
