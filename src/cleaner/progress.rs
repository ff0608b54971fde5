use crossbeam_channel::{bounded, Receiver, Sender};
use std::io::{self, Read};

use crate::common::errors::CleanError;

/// What travels from the worker to the reader
#[derive(Debug)]
enum Message {
    Line(String),
    Done,
    Failed(CleanError),
}

/// Where a cleanup worker sends its progress.
///
/// Closing consumes the sink, so a run ends exactly once: either
/// [`close`](ProgressSink::close) after the last stage, or
/// [`close_with_error`](ProgressSink::close_with_error) on the first failure.
pub trait ProgressSink: Send {
    fn write_line(&mut self, line: &str);

    fn close(self: Box<Self>);

    fn close_with_error(self: Box<Self>, err: CleanError);
}

/// Create a connected writer/reader pair.
///
/// The channel has no buffer: every line is handed over only when the
/// reader takes it, so a slow reader holds the worker back.
pub fn progress_pipe() -> (PipeWriter, ProgressReader) {
    let (tx, rx) = bounded(0);
    (
        PipeWriter { tx },
        ProgressReader {
            rx,
            finished: false,
            pending: Vec::new(),
            pos: 0,
        },
    )
}

/// Writing half of the progress pipe
#[derive(Debug)]
pub struct PipeWriter {
    tx: Sender<Message>,
}

impl PipeWriter {
    fn send(&self, msg: Message) {
        // A reader that hung up does not cancel the run; its text is dropped.
        if self.tx.send(msg).is_err() {
            tracing::debug!("Progress reader dropped, discarding message");
        }
    }
}

impl ProgressSink for PipeWriter {
    fn write_line(&mut self, line: &str) {
        self.send(Message::Line(line.to_string()));
    }

    fn close(self: Box<Self>) {
        self.send(Message::Done);
    }

    fn close_with_error(self: Box<Self>, err: CleanError) {
        self.send(Message::Failed(err));
    }
}

/// Sink for quiet runs: text is dropped, the end of the run is not
#[derive(Debug)]
pub struct QuietSink {
    inner: PipeWriter,
}

impl QuietSink {
    pub fn new(inner: PipeWriter) -> Self {
        Self { inner }
    }
}

impl ProgressSink for QuietSink {
    fn write_line(&mut self, _line: &str) {}

    fn close(self: Box<Self>) {
        Box::new(self.inner).close();
    }

    fn close_with_error(self: Box<Self>, err: CleanError) {
        Box::new(self.inner).close_with_error(err);
    }
}

/// Reading half of the progress pipe, handed to the caller.
///
/// As an iterator it yields progress lines and ends with `None` after a
/// clean finish, or with a single `Err` when the run failed. It also
/// implements [`Read`] for callers that want raw text; a failed run then
/// shows up as an `io::Error` wrapping the [`CleanError`].
#[derive(Debug)]
pub struct ProgressReader {
    rx: Receiver<Message>,
    finished: bool,
    pending: Vec<u8>,
    pos: usize,
}

impl ProgressReader {
    /// Read everything, returning the collected text or the error that
    /// ended the run
    pub fn finish(self) -> Result<String, CleanError> {
        let mut out = String::new();
        for line in self {
            out.push_str(&line?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl Iterator for ProgressReader {
    type Item = Result<String, CleanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.rx.recv() {
            Ok(Message::Line(line)) => Some(Ok(line)),
            Ok(Message::Done) => {
                self.finished = true;
                None
            }
            Ok(Message::Failed(err)) => {
                self.finished = true;
                Some(Err(err))
            }
            Err(_) => {
                self.finished = true;
                Some(Err(CleanError::WorkerLost))
            }
        }
    }
}

impl Read for ProgressReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos >= self.pending.len() {
            match self.next() {
                Some(Ok(line)) => {
                    self.pending = line.into_bytes();
                    self.pending.push(b'\n');
                    self.pos = 0;
                }
                Some(Err(err)) => return Err(io::Error::other(err)),
                None => return Ok(0),
            }
        }
        let n = buf.len().min(self.pending.len() - self.pos);
        buf[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
