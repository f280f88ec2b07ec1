//! Background draining of child process pipes with bounded capture.

use std::io::{Read, Write};
use std::thread::JoinHandle;

use crate::OutputMode;

/// Capture buffer with a byte cap. Input past the cap is discarded but the
/// stream keeps being drained so the child never blocks on a full pipe.
struct LimitedBuffer {
    buf: Vec<u8>,
    max_bytes: usize,
    truncated: bool,
}

impl LimitedBuffer {
    fn new(max_bytes: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_bytes,
            truncated: false,
        }
    }

    fn push(&mut self, data: &[u8]) {
        let remaining = self.max_bytes.saturating_sub(self.buf.len());
        if remaining >= data.len() {
            self.buf.extend_from_slice(data);
        } else {
            self.buf.extend_from_slice(&data[..remaining]);
            self.truncated = true;
        }
    }

    fn into_string(self) -> String {
        let mut out = String::from_utf8_lossy(&self.buf).into_owned();
        if self.truncated {
            out.push_str("\n...[truncated]");
        }
        out
    }
}

/// Handle on a drain thread; `join` returns the captured text.
pub(crate) struct Drain {
    handle: JoinHandle<String>,
}

impl Drain {
    pub(crate) fn join(self) -> String {
        self.handle.join().unwrap_or_default()
    }
}

/// Drain a child pipe on a background thread, capturing up to
/// `max_capture_bytes` and mirroring to the parent's stdout or stderr when
/// the mode streams.
pub(crate) fn spawn_drain<R: Read + Send + 'static>(
    mut pipe: R,
    mode: OutputMode,
    max_capture_bytes: usize,
    to_stderr: bool,
) -> Drain {
    let handle = std::thread::spawn(move || {
        let mut buffer = LimitedBuffer::new(max_capture_bytes);
        let mut chunk = [0u8; 8192];
        loop {
            match pipe.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let data = &chunk[..n];
                    buffer.push(data);
                    if mode.streams() {
                        if to_stderr {
                            let _ = std::io::stderr().write_all(data);
                        } else {
                            let _ = std::io::stdout().write_all(data);
                        }
                    }
                }
            }
        }
        buffer.into_string()
    });
    Drain { handle }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limited_buffer_under_cap() {
        let mut buf = LimitedBuffer::new(10);
        buf.push(b"hello");
        assert_eq!(buf.into_string(), "hello");
    }

    #[test]
    fn limited_buffer_over_cap_marks_truncation() {
        let mut buf = LimitedBuffer::new(4);
        buf.push(b"hello world");
        let out = buf.into_string();
        assert!(out.starts_with("hell"));
        assert!(out.ends_with("...[truncated]"));
    }

    #[test]
    fn limited_buffer_exact_cap_not_truncated() {
        let mut buf = LimitedBuffer::new(5);
        buf.push(b"hello");
        assert_eq!(buf.into_string(), "hello");
    }

    #[test]
    fn drain_reads_to_eof() {
        let data: &[u8] = b"stream contents";
        let drain = spawn_drain(data, OutputMode::Capture, 1024, false);
        assert_eq!(drain.join(), "stream contents");
    }
}
