//! Output Emitter
//!
//! Destinations for rendered source text: an in-memory string, or any
//! [`io::Write`] (a file, stdout).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Trait for emitting generated source.
///
/// The renderer writes to an emitter line by line. Indentation is one tab
/// per level, which is what the formatter produces as well.
pub trait Emitter {
    /// Emit a text fragment.
    fn emit(&mut self, text: &str);

    /// Emit a newline (Unix-style `\n`).
    fn emit_newline(&mut self);

    /// Emit indentation (one tab per level).
    fn emit_indent(&mut self, level: usize);
}

/// String-based emitter for in-memory rendering.
#[derive(Default)]
pub struct StringEmitter {
    buffer: String,
}

impl StringEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: String::with_capacity(capacity),
        }
    }

    pub fn output(self) -> String {
        self.buffer
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Ensure the output ends with a single newline.
    pub fn ensure_trailing_newline(&mut self) {
        if !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
        }
    }

    /// Remove trailing blank lines, including the final newline.
    ///
    /// Pair with [`ensure_trailing_newline`](Self::ensure_trailing_newline).
    pub fn trim_trailing_blank_lines(&mut self) {
        let kept = self.buffer.trim_end().len();
        self.buffer.truncate(kept);
    }
}

impl Emitter for StringEmitter {
    fn emit(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn emit_newline(&mut self) {
        self.buffer.push('\n');
    }

    fn emit_indent(&mut self, level: usize) {
        for _ in 0..level {
            self.buffer.push('\t');
        }
    }
}

/// Emitter over any writer.
///
/// The first write error is kept and later writes are dropped; callers
/// learn about it from [`finish`](Self::finish).
pub struct WriteEmitter<W: Write> {
    writer: W,
    error: Option<io::Error>,
}

/// File-backed emitter with buffering.
pub type FileEmitter = WriteEmitter<BufWriter<File>>;

impl FileEmitter {
    /// Create (or truncate) the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(WriteEmitter::new(BufWriter::new(file)))
    }
}

impl<W: Write> WriteEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.writer.write_all(bytes) {
            self.error = Some(err);
        }
    }

    /// Flush and hand back the writer.
    ///
    /// # Errors
    ///
    /// Returns the first error seen while emitting, or the flush error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> Emitter for WriteEmitter<W> {
    fn emit(&mut self, text: &str) {
        self.write(text.as_bytes());
    }

    fn emit_newline(&mut self) {
        self.write(b"\n");
    }

    fn emit_indent(&mut self, level: usize) {
        for _ in 0..level {
            self.write(b"\t");
        }
    }
}
