//! Line counting for newline-delimited text files
//!
//! Counting follows text-mode reading: a final line without a terminator still
//! counts, and an empty file has zero lines.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filenames::Filenames;

/// Options for line counting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineCountOptions {
    /// Treat `\r\n` and a lone `\r` as line terminators, in addition to `\n`
    pub universal_newlines: bool,

    /// Whether to fail on files that are not valid UTF-8
    pub validate_utf8: bool,

    /// Buffer size for reading
    pub buffer_size: usize,
}

impl Default for LineCountOptions {
    fn default() -> Self {
        Self {
            universal_newlines: true,
            validate_utf8: true,
            buffer_size: 64 * 1024, // 64KB
        }
    }
}

/// Count the lines of one or several files
///
/// Fails on the first file that cannot be opened or read.
pub fn count_file_lines(filenames: impl Into<Filenames>) -> Result<usize> {
    count_file_lines_with_options(filenames, &LineCountOptions::default())
}

/// Count the lines of one or several files with explicit options
pub fn count_file_lines_with_options(
    filenames: impl Into<Filenames>,
    options: &LineCountOptions,
) -> Result<usize> {
    let filenames = filenames.into();

    let mut total = 0;
    for path in filenames.iter() {
        total += count_path_lines(path, options)?;
    }

    tracing::debug!(files = filenames.len(), lines = total, "counted file lines");
    Ok(total)
}

/// Count the lines of a single file
pub fn count_lines(path: impl AsRef<Path>) -> Result<usize> {
    count_path_lines(path.as_ref(), &LineCountOptions::default())
}

fn count_path_lines(path: &Path, options: &LineCountOptions) -> Result<usize> {
    if options.buffer_size == 0 {
        return Err(Error::InvalidArgument(
            "buffer_size must be greater than 0".into(),
        ));
    }

    let file = File::open(path)?;
    let reader = BufReader::with_capacity(options.buffer_size, file);

    let lines = count_reader_lines(reader, options).map_err(|e| match e {
        Error::Format(msg) => Error::Format(format!("{}: {msg}", path.display())),
        other => other,
    })?;

    tracing::trace!(path = %path.display(), lines, "counted lines");
    Ok(lines)
}

/// Count the lines produced by a reader
pub fn count_reader_lines<R: BufRead>(mut reader: R, options: &LineCountOptions) -> Result<usize> {
    let mut counter = LineCounter::new(options);

    loop {
        let chunk = match reader.fill_buf() {
            Ok(chunk) => chunk,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        if chunk.is_empty() {
            break;
        }

        counter.feed(chunk)?;
        let len = chunk.len();
        reader.consume(len);
    }

    counter.finish()
}

/// Incremental line counter over a byte stream
struct LineCounter {
    universal_newlines: bool,
    validate_utf8: bool,

    /// Completed lines so far
    lines: usize,

    /// Last byte was a `\r` terminator, so a following `\n` belongs to it
    pending_cr: bool,

    /// Bytes seen since the last terminator
    in_line: bool,

    /// Incomplete UTF-8 sequence at the end of the previous chunk
    utf8_tail: Vec<u8>,

    /// Total bytes fed
    offset: usize,
}

impl LineCounter {
    fn new(options: &LineCountOptions) -> Self {
        Self {
            universal_newlines: options.universal_newlines,
            validate_utf8: options.validate_utf8,
            lines: 0,
            pending_cr: false,
            in_line: false,
            utf8_tail: Vec::new(),
            offset: 0,
        }
    }

    fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        if self.validate_utf8 {
            self.validate(chunk)?;
        }
        self.offset += chunk.len();

        for &byte in chunk {
            match byte {
                b'\n' => {
                    if !self.pending_cr {
                        self.lines += 1;
                    }
                    self.pending_cr = false;
                    self.in_line = false;
                }
                b'\r' if self.universal_newlines => {
                    self.lines += 1;
                    self.pending_cr = true;
                    self.in_line = false;
                }
                _ => {
                    self.pending_cr = false;
                    self.in_line = true;
                }
            }
        }

        Ok(())
    }

    fn validate(&mut self, chunk: &[u8]) -> Result<()> {
        let start = self.offset - self.utf8_tail.len();
        let joined;
        let bytes = if self.utf8_tail.is_empty() {
            chunk
        } else {
            let mut buf = std::mem::take(&mut self.utf8_tail);
            buf.extend_from_slice(chunk);
            joined = buf;
            joined.as_slice()
        };

        if let Err(e) = std::str::from_utf8(bytes) {
            if e.error_len().is_some() {
                return Err(Error::Format(format!(
                    "invalid UTF-8 at byte {}",
                    start + e.valid_up_to()
                )));
            }
            // sequence cut by the chunk boundary, completed by the next chunk
            self.utf8_tail = bytes[e.valid_up_to()..].to_vec();
        }

        Ok(())
    }

    fn finish(self) -> Result<usize> {
        if !self.utf8_tail.is_empty() {
            return Err(Error::Format(format!(
                "truncated UTF-8 sequence at byte {}",
                self.offset - self.utf8_tail.len()
            )));
        }

        Ok(self.lines + usize::from(self.in_line))
    }
}
