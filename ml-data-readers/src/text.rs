//! Line-oriented text datasets
//!
//! A [`TextLineDataset`] yields every line of its files as a
//! [`Value::String`], without the line terminator. Files are opened one at a
//! time, in order, as a pass reaches them.
//!
//! Lines end where [`count_file_lines`](crate::lines::count_file_lines) ends
//! them: at `\n`, `\r\n` or a lone `\r` with universal newlines, at `\n` only
//! without. The number of records therefore equals the counted lines.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use ml_data_core::dataset::RecordIter;
use ml_data_core::error::Result as CoreResult;
use ml_data_core::{Dataset, Value};

use crate::filenames::Filenames;

/// A dataset of the lines of one or several text files
#[derive(Debug, Clone)]
pub struct TextLineDataset {
    files: Filenames,

    /// Treat `\r\n` and a lone `\r` as line terminators, in addition to `\n`
    universal_newlines: bool,
}

impl TextLineDataset {
    /// Create a dataset over `files`, read in the given order
    pub fn new(files: impl Into<Filenames>) -> Self {
        Self {
            files: files.into(),
            universal_newlines: true,
        }
    }

    /// Set whether `\r\n` and a lone `\r` end a line (on by default)
    #[must_use]
    pub fn universal_newlines(mut self, enabled: bool) -> Self {
        self.universal_newlines = enabled;
        self
    }

    /// The files of this dataset
    pub fn files(&self) -> &Filenames {
        &self.files
    }
}

impl Dataset for TextLineDataset {
    fn iter(&self) -> RecordIter<'_> {
        let universal_newlines = self.universal_newlines;
        Box::new(
            self.files
                .iter()
                .flat_map(move |path| TextLineIter::new(path, universal_newlines)),
        )
    }
}

/// Lines of a single file, opened on first use
struct TextLineIter {
    /// File path
    path: PathBuf,

    universal_newlines: bool,

    /// File reader, `None` before opening and after the end
    reader: Option<BufReader<File>>,

    /// Whether the file was opened already
    opened: bool,

    /// Reused read buffer, one `\n`-terminated chunk at a time
    buffer: Vec<u8>,

    /// Lines split from the last chunk, not yet yielded
    pending: VecDeque<String>,
}

impl TextLineIter {
    fn new(path: &Path, universal_newlines: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            universal_newlines,
            reader: None,
            opened: false,
            buffer: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    /// Split one chunk read up to and including `\n` into its lines
    fn split_chunk(&mut self) -> io::Result<()> {
        let mut chunk = self.buffer.as_slice();

        let terminated = chunk.last() == Some(&b'\n');
        if terminated {
            chunk = &chunk[..chunk.len() - 1];
        }

        if !self.universal_newlines {
            self.pending.push_back(decode(chunk)?);
            return Ok(());
        }

        // `\r\n` always lands in one chunk, and a trailing `\r` at end of file
        // terminates the last line
        if chunk.last() == Some(&b'\r') {
            chunk = &chunk[..chunk.len() - 1];
        }

        for line in chunk.split(|&b| b == b'\r') {
            self.pending.push_back(decode(line)?);
        }

        Ok(())
    }
}

fn decode(bytes: &[u8]) -> io::Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
}

impl Iterator for TextLineIter {
    type Item = CoreResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.opened {
            self.opened = true;
            match File::open(&self.path) {
                Ok(file) => self.reader = Some(BufReader::new(file)),
                Err(e) => return Some(Err(e.into())),
            }
        }

        loop {
            if let Some(line) = self.pending.pop_front() {
                return Some(Ok(Value::String(line)));
            }

            let reader = self.reader.as_mut()?;
            self.buffer.clear();

            let result = match reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => {
                    // End of file, release the handle
                    self.reader = None;
                    return None;
                }
                Ok(_) => self.split_chunk(),
                Err(e) => Err(e),
            };

            if let Err(e) = result {
                self.reader = None;
                self.pending.clear();
                return Some(Err(e.into()));
            }
        }
    }
}
