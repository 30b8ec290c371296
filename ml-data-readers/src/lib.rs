//! File utilities for ML data processing
//!
//! This crate provides helpers that inspect the text files a pipeline reads,
//! such as counting the records of newline-delimited files to size a dataset,
//! and a dataset yielding those records line by line.

#![warn(missing_docs)]

mod error;
mod filenames;
pub mod lines;
pub mod text;

pub use error::{Error, Result};
pub use filenames::Filenames;
pub use lines::{
    count_file_lines, count_file_lines_with_options, count_lines, count_reader_lines,
    LineCountOptions,
};
pub use text::TextLineDataset;
