//! Whole-file decompression and sectioned report tables
//!
//! Report files are gzipped text made of sections. Each section starts with
//! a header line whose first tab-separated field is a marker naming the
//! section; every field of that line, marker included, names a column.
//! Data rows follow until a blank line, the end of the file, or the next
//! marker line.

use crate::config::NativeConfig;
use crate::error::Result;
use crate::io::compression::{CompressedReader, DataSource};
use crate::types::{DataFrame, TableSet};
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

fn open_reader(input: &Path, config: &NativeConfig) -> Result<CompressedReader> {
    CompressedReader::with_pool(
        DataSource::from_path(input),
        None,
        config.read_pool,
        config.mmap_threshold,
    )
}

/// Decompress `input` into `output`, returning the number of bytes written
///
/// Plain (uncompressed) input is copied through unchanged.
pub fn gunzip(input: &Path, output: &Path, config: &NativeConfig) -> Result<u64> {
    let mut reader = open_reader(input, config)?;
    let mut writer = BufWriter::new(File::create(output)?);
    let written = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    Ok(written)
}

/// Decode the sections named by `markers` from a gzipped report
///
/// The result has one table per marker, in `markers` order. A marker that
/// never appears yields an empty table, and a repeated marker gets a copy of
/// the same table. Short rows are padded with missing values and extra
/// fields are dropped.
pub fn gunzip_data_frame(
    input: &Path,
    markers: &[String],
    config: &NativeConfig,
) -> Result<TableSet> {
    let reader = open_reader(input, config)?;
    read_sections(reader, markers)
}

/// Section parser over any buffered reader
pub fn read_sections<R: BufRead>(reader: R, markers: &[String]) -> Result<TableSet> {
    let mut tables: Vec<Option<DataFrame>> = vec![None; markers.len()];
    let mut current: Option<usize> = None;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end_matches('\r');

        if line.is_empty() {
            current = None;
            continue;
        }

        let first = line.split('\t').next().unwrap_or_default();
        if let Some(idx) = markers.iter().position(|m| m == first) {
            current = None;
            if tables[idx].is_none() {
                tables[idx] = Some(DataFrame::with_columns(line.split('\t')));
                current = Some(idx);
            }
            continue;
        }

        if let Some(df) = current.and_then(|idx| tables[idx].as_mut()) {
            df.push_row(line.split('\t'));
        }
    }

    let found = tables.iter().filter(|t| t.is_some()).count();
    log::debug!("decoded {} of {} requested sections", found, markers.len());

    // Sections are stored at each marker's first index
    Ok(TableSet(
        markers
            .iter()
            .enumerate()
            .map(|(idx, marker)| {
                let first = markers.iter().position(|m| m == marker).unwrap_or(idx);
                (marker.clone(), tables[first].clone().unwrap_or_default())
            })
            .collect(),
    ))
}
