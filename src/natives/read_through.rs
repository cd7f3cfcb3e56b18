//! BAM read-through diagnostic
//!
//! Pulls a BAM through the same threaded BGZF pipeline the alignment engine
//! uses and throws the bytes away. Timing this call isolates decompression
//! and disk throughput from record processing.

use crate::config::NativeConfig;
use crate::error::{Result, SpliceWizError};
use crate::io::compression::{
    ensure_gzip, BoundedParallelBgzipReader, DataSource, DecompressionStats,
};
use crate::natives::parallel::build_pool;
use std::io::{self, Read};
use std::path::Path;

/// BAM magic at the start of the decompressed stream
pub const BAM_MAGIC: &[u8; 4] = b"BAM\x01";

/// Decompress `bam_file` on `n_threads` workers, `read_pool` blocks per batch
///
/// Only the BAM magic is checked; records are not decoded.
pub fn read_through(
    bam_file: &Path,
    n_threads: i32,
    read_pool: i32,
    config: &NativeConfig,
) -> Result<DecompressionStats> {
    let source = DataSource::from_path(bam_file);
    ensure_gzip(&source)?;

    let threads = config.threads(n_threads);
    let batch = config.read_pool(read_pool);
    let pool = build_pool(threads)?;
    log::debug!(
        "reading {} with {} threads, {} blocks per batch",
        bam_file.display(),
        threads,
        batch
    );

    let inner = source.open_with_threshold(config.mmap_threshold)?;
    let mut reader = BoundedParallelBgzipReader::with_pool(inner, Some(pool), batch);

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            SpliceWizError::Compression(format!("{} is empty", bam_file.display()))
        }
        _ => SpliceWizError::Io(e),
    })?;
    if &magic != BAM_MAGIC {
        return Err(SpliceWizError::Compression(format!(
            "{} is BGZF but not BAM",
            bam_file.display()
        )));
    }

    io::copy(&mut reader, &mut io::sink())?;
    Ok(reader.stats())
}
