//! I/O module: compressed input for the built-in natives
//!
//! BAM files and the package's gzipped report tables are both read through
//! [`CompressedReader`], which inflates BGZF blocks in bounded parallel
//! batches and streams plain gzip.

pub mod compression;

pub use compression::{
    BoundedParallelBgzipReader, CompressedReader, DataSource, DecompressionStats, MMAP_THRESHOLD,
    PARALLEL_BLOCK_COUNT,
};
