//! Compressed input: data sources, BGZF block reading, parallel decompression
//!
//! BAM files and the package's own gzipped outputs are BGZF: a series of
//! independent gzip members, each carrying its compressed size in a `BC`
//! extra subfield. Blocks are read sequentially and decompressed in batches
//! on a rayon pool, so memory stays bounded by the batch size. Plain gzip
//! has no block boundaries and is inflated as a single stream instead.

use crate::error::{Result, SpliceWizError};
use flate2::bufread::MultiGzDecoder as StreamingGzDecoder;
use flate2::read::MultiGzDecoder;
use memmap2::Mmap;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Memory-mapped file threshold (50 MB)
///
/// Below this, buffered reads are faster than setting up a mapping.
pub const MMAP_THRESHOLD: u64 = 50 * 1024 * 1024;

/// Default number of BGZF blocks decompressed per batch
///
/// Each block inflates to at most 64 KB, so a batch of 8 keeps the
/// decompressed buffer near 512 KB.
pub const PARALLEL_BLOCK_COUNT: usize = 8;

/// Fixed gzip header length preceding XLEN's payload
const GZIP_FIXED_HEADER: usize = 12;

/// gzip magic bytes
const GZIP_MAGIC: [u8; 2] = [31, 139];

/// True if `bytes` starts with the gzip magic
pub fn is_gzip_magic(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[..2] == GZIP_MAGIC
}

/// True if `bytes` opens a gzip member carrying the BGZF `BC` subfield
///
/// Only the bytes given are inspected; a header cut short is not BGZF.
pub fn is_bgzf_header(bytes: &[u8]) -> bool {
    // FLG.FEXTRA
    if !is_gzip_magic(bytes) || bytes.len() < GZIP_FIXED_HEADER || bytes[3] & 0x04 == 0 {
        return false;
    }
    let xlen = u16::from_le_bytes([bytes[10], bytes[11]]) as usize;
    let Some(extra) = bytes.get(GZIP_FIXED_HEADER..GZIP_FIXED_HEADER + xlen) else {
        return false;
    };

    let mut pos = 0;
    while pos + 4 <= extra.len() {
        let slen = u16::from_le_bytes([extra[pos + 2], extra[pos + 3]]) as usize;
        if extra[pos] == b'B' && extra[pos + 1] == b'C' && slen == 2 {
            return true;
        }
        pos += 4 + slen;
    }
    false
}

/// Where compressed input comes from
#[derive(Debug, Clone)]
pub enum DataSource {
    /// Local file path
    Local(PathBuf),
}

impl DataSource {
    /// Create a local file data source
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        DataSource::Local(path.as_ref().to_path_buf())
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        match self {
            DataSource::Local(path) => path,
        }
    }

    /// Open the data source and return a buffered reader
    pub fn open(&self) -> Result<Box<dyn BufRead + Send>> {
        self.open_with_threshold(MMAP_THRESHOLD)
    }

    /// Open, memory-mapping files at or above `mmap_threshold` bytes
    pub fn open_with_threshold(&self, mmap_threshold: u64) -> Result<Box<dyn BufRead + Send>> {
        match self {
            DataSource::Local(path) => open_local_file(path, mmap_threshold),
        }
    }
}

fn open_local_file(path: &Path, mmap_threshold: u64) -> Result<Box<dyn BufRead + Send>> {
    let file_size = std::fs::metadata(path)?.len();

    if file_size >= mmap_threshold && file_size > 0 {
        open_mmap_file(path)
    } else {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(target_os = "macos")]
fn open_mmap_file(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    use libc::{madvise, MADV_SEQUENTIAL, MADV_WILLNEED};

    let file = File::open(path)?;
    // SAFETY: the mapping is read-only and the file is not modified while
    // the reader is alive.
    let mmap = unsafe { Mmap::map(&file)? };

    // SAFETY: pointer and length come from the live mapping above.
    unsafe {
        madvise(
            mmap.as_ptr() as *mut _,
            mmap.len(),
            MADV_SEQUENTIAL | MADV_WILLNEED,
        );
    }

    Ok(Box::new(io::Cursor::new(mmap)))
}

#[cfg(not(target_os = "macos"))]
fn open_mmap_file(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path)?;
    // SAFETY: the mapping is read-only and the file is not modified while
    // the reader is alive.
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(Box::new(io::Cursor::new(mmap)))
}

/// One compressed gzip member
#[derive(Debug, Clone)]
pub(crate) struct BgzipBlock {
    data: Vec<u8>,
}

impl BgzipBlock {
    /// Compressed size in bytes
    pub(crate) fn compressed_len(&self) -> usize {
        self.data.len()
    }
}

/// Decompress a single block (plain gzip tails may hold several members)
pub(crate) fn decompress_block(block: &BgzipBlock) -> io::Result<Vec<u8>> {
    let mut decoder = MultiGzDecoder::new(&block.data[..]);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}

fn invalid_data(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

/// Read the next BGZF block from `inner`
///
/// Returns `Ok(None)` at a clean end of stream. A gzip member without the
/// `BC` subfield is not seekable BGZF, so the rest of the stream is taken as
/// one block. Callers wanting bounded memory on such input should go through
/// [`CompressedReader`], which streams it.
pub(crate) fn read_one_block<R: BufRead>(inner: &mut R) -> io::Result<Option<BgzipBlock>> {
    if inner.fill_buf()?.is_empty() {
        return Ok(None);
    }

    let mut header = [0u8; GZIP_FIXED_HEADER];
    inner.read_exact(&mut header)?;

    if !is_gzip_magic(&header) {
        return Err(invalid_data(format!(
            "Invalid gzip magic: [{}, {}]",
            header[0], header[1]
        )));
    }

    // FLG.FEXTRA
    if header[3] & 0x04 == 0 {
        let mut compressed = header.to_vec();
        inner.read_to_end(&mut compressed)?;
        return Ok(Some(BgzipBlock { data: compressed }));
    }

    let xlen = u16::from_le_bytes([header[10], header[11]]) as usize;
    let mut extra = vec![0u8; xlen];
    inner.read_exact(&mut extra)?;

    let mut bsize: Option<u16> = None;
    let mut pos = 0;
    while pos + 4 <= xlen {
        let si1 = extra[pos];
        let si2 = extra[pos + 1];
        let slen = u16::from_le_bytes([extra[pos + 2], extra[pos + 3]]) as usize;

        if si1 == b'B' && si2 == b'C' && slen == 2 {
            if pos + 6 > xlen {
                return Err(invalid_data("Incomplete BSIZE field".to_string()));
            }
            bsize = Some(u16::from_le_bytes([extra[pos + 4], extra[pos + 5]]));
            break;
        }

        pos += 4 + slen;
    }

    let Some(bsize) = bsize else {
        let mut compressed = header.to_vec();
        compressed.extend_from_slice(&extra);
        inner.read_to_end(&mut compressed)?;
        return Ok(Some(BgzipBlock { data: compressed }));
    };

    // BSIZE is total block size minus one
    let block_size = bsize as usize + 1;
    let already_read = GZIP_FIXED_HEADER + xlen;
    if block_size < already_read {
        return Err(invalid_data(format!(
            "Invalid block size: {} < {}",
            block_size, already_read
        )));
    }

    let mut data = Vec::with_capacity(block_size);
    data.extend_from_slice(&header);
    data.extend_from_slice(&extra);
    data.resize(block_size, 0);
    inner.read_exact(&mut data[already_read..])?;

    Ok(Some(BgzipBlock { data }))
}

/// Running totals kept by [`BoundedParallelBgzipReader`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecompressionStats {
    /// Blocks read from the compressed stream
    pub blocks: u64,
    /// Compressed bytes consumed
    pub compressed_bytes: u64,
    /// Decompressed bytes produced
    pub decompressed_bytes: u64,
}

/// Bounded parallel BGZF reader
///
/// Reads `batch_size` blocks, inflates them in parallel, and serves the
/// concatenated output before reading the next batch. Output order always
/// matches block order.
pub struct BoundedParallelBgzipReader<R: BufRead> {
    inner: R,
    batch_size: usize,
    pool: Option<Arc<ThreadPool>>,
    output_buffer: Vec<u8>,
    output_pos: usize,
    eof: bool,
    stats: DecompressionStats,
}

impl<R: BufRead> BoundedParallelBgzipReader<R> {
    /// Reader using the global rayon pool and the default batch size
    pub fn new(inner: R) -> Self {
        Self::with_pool(inner, None, PARALLEL_BLOCK_COUNT)
    }

    /// Reader decompressing `batch_size` blocks at a time on `pool`
    ///
    /// A batch size of zero is treated as one.
    pub fn with_pool(inner: R, pool: Option<Arc<ThreadPool>>, batch_size: usize) -> Self {
        Self {
            inner,
            batch_size: batch_size.max(1),
            pool,
            output_buffer: Vec::new(),
            output_pos: 0,
            eof: false,
            stats: DecompressionStats::default(),
        }
    }

    /// Totals so far
    pub fn stats(&self) -> DecompressionStats {
        self.stats
    }

    fn read_next_chunk(&mut self) -> io::Result<()> {
        if self.eof {
            return Ok(());
        }

        let mut blocks = Vec::with_capacity(self.batch_size);
        for _ in 0..self.batch_size {
            match read_one_block(&mut self.inner)? {
                Some(block) => blocks.push(block),
                None => {
                    self.eof = true;
                    break;
                }
            }
        }

        self.output_buffer.clear();
        self.output_pos = 0;

        if blocks.is_empty() {
            return Ok(());
        }

        let inflate = || {
            blocks
                .par_iter()
                .map(decompress_block)
                .collect::<io::Result<Vec<_>>>()
        };
        let decompressed = match &self.pool {
            Some(pool) => pool.install(inflate)?,
            None => inflate()?,
        };

        self.stats.blocks += blocks.len() as u64;
        self.stats.compressed_bytes += blocks
            .iter()
            .map(|b| b.compressed_len() as u64)
            .sum::<u64>();

        for block_data in decompressed {
            self.output_buffer.extend_from_slice(&block_data);
        }
        self.stats.decompressed_bytes += self.output_buffer.len() as u64;

        Ok(())
    }
}

impl<R: BufRead> Read for BoundedParallelBgzipReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // Empty BGZF EOF markers produce empty batches; keep reading past them
        while self.output_pos >= self.output_buffer.len() {
            if self.eof {
                return Ok(0);
            }
            self.read_next_chunk()?;
        }

        let available = self.output_buffer.len() - self.output_pos;
        let to_copy = available.min(buf.len());
        buf[..to_copy]
            .copy_from_slice(&self.output_buffer[self.output_pos..self.output_pos + to_copy]);
        self.output_pos += to_copy;

        Ok(to_copy)
    }
}

/// Compressed file reader
///
/// BGZF input goes through [`BoundedParallelBgzipReader`]. Other gzip input
/// is inflated as one stream. Anything else is passed through.
pub struct CompressedReader {
    inner: Box<dyn BufRead + Send>,
    bgzf: bool,
}

impl CompressedReader {
    /// Open `source` with the global pool and default batch size
    pub fn new(source: DataSource) -> Result<Self> {
        Self::with_pool(source, None, PARALLEL_BLOCK_COUNT, MMAP_THRESHOLD)
    }

    /// Open `source`, decompressing `batch_size` blocks at a time on `pool`
    pub fn with_pool(
        source: DataSource,
        pool: Option<Arc<ThreadPool>>,
        batch_size: usize,
        mmap_threshold: u64,
    ) -> Result<Self> {
        let reader = source.open_with_threshold(mmap_threshold)?;
        Self::from_reader(reader, pool, batch_size)
    }

    /// Wrap an already open reader, sniffing its format from the first bytes
    pub fn from_reader(
        mut reader: Box<dyn BufRead + Send>,
        pool: Option<Arc<ThreadPool>>,
        batch_size: usize,
    ) -> Result<Self> {
        let head = reader.fill_buf()?;
        let (bgzf, gzip) = (is_bgzf_header(head), is_gzip_magic(head));

        if bgzf {
            let parallel_reader = BoundedParallelBgzipReader::with_pool(reader, pool, batch_size);
            Ok(Self {
                inner: Box::new(BufReader::new(parallel_reader)),
                bgzf: true,
            })
        } else if gzip {
            Ok(Self {
                inner: Box::new(BufReader::new(StreamingGzDecoder::new(reader))),
                bgzf: false,
            })
        } else {
            Ok(Self {
                inner: reader,
                bgzf: false,
            })
        }
    }

    /// Whether input is decompressed as parallel BGZF blocks
    pub fn is_bgzf(&self) -> bool {
        self.bgzf
    }

    /// Get the inner buffered reader
    pub fn into_inner(self) -> Box<dyn BufRead + Send> {
        self.inner
    }
}

impl Read for CompressedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for CompressedReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}

/// Require gzip magic at the start of `source`
pub fn ensure_gzip(source: &DataSource) -> Result<()> {
    let mut reader = source.open()?;
    if is_gzip_magic(reader.fill_buf()?) {
        Ok(())
    } else {
        Err(SpliceWizError::Compression(format!(
            "{} is not gzip or BGZF compressed",
            source.path().display()
        )))
    }
}
