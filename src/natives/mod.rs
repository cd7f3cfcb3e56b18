//! Native routines behind the exported entry points
//!
//! [`Natives`] has one method per exported routine, with parameters in the
//! exported order and already unboxed. The binding shims call exactly one
//! method per host call and box whatever it returns. Failures inside a
//! native are reported through its return value (status codes, `false`,
//! empty records), never as host errors.
//!
//! [`BuiltinNatives`] implements the decompression, parallelism and
//! read-through routines in this crate. Alignment processing, coverage-file
//! decoding and mappability generation belong to an external engine; the
//! built-in backend reports them as unavailable.

mod builtin;
pub mod gunzip;
pub mod parallel;
pub mod read_through;

pub use builtin::BuiltinNatives;

use crate::types::{Rle, RleList, TableSet};

/// Native implementations of every exported routine
pub trait Natives: Send + Sync {
    /// Process one BAM against a reference, with an explicit read pool
    fn run_pipeline_hts(
        &self,
        bam_file: String,
        reference_file: String,
        output_file: String,
        verbose: bool,
        n_threads: i32,
        read_pool: i32,
    ) -> i32;

    /// Write a coverage file from a BAM, with an explicit read pool
    fn bam_to_coverage_hts(
        &self,
        bam_file: String,
        output_file: String,
        verbose: bool,
        n_threads: i32,
        read_pool: i32,
    ) -> i32;

    /// Read a BAM end to end and discard it (I/O diagnostic)
    fn read_through_hts(&self, bam_file: String, verbose: bool, n_threads: i32, read_pool: i32)
        -> i32;

    /// Worker threads available to natives, at least 1
    fn has_parallelism(&self) -> i32;

    /// Run a parallel loop and verify its result
    fn parallel_self_test(&self) -> i32;

    /// True if the file is a readable coverage file
    fn check_coverage(&self, cov_file: String) -> bool;

    /// Coverage of one region as a run-length encoding
    fn rle_from_coverage(
        &self,
        cov_file: String,
        seqname: String,
        start: i32,
        end: i32,
        strand: i32,
    ) -> Rle;

    /// Sequence names stored in a coverage file
    fn coverage_seqnames(&self, cov_file: String) -> Vec<String>;

    /// Whole-file coverage as one run-length encoding per sequence
    fn rle_list_from_coverage(&self, cov_file: String, strand: i32) -> RleList;

    /// Decompress a sectioned, tab-delimited report into tables
    fn gunzip_data_frame(&self, gz_file: String, header_markers: Vec<String>) -> TableSet;

    /// Decompress a gzip/BGZF file to a plain file
    fn gunzip(&self, gz_file: String, output_file: String) -> i32;

    /// Process one BAM against a reference
    fn run_pipeline(
        &self,
        bam_file: String,
        reference_file: String,
        output_file: String,
        verbose: bool,
        n_threads: i32,
        multi_read: bool,
    ) -> i32;

    /// Process many BAMs against one reference
    fn run_pipeline_multi(
        &self,
        reference_file: String,
        bam_files: Vec<String>,
        output_files: Vec<String>,
        max_threads: i32,
        verbose: bool,
        multi_read: bool,
    ) -> i32;

    /// Write synthetic reads tiling a genome, for mappability alignment
    fn generate_mappability_reads(
        &self,
        genome_file: String,
        out_fa: String,
        read_len: i32,
        read_stride: i32,
        error_pos: i32,
    ) -> i32;

    /// Derive low-mappability regions from aligned synthetic reads
    fn generate_mappability_regions(
        &self,
        bam_file: String,
        output_file: String,
        threshold: i32,
        include_cov: i32,
        verbose: bool,
        n_threads: i32,
    ) -> i32;

    /// Write a coverage file from a BAM
    fn bam_to_coverage(
        &self,
        bam_file: String,
        output_file: String,
        verbose: bool,
        n_threads: i32,
        multi_read: bool,
    ) -> i32;

    /// Per-reference read counts from a BAM
    fn index_stats(&self, bam_file: String, n_threads: i32) -> i32;
}
