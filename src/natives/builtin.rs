//! Built-in native backend

use super::gunzip::{gunzip, gunzip_data_frame};
use super::parallel::{available_threads, self_test, SELF_TEST_ITERATIONS};
use super::read_through::read_through;
use super::Natives;
use crate::config::NativeConfig;
use crate::error::Result;
use crate::types::{Rle, RleList, TableSet, STATUS_FAILED, STATUS_OK};
use log::Level;
use std::path::Path;

/// Natives implemented in this crate
///
/// Routines that need the alignment engine (BAM record processing,
/// coverage-file decoding, mappability) log an error and return their
/// failure value.
#[derive(Debug, Clone, Default)]
pub struct BuiltinNatives {
    config: NativeConfig,
}

impl BuiltinNatives {
    /// Backend with explicit limits
    pub fn new(config: NativeConfig) -> Self {
        Self { config }
    }

    /// Backend configured from the environment
    pub fn from_env() -> Self {
        Self::new(NativeConfig::from_env())
    }

    /// Active configuration
    pub fn config(&self) -> &NativeConfig {
        &self.config
    }
}

fn level(verbose: bool) -> Level {
    if verbose {
        Level::Info
    } else {
        Level::Debug
    }
}

/// Collapse a native result into a status code, logging the failure
fn status<T>(routine: &str, result: Result<T>) -> i32 {
    match result {
        Ok(_) => STATUS_OK,
        Err(e) => {
            log::error!("{}: {}", routine, e);
            STATUS_FAILED
        }
    }
}

fn unavailable(routine: &str) -> i32 {
    log::error!(
        "{} requires the alignment engine, which is not linked into this module",
        routine
    );
    STATUS_FAILED
}

impl Natives for BuiltinNatives {
    fn run_pipeline_hts(
        &self,
        _bam_file: String,
        _reference_file: String,
        _output_file: String,
        _verbose: bool,
        _n_threads: i32,
        _read_pool: i32,
    ) -> i32 {
        unavailable("SpliceWizMain_hts")
    }

    fn bam_to_coverage_hts(
        &self,
        _bam_file: String,
        _output_file: String,
        _verbose: bool,
        _n_threads: i32,
        _read_pool: i32,
    ) -> i32 {
        unavailable("c_BAM2COV_hts")
    }

    fn read_through_hts(
        &self,
        bam_file: String,
        verbose: bool,
        n_threads: i32,
        read_pool: i32,
    ) -> i32 {
        let result = read_through(Path::new(&bam_file), n_threads, read_pool, &self.config);
        if let Ok(stats) = &result {
            log::log!(
                level(verbose),
                "{}: {} blocks, {} compressed bytes, {} decompressed bytes",
                bam_file,
                stats.blocks,
                stats.compressed_bytes,
                stats.decompressed_bytes
            );
        }
        status("c_doNothing_hts", result)
    }

    fn has_parallelism(&self) -> i32 {
        available_threads().min(self.config.max_threads).max(1) as i32
    }

    fn parallel_self_test(&self) -> i32 {
        match self_test(&self.config, SELF_TEST_ITERATIONS) {
            Ok(report) if report.passed() => {
                log::info!(
                    "parallel self-test passed: {} of {} threads ran iterations",
                    report.threads_observed,
                    report.pool_threads
                );
                STATUS_OK
            }
            Ok(report) => {
                log::error!(
                    "parallel self-test failed: sum {} != expected {}",
                    report.sum,
                    report.expected
                );
                STATUS_FAILED
            }
            Err(e) => status("Test_OpenMP_For", Err::<(), _>(e)),
        }
    }

    fn check_coverage(&self, _cov_file: String) -> bool {
        unavailable("c_Check_Cov");
        false
    }

    fn rle_from_coverage(
        &self,
        _cov_file: String,
        _seqname: String,
        _start: i32,
        _end: i32,
        _strand: i32,
    ) -> Rle {
        unavailable("c_RLE_From_Cov");
        Rle::default()
    }

    fn coverage_seqnames(&self, _cov_file: String) -> Vec<String> {
        unavailable("c_Cov_Seqnames");
        Vec::new()
    }

    fn rle_list_from_coverage(&self, _cov_file: String, _strand: i32) -> RleList {
        unavailable("c_RLEList_From_Cov");
        RleList::default()
    }

    fn gunzip_data_frame(&self, gz_file: String, header_markers: Vec<String>) -> TableSet {
        gunzip_data_frame(Path::new(&gz_file), &header_markers, &self.config).unwrap_or_else(|e| {
            log::error!("c_gunzip_DF: {}: {}", gz_file, e);
            TableSet::default()
        })
    }

    fn gunzip(&self, gz_file: String, output_file: String) -> i32 {
        let result = gunzip(Path::new(&gz_file), Path::new(&output_file), &self.config);
        if let Ok(bytes) = &result {
            log::debug!("{} -> {} ({} bytes)", gz_file, output_file, bytes);
        }
        status("c_gunzip", result)
    }

    fn run_pipeline(
        &self,
        _bam_file: String,
        _reference_file: String,
        _output_file: String,
        _verbose: bool,
        _n_threads: i32,
        _multi_read: bool,
    ) -> i32 {
        unavailable("SpliceWizMain")
    }

    fn run_pipeline_multi(
        &self,
        _reference_file: String,
        bam_files: Vec<String>,
        output_files: Vec<String>,
        _max_threads: i32,
        _verbose: bool,
        _multi_read: bool,
    ) -> i32 {
        if bam_files.len() != output_files.len() {
            log::error!(
                "SpliceWizMain_multi: {} BAM files but {} output files",
                bam_files.len(),
                output_files.len()
            );
            return STATUS_FAILED;
        }
        unavailable("SpliceWizMain_multi")
    }

    fn generate_mappability_reads(
        &self,
        _genome_file: String,
        _out_fa: String,
        _read_len: i32,
        _read_stride: i32,
        _error_pos: i32,
    ) -> i32 {
        unavailable("c_GenerateMappabilityReads")
    }

    fn generate_mappability_regions(
        &self,
        _bam_file: String,
        _output_file: String,
        _threshold: i32,
        _include_cov: i32,
        _verbose: bool,
        _n_threads: i32,
    ) -> i32 {
        unavailable("c_GenerateMappabilityRegions")
    }

    fn bam_to_coverage(
        &self,
        _bam_file: String,
        _output_file: String,
        _verbose: bool,
        _n_threads: i32,
        _multi_read: bool,
    ) -> i32 {
        unavailable("c_BAM2COV")
    }

    fn index_stats(&self, _bam_file: String, _n_threads: i32) -> i32 {
        unavailable("idxstats_pbam")
    }
}
