//! Binding shims and the static call table
//!
//! Every exported routine gets a shim with the host's uniform calling
//! convention: a slice of boxed arguments in, one boxed value out. A shim
//! checks the argument count, unboxes each argument to its declared native
//! type, calls the matching [`Natives`] method exactly once, and boxes the
//! result. Unboxing failures return before the native is reached. A panic
//! inside the native is caught and surfaced as a host error.
//!
//! The shims and [`CALL_ENTRIES`] are generated together from one list, so
//! each recorded arity is the shim's parameter count by construction.

use crate::error::{Result, SpliceWizError};
use crate::host::{FromHost, HostValue, IntoHost};
use crate::natives::Natives;
use crate::types::{Rle, RleList, TableSet};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Package name used to prefix exported symbols
pub const PACKAGE: &str = "SpliceWiz";

/// Uniform shim signature
pub type ShimFn = fn(&dyn Natives, &[HostValue]) -> Result<HostValue>;

/// One row of the call table: exported name, shim, fixed arity
#[derive(Clone, Copy)]
pub struct CallMethodDef {
    /// Exported symbol name
    pub name: &'static str,
    /// Shim invoked for this symbol
    pub fun: ShimFn,
    /// Number of arguments the shim accepts
    pub arity: usize,
}

impl CallMethodDef {
    /// Invoke the shim against `natives`
    pub fn invoke(&self, natives: &dyn Natives, args: &[HostValue]) -> Result<HostValue> {
        (self.fun)(natives, args)
    }
}

impl fmt::Debug for CallMethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallMethodDef")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

fn arity_error(name: &str, expected: usize, got: usize) -> SpliceWizError {
    SpliceWizError::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Run a native call, turning a panic into [`SpliceWizError::NativePanic`]
fn guard<T>(name: &'static str, call: impl FnOnce() -> T) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(call)).map_err(|payload| SpliceWizError::NativePanic {
        name,
        message: panic_message(payload.as_ref()),
    })
}

macro_rules! count_args {
    () => { 0usize };
    ($head:ident $($tail:ident)*) => { 1usize + count_args!($($tail)*) };
}

macro_rules! call_entries {
    ($(
        $export:literal => fn $shim:ident =
            $method:ident ( $( $arg:ident : $ty:ty ),* ) -> $ret:ty ;
    )*) => {
        $(
            #[doc = concat!("Shim for `", $export, "`")]
            pub fn $shim(natives: &dyn Natives, args: &[HostValue]) -> Result<HostValue> {
                let [$($arg),*] = args else {
                    return Err(arity_error(
                        concat!("_SpliceWiz_", $export),
                        count_args!($($arg)*),
                        args.len(),
                    ));
                };
                $( let $arg = <$ty as FromHost>::from_host($arg)?; )*
                let result: $ret = guard($export, || natives.$method($($arg),*))?;
                Ok(result.into_host())
            }
        )*

        /// Every exported routine, in registration order
        pub static CALL_ENTRIES: &[CallMethodDef] = &[
            $(
                CallMethodDef {
                    name: concat!("_SpliceWiz_", $export),
                    fun: $shim,
                    arity: count_args!($($arg)*),
                },
            )*
        ];
    };
}

call_entries! {
    "SpliceWizMain_hts" => fn splicewiz_main_hts = run_pipeline_hts(
        bam_file: String, reference_file: String, output_file: String,
        verbose: bool, n_threads: i32, read_pool: i32
    ) -> i32;
    "c_BAM2COV_hts" => fn bam2cov_hts = bam_to_coverage_hts(
        bam_file: String, output_file: String, verbose: bool, n_threads: i32, read_pool: i32
    ) -> i32;
    "c_doNothing_hts" => fn do_nothing_hts = read_through_hts(
        bam_file: String, verbose: bool, n_threads: i32, read_pool: i32
    ) -> i32;
    "Has_OpenMP" => fn has_openmp = has_parallelism() -> i32;
    "Test_OpenMP_For" => fn test_openmp_for = parallel_self_test() -> i32;
    "c_Check_Cov" => fn check_cov = check_coverage(s_in: String) -> bool;
    "c_RLE_From_Cov" => fn rle_from_cov = rle_from_coverage(
        s_in: String, seqname: String, start: i32, end: i32, strand: i32
    ) -> Rle;
    "c_Cov_Seqnames" => fn cov_seqnames = coverage_seqnames(s_in: String) -> Vec<String>;
    "c_RLEList_From_Cov" => fn rlelist_from_cov = rle_list_from_coverage(
        s_in: String, strand: i32
    ) -> RleList;
    "c_gunzip_DF" => fn gunzip_df = gunzip_data_frame(
        s_in: String, s_header_begin: Vec<String>
    ) -> TableSet;
    "c_gunzip" => fn gunzip = gunzip(s_in: String, s_out: String) -> i32;
    "SpliceWizMain" => fn splicewiz_main = run_pipeline(
        bam_file: String, reference_file: String, output_file: String,
        verbose: bool, n_threads: i32, multi_read: bool
    ) -> i32;
    "SpliceWizMain_multi" => fn splicewiz_main_multi = run_pipeline_multi(
        reference_file: String, bam_files: Vec<String>, output_files: Vec<String>,
        max_threads: i32, verbose: bool, multi_read: bool
    ) -> i32;
    "c_GenerateMappabilityReads" => fn generate_mappability_reads = generate_mappability_reads(
        genome_file: String, out_fa: String, read_len: i32, read_stride: i32, error_pos: i32
    ) -> i32;
    "c_GenerateMappabilityRegions" => fn generate_mappability_regions =
        generate_mappability_regions(
            bam_file: String, output_file: String, threshold: i32, include_cov: i32,
            verbose: bool, n_threads: i32
        ) -> i32;
    "c_BAM2COV" => fn bam2cov = bam_to_coverage(
        bam_file: String, output_file: String, verbose: bool, n_threads: i32, multi_read: bool
    ) -> i32;
    "idxstats_pbam" => fn idxstats_pbam = index_stats(bam_file: String, n_threads: i32) -> i32;
}

/// Look up a call-table row by exported name
pub fn find_entry(name: &str) -> Option<&'static CallMethodDef> {
    CALL_ENTRIES.iter().find(|entry| entry.name == name)
}
