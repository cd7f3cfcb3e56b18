//! Integration tests for the binding shims and the call table
//!
//! A recording backend stands in for the natives so each test can check
//! exactly which native calls a shim made, and with which arguments.

use splicewiz_native::{
    HostList, HostValue, NativeModule, Natives, NA_INTEGER, Rle, RleList, SpliceWizError, TableSet,
    CALL_ENTRIES, DataFrame,
};
use std::sync::Mutex;

/// One observed native call
#[derive(Debug, Clone, PartialEq)]
struct Call {
    routine: &'static str,
    args: Vec<String>,
}

#[derive(Default)]
struct RecordingNatives {
    calls: Mutex<Vec<Call>>,
}

impl RecordingNatives {
    fn record(&self, routine: &'static str, args: Vec<String>) {
        self.calls.lock().unwrap().push(Call { routine, args });
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

macro_rules! args {
    ($($a:expr),* $(,)?) => { vec![$(format!("{:?}", $a)),*] };
}

impl Natives for RecordingNatives {
    fn run_pipeline_hts(&self, a: String, b: String, c: String, d: bool, e: i32, f: i32) -> i32 {
        self.record("run_pipeline_hts", args![a, b, c, d, e, f]);
        0
    }

    fn bam_to_coverage_hts(&self, a: String, b: String, c: bool, d: i32, e: i32) -> i32 {
        self.record("bam_to_coverage_hts", args![a, b, c, d, e]);
        0
    }

    fn read_through_hts(&self, a: String, b: bool, c: i32, d: i32) -> i32 {
        self.record("read_through_hts", args![a, b, c, d]);
        0
    }

    fn has_parallelism(&self) -> i32 {
        self.record("has_parallelism", args![]);
        8
    }

    fn parallel_self_test(&self) -> i32 {
        self.record("parallel_self_test", args![]);
        0
    }

    fn check_coverage(&self, a: String) -> bool {
        self.record("check_coverage", args![a]);
        true
    }

    fn rle_from_coverage(&self, a: String, b: String, c: i32, d: i32, e: i32) -> Rle {
        self.record("rle_from_coverage", args![a, b, c, d, e]);
        Rle::new(vec![0, 7], vec![c, d - c])
    }

    fn coverage_seqnames(&self, a: String) -> Vec<String> {
        self.record("coverage_seqnames", args![a]);
        vec!["chr1".to_string(), "chrX".to_string()]
    }

    fn rle_list_from_coverage(&self, a: String, b: i32) -> RleList {
        self.record("rle_list_from_coverage", args![a, b]);
        RleList(vec![("chr1".to_string(), Rle::new(vec![b], vec![10]))])
    }

    fn gunzip_data_frame(&self, a: String, b: Vec<String>) -> TableSet {
        self.record("gunzip_data_frame", args![a, b]);
        TableSet(
            b.into_iter()
                .map(|marker| (marker.clone(), DataFrame::with_columns([marker])))
                .collect(),
        )
    }

    fn gunzip(&self, a: String, b: String) -> i32 {
        self.record("gunzip", args![a, b]);
        0
    }

    fn run_pipeline(&self, a: String, b: String, c: String, d: bool, e: i32, f: bool) -> i32 {
        self.record("run_pipeline", args![a, b, c, d, e, f]);
        0
    }

    fn run_pipeline_multi(
        &self,
        a: String,
        b: Vec<String>,
        c: Vec<String>,
        d: i32,
        e: bool,
        f: bool,
    ) -> i32 {
        self.record("run_pipeline_multi", args![a, b, c, d, e, f]);
        0
    }

    fn generate_mappability_reads(&self, a: String, b: String, c: i32, d: i32, e: i32) -> i32 {
        self.record("generate_mappability_reads", args![a, b, c, d, e]);
        0
    }

    fn generate_mappability_regions(
        &self,
        a: String,
        b: String,
        c: i32,
        d: i32,
        e: bool,
        f: i32,
    ) -> i32 {
        self.record("generate_mappability_regions", args![a, b, c, d, e, f]);
        0
    }

    fn bam_to_coverage(&self, a: String, b: String, c: bool, d: i32, e: bool) -> i32 {
        self.record("bam_to_coverage", args![a, b, c, d, e]);
        0
    }

    fn index_stats(&self, a: String, b: i32) -> i32 {
        self.record("index_stats", args![a, b]);
        -1
    }
}

fn s(v: &str) -> HostValue {
    HostValue::string(v)
}

fn i(v: i32) -> HostValue {
    HostValue::integer(v)
}

fn b(v: bool) -> HostValue {
    HostValue::logical(v)
}

/// Well-typed arguments and the native each entry should reach
fn well_typed_calls() -> Vec<(&'static str, Vec<HostValue>, &'static str)> {
    vec![
        (
            "_SpliceWiz_SpliceWizMain_hts",
            vec![s("a.bam"), s("ref.gz"), s("out"), b(true), i(4), i(1000)],
            "run_pipeline_hts",
        ),
        (
            "_SpliceWiz_c_BAM2COV_hts",
            vec![s("a.bam"), s("a.cov"), b(false), i(2), i(500)],
            "bam_to_coverage_hts",
        ),
        (
            "_SpliceWiz_c_doNothing_hts",
            vec![s("a.bam"), b(true), i(2), i(8)],
            "read_through_hts",
        ),
        ("_SpliceWiz_Has_OpenMP", vec![], "has_parallelism"),
        ("_SpliceWiz_Test_OpenMP_For", vec![], "parallel_self_test"),
        ("_SpliceWiz_c_Check_Cov", vec![s("a.cov")], "check_coverage"),
        (
            "_SpliceWiz_c_RLE_From_Cov",
            vec![s("a.cov"), s("chr1"), i(100), i(250), i(2)],
            "rle_from_coverage",
        ),
        ("_SpliceWiz_c_Cov_Seqnames", vec![s("a.cov")], "coverage_seqnames"),
        (
            "_SpliceWiz_c_RLEList_From_Cov",
            vec![s("a.cov"), i(1)],
            "rle_list_from_coverage",
        ),
        (
            "_SpliceWiz_c_gunzip_DF",
            vec![s("report.txt.gz"), HostValue::strings(["BAM_report", "QC"])],
            "gunzip_data_frame",
        ),
        (
            "_SpliceWiz_c_gunzip",
            vec![s("in.gz"), s("out.txt")],
            "gunzip",
        ),
        (
            "_SpliceWiz_SpliceWizMain",
            vec![s("a.bam"), s("ref.gz"), s("out"), b(false), i(1), b(true)],
            "run_pipeline",
        ),
        (
            "_SpliceWiz_SpliceWizMain_multi",
            vec![
                s("ref.gz"),
                HostValue::strings(["a.bam", "b.bam"]),
                HostValue::strings(["a", "b"]),
                i(2),
                b(false),
                b(false),
            ],
            "run_pipeline_multi",
        ),
        (
            "_SpliceWiz_c_GenerateMappabilityReads",
            vec![s("genome.fa"), s("reads.fa"), i(70), i(10), i(35)],
            "generate_mappability_reads",
        ),
        (
            "_SpliceWiz_c_GenerateMappabilityRegions",
            vec![s("aligned.bam"), s("regions"), i(4), i(0), b(false), i(2)],
            "generate_mappability_regions",
        ),
        (
            "_SpliceWiz_c_BAM2COV",
            vec![s("a.bam"), s("a.cov"), b(false), i(1), b(true)],
            "bam_to_coverage",
        ),
        (
            "_SpliceWiz_idxstats_pbam",
            vec![s("a.bam"), i(2)],
            "index_stats",
        ),
    ]
}

#[test]
fn test_every_entry_is_covered() {
    let calls = well_typed_calls();
    assert_eq!(calls.len(), CALL_ENTRIES.len());
    for entry in CALL_ENTRIES {
        let (_, args, _) = calls
            .iter()
            .find(|(name, _, _)| *name == entry.name)
            .unwrap_or_else(|| panic!("no test arguments for {}", entry.name));
        assert_eq!(args.len(), entry.arity, "arity of {}", entry.name);
    }
}

#[test]
fn test_well_typed_call_reaches_native_exactly_once() {
    for (name, args, routine) in well_typed_calls() {
        let module = NativeModule::init(RecordingNatives::default()).unwrap();
        module.call(name, &args).unwrap();

        let calls = module.natives().calls();
        assert_eq!(calls.len(), 1, "{} made {} native calls", name, calls.len());
        assert_eq!(calls[0].routine, routine);
        assert_eq!(calls[0].args.len(), args.len());
    }
}

#[test]
fn test_arguments_forwarded_unmodified_in_order() {
    let module = NativeModule::init(RecordingNatives::default()).unwrap();
    module
        .call(
            "_SpliceWiz_SpliceWizMain_multi",
            &[
                s("ref.gz"),
                HostValue::strings(["a.bam", "b.bam"]),
                HostValue::strings(["a", "b"]),
                i(3),
                b(true),
                b(false),
            ],
        )
        .unwrap();

    let calls = module.natives().calls();
    assert_eq!(
        calls[0].args,
        vec![
            "\"ref.gz\"",
            "[\"a.bam\", \"b.bam\"]",
            "[\"a\", \"b\"]",
            "3",
            "true",
            "false"
        ]
    );
}

#[test]
fn test_wrong_type_fails_before_native() {
    let module = NativeModule::init(RecordingNatives::default()).unwrap();

    // n_threads given as a string
    let err = module
        .call(
            "_SpliceWiz_c_BAM2COV",
            &[s("a.bam"), s("a.cov"), b(false), s("four"), b(true)],
        )
        .unwrap_err();
    assert!(matches!(err, SpliceWizError::TypeMismatch { .. }));

    // path given as a length-2 vector
    let err = module
        .call("_SpliceWiz_c_Check_Cov", &[HostValue::strings(["a", "b"])])
        .unwrap_err();
    assert!(matches!(err, SpliceWizError::ExtentMismatch { .. }));

    // a list where a string vector is expected
    let err = module
        .call(
            "_SpliceWiz_c_gunzip_DF",
            &[s("x.gz"), HostValue::List(HostList::default())],
        )
        .unwrap_err();
    assert!(matches!(err, SpliceWizError::TypeMismatch { .. }));

    assert!(module.natives().calls().is_empty());
}

#[test]
fn test_wrong_arity_fails_before_native() {
    let module = NativeModule::init(RecordingNatives::default()).unwrap();

    let err = module.call("_SpliceWiz_c_gunzip", &[s("in.gz")]).unwrap_err();
    match err {
        SpliceWizError::ArityMismatch {
            name,
            expected,
            got,
        } => {
            assert_eq!(name, "_SpliceWiz_c_gunzip");
            assert_eq!(expected, 2);
            assert_eq!(got, 1);
        }
        other => panic!("unexpected error {other:?}"),
    }

    // Shims check the count themselves when invoked directly
    let entry = CALL_ENTRIES
        .iter()
        .find(|e| e.name == "_SpliceWiz_Has_OpenMP")
        .unwrap();
    let natives = RecordingNatives::default();
    assert!(entry.invoke(&natives, &[i(1)]).is_err());

    assert!(module.natives().calls().is_empty());
    assert!(natives.calls().is_empty());
}

#[test]
fn test_results_boxed() {
    let module = NativeModule::init(RecordingNatives::default()).unwrap();

    assert_eq!(
        module.call("_SpliceWiz_Has_OpenMP", &[]).unwrap(),
        HostValue::integer(8)
    );
    assert_eq!(
        module.call("_SpliceWiz_c_Check_Cov", &[s("a.cov")]).unwrap(),
        HostValue::logical(true)
    );
    assert_eq!(
        module.call("_SpliceWiz_c_Cov_Seqnames", &[s("a.cov")]).unwrap(),
        HostValue::strings(["chr1", "chrX"])
    );

    let rle = module
        .call(
            "_SpliceWiz_c_RLE_From_Cov",
            &[s("a.cov"), s("chr1"), i(100), i(250), i(2)],
        )
        .unwrap();
    let rle = rle.as_list().unwrap();
    assert_eq!(rle.get("values"), Some(&HostValue::integers([0, 7])));
    assert_eq!(rle.get("lengths"), Some(&HostValue::integers([100, 150])));

    let tables = module
        .call(
            "_SpliceWiz_c_gunzip_DF",
            &[s("r.gz"), HostValue::strings(["QC"])],
        )
        .unwrap();
    let qc = tables.as_list().unwrap().get("QC").unwrap().as_list().unwrap();
    assert_eq!(qc.class.as_deref(), Some("data.frame"));
}

#[test]
fn test_numeric_coercion_at_the_boundary() {
    let module = NativeModule::init(RecordingNatives::default()).unwrap();
    module
        .call(
            "_SpliceWiz_idxstats_pbam",
            &[s("a.bam"), HostValue::double(4.0)],
        )
        .unwrap();
    assert_eq!(module.natives().calls()[0].args, vec!["\"a.bam\"", "4"]);
}

#[test]
fn test_missing_values_reach_native_in_host_encoding() {
    let module = NativeModule::init(RecordingNatives::default()).unwrap();
    module
        .call(
            "_SpliceWiz_idxstats_pbam",
            &[s("x.bam"), HostValue::Integer(vec![None])],
        )
        .unwrap();
    module
        .call(
            "_SpliceWiz_c_doNothing_hts",
            &[s("a.bam"), HostValue::Logical(vec![None]), i(1), i(1)],
        )
        .unwrap();

    let calls = module.natives().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].args, vec!["\"x.bam\"".to_string(), NA_INTEGER.to_string()]);
    assert_eq!(calls[1].args, vec!["\"a.bam\"", "true", "1", "1"]);
}

#[test]
fn test_atomic_header_vector_coerced_to_strings() {
    let module = NativeModule::init(RecordingNatives::default()).unwrap();
    let result = module
        .call("_SpliceWiz_c_gunzip_DF", &[s("x.gz"), HostValue::integers([1])])
        .unwrap();

    let calls = module.natives().calls();
    assert_eq!(calls[0].routine, "gunzip_data_frame");
    assert_eq!(calls[0].args, vec!["\"x.gz\"", "[\"1\"]"]);
    assert!(result.as_list().unwrap().get("1").is_some());
}
