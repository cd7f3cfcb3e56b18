//! Structured records returned by native routines
//!
//! Each record boxes into a nested host list with a fixed layout the host
//! package relies on.

use crate::host::{HostList, HostValue, IntoHost};

/// Status code for a successful native call
pub const STATUS_OK: i32 = 0;

/// Status code for a failed or unavailable native call
pub const STATUS_FAILED: i32 = -1;

/// Run-length encoded coverage track
///
/// Boxes as a list with integer vectors `values` and `lengths`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rle {
    /// Run values
    pub values: Vec<i32>,
    /// Run lengths, same length as `values`
    pub lengths: Vec<i32>,
}

impl Rle {
    /// Create a new run-length encoding
    pub fn new(values: Vec<i32>, lengths: Vec<i32>) -> Self {
        Self { values, lengths }
    }

    /// Total number of positions covered by the runs
    pub fn span(&self) -> i64 {
        self.lengths.iter().map(|&l| l as i64).sum()
    }
}

impl IntoHost for Rle {
    fn into_host(self) -> HostValue {
        HostList::named([
            ("values", self.values.into_host()),
            ("lengths", self.lengths.into_host()),
        ])
        .into_host()
    }
}

/// Run-length encodings keyed by sequence name, in file order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RleList(pub Vec<(String, Rle)>);

impl IntoHost for RleList {
    fn into_host(self) -> HostValue {
        HostList::named(self.0.into_iter().map(|(name, rle)| (name, rle.into_host()))).into_host()
    }
}

/// Table of character columns
///
/// Boxes as a named list of character vectors carrying class `data.frame`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataFrame {
    /// `(column name, cells)` in header order; every column has the same length
    pub columns: Vec<(String, Vec<Option<String>>)>,
}

impl DataFrame {
    /// Empty frame with the given column names
    pub fn with_columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: names.into_iter().map(|n| (n.into(), Vec::new())).collect(),
        }
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |(_, cells)| cells.len())
    }

    /// Number of columns
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Cells of a column by name
    pub fn column(&self, name: &str) -> Option<&[Option<String>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, cells)| cells.as_slice())
    }

    /// Append one row, padding missing fields and dropping extra ones
    pub fn push_row<'a, I>(&mut self, fields: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut fields = fields.into_iter();
        for (_, cells) in self.columns.iter_mut() {
            cells.push(fields.next().map(str::to_string));
        }
    }
}

impl IntoHost for DataFrame {
    fn into_host(self) -> HostValue {
        HostList::named(
            self.columns
                .into_iter()
                .map(|(name, cells)| (name, HostValue::Character(cells))),
        )
        .with_class("data.frame")
        .into_host()
    }
}

/// Tables keyed by the header marker that introduced them
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableSet(pub Vec<(String, DataFrame)>);

impl TableSet {
    /// Table for a marker
    pub fn get(&self, marker: &str) -> Option<&DataFrame> {
        self.0.iter().find(|(m, _)| m == marker).map(|(_, df)| df)
    }
}

impl IntoHost for TableSet {
    fn into_host(self) -> HostValue {
        HostList::named(self.0.into_iter().map(|(marker, df)| (marker, df.into_host())))
            .into_host()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rle_boxes_as_named_list() {
        let rle = Rle::new(vec![0, 3, 0], vec![100, 20, 5]);
        assert_eq!(rle.span(), 125);

        let boxed = rle.into_host();
        let list = boxed.as_list().unwrap();
        assert_eq!(list.get("values"), Some(&HostValue::integers([0, 3, 0])));
        assert_eq!(list.get("lengths"), Some(&HostValue::integers([100, 20, 5])));
    }

    #[test]
    fn test_rle_list_names_follow_sequences() {
        let list = RleList(vec![
            ("chr1".to_string(), Rle::new(vec![1], vec![10])),
            ("chrM".to_string(), Rle::default()),
        ])
        .into_host();

        let list = list.as_list().unwrap();
        assert_eq!(
            list.names.as_deref(),
            Some(&["chr1".to_string(), "chrM".to_string()][..])
        );
    }

    #[test]
    fn test_data_frame_rows_pad_and_truncate() {
        let mut df = DataFrame::with_columns(["seqnames", "start", "end"]);
        df.push_row(["chr1", "10", "20"]);
        df.push_row(["chr2", "30"]);
        df.push_row(["chr3", "40", "50", "extra"]);

        assert_eq!(df.n_rows(), 3);
        assert_eq!(df.n_cols(), 3);
        assert_eq!(
            df.column("end").unwrap(),
            &[Some("20".to_string()), None, Some("50".to_string())]
        );
    }

    #[test]
    fn test_data_frame_class() {
        let df = DataFrame::with_columns(["a"]).into_host();
        assert_eq!(df.as_list().unwrap().class.as_deref(), Some("data.frame"));
        assert_eq!(DataFrame::default().n_rows(), 0);
    }
}
