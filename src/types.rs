use crate::error::{Result, ScraperError};
use crate::parser::FlatTable;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Final output of the pipeline: ordered rows keyed by canonical column name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecordSet {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl NormalizedRecordSet {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn record(&self, index: usize) -> Option<Record<'_>> {
        self.rows.get(index).map(|values| Record {
            columns: &self.columns,
            values,
        })
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(|values| Record {
            columns: &self.columns,
            values,
        })
    }

    /// Raw cell rows in column order
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

impl TryFrom<FlatTable> for NormalizedRecordSet {
    type Error = ScraperError;

    fn try_from(table: FlatTable) -> Result<Self> {
        let columns = table
            .columns()
            .ok_or(ScraperError::HeaderNotFlat)?
            .to_vec();
        let (_, rows) = table.into_parts();
        Ok(Self { columns, rows })
    }
}

impl Serialize for NormalizedRecordSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.records())
    }
}

/// One row of a [`NormalizedRecordSet`]
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    columns: &'a [String],
    values: &'a [String],
}

impl<'a> Record<'a> {
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// What the fetch capability produced for one address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success { raw_text: String },
    Failure { reason: String },
}

impl From<Result<String>> for FetchOutcome {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(raw_text) => FetchOutcome::Success { raw_text },
            Err(ScraperError::FetchFailed(reason)) => FetchOutcome::Failure { reason },
            Err(e) => FetchOutcome::Failure {
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Header, Table};

    fn record_set() -> NormalizedRecordSet {
        let table = Table::new(
            Header::Flat(vec!["時分".into(), "気温(ºC)".into()]),
            vec![
                vec!["00:10".into(), "3.1".into()],
                vec!["00:20".into(), "2.9".into()],
            ],
        );
        NormalizedRecordSet::try_from(table).unwrap()
    }

    #[test]
    fn test_records_are_keyed_by_column() {
        let set = record_set();
        assert_eq!(set.len(), 2);
        let second = set.record(1).unwrap();
        assert_eq!(second.get("気温(ºC)"), Some("2.9"));
        assert_eq!(second.get("missing"), None);
    }

    #[test]
    fn test_serializes_as_ordered_maps() {
        let json = serde_json::to_string(&record_set()).unwrap();
        assert_eq!(
            json,
            r#"[{"時分":"00:10","気温(ºC)":"3.1"},{"時分":"00:20","気温(ºC)":"2.9"}]"#
        );
    }

    #[test]
    fn test_multi_level_table_is_rejected() {
        let table = Table::new(Header::Levels(vec![vec!["a".into()], vec!["b".into()]]), vec![]);
        assert!(matches!(
            NormalizedRecordSet::try_from(table),
            Err(ScraperError::HeaderNotFlat)
        ));
    }

    #[test]
    fn test_fetch_outcome_keeps_reason() {
        let result: Result<String> = Err(ScraperError::FetchFailed("HTTP 503".into()));
        let outcome = FetchOutcome::from(result);
        assert_eq!(outcome, FetchOutcome::Failure { reason: "HTTP 503".into() });
    }
}
