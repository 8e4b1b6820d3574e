//! Column normalization: flatten a two-level header, check it against the expected
//! raw layout and rename to the canonical output names.
//!
//! Every step takes its input table by value and returns a new one.

use crate::constants::HEADER_SEPARATOR;
use crate::error::{Result, ScraperError};
use crate::parser::{FlatTable, Header, RawTable, Table};
use crate::registry::ColumnSchema;

/// Join the outer and inner label of each column with `_`, keeping column order.
pub fn flatten(table: RawTable) -> Result<FlatTable> {
    let (header, rows) = table.into_parts();
    match header {
        Header::Levels(levels) if levels.len() == 2 => {
            let columns = levels[0]
                .iter()
                .zip(&levels[1])
                .map(|(outer, inner)| format!("{outer}{HEADER_SEPARATOR}{inner}"))
                .collect();
            Ok(Table::new(Header::Flat(columns), rows))
        }
        other => Err(ScraperError::NotMultiLevel {
            levels: other.depth(),
        }),
    }
}

/// Replace the column names positionally.
pub fn rename<S: AsRef<str>>(table: FlatTable, names: &[S]) -> Result<FlatTable> {
    let (header, rows) = table.into_parts();
    let columns = match header {
        Header::Flat(columns) => columns,
        Header::Levels(_) => return Err(ScraperError::HeaderNotFlat),
    };
    if columns.len() != names.len() {
        return Err(ScraperError::ColumnCountMismatch {
            expected: names.len(),
            actual: columns.len(),
        });
    }
    let renamed = names.iter().map(|n| n.as_ref().to_string()).collect();
    Ok(Table::new(Header::Flat(renamed), rows))
}

/// flatten, check against the schema's raw header, rename, check the canonical header.
///
/// A header that differs from the schema means the page layout changed; that is a
/// `SchemaDrift`, never a silent coercion.
pub fn normalize(table: RawTable, schema: &ColumnSchema) -> Result<FlatTable> {
    let flat = flatten(table)?;
    expect_columns(&flat, &schema.joined_raw_headers(), "flatten")?;

    let renamed = rename(flat, schema.canonical_names())?;
    expect_columns(&renamed, schema.canonical_names(), "rename")?;
    Ok(renamed)
}

fn expect_columns(table: &FlatTable, expected: &[String], stage: &'static str) -> Result<()> {
    let actual = table.columns().unwrap_or_default();
    if actual != expected {
        return Err(ScraperError::SchemaDrift {
            stage,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{builtin_schema, SamplingInterval, SchemaClass};

    fn levels(outer: &[&str], inner: &[&str]) -> Header {
        Header::Levels(vec![
            outer.iter().map(|s| s.to_string()).collect(),
            inner.iter().map(|s| s.to_string()).collect(),
        ])
    }

    fn rich_10_minutes_table() -> RawTable {
        let schema = builtin_schema(SchemaClass::Rich, SamplingInterval::TenMinutes);
        let (outer, inner): (Vec<String>, Vec<String>) =
            schema.raw_header_parts().iter().cloned().unzip();
        let row: Vec<String> = (0..schema.len()).map(|i| i.to_string()).collect();
        Table::new(Header::Levels(vec![outer, inner]), vec![row])
    }

    #[test]
    fn test_flatten_joins_levels_in_order() {
        let table = Table::new(levels(&["時分", "気圧(hPa)"], &["時分", "現地"]), vec![]);
        let flat = flatten(table).unwrap();
        assert_eq!(flat.columns().unwrap(), ["時分_時分", "気圧(hPa)_現地"]);
        assert_eq!(flat.width(), 2);
    }

    #[test]
    fn test_flatten_rejects_flat_and_deep_headers() {
        let flat = Table::new(Header::Flat(vec!["a".into()]), vec![]);
        assert!(matches!(flatten(flat), Err(ScraperError::NotMultiLevel { levels: 1 })));

        let deep = Table::new(
            Header::Levels(vec![vec!["a".into()], vec!["b".into()], vec!["c".into()]]),
            vec![],
        );
        assert!(matches!(flatten(deep), Err(ScraperError::NotMultiLevel { levels: 3 })));
    }

    #[test]
    fn test_rename_checks_count() {
        let table = Table::new(Header::Flat(vec!["a".into(), "b".into()]), vec![]);
        let err = rename(table, &["x"]).unwrap_err();
        assert!(matches!(
            err,
            ScraperError::ColumnCountMismatch { expected: 1, actual: 2 }
        ));
    }

    #[test]
    fn test_rename_requires_flat_header() {
        let table = Table::new(levels(&["a"], &["b"]), vec![]);
        assert!(matches!(rename(table, &["x"]), Err(ScraperError::HeaderNotFlat)));
    }

    #[test]
    fn test_rename_keeps_rows() {
        let table = Table::new(
            Header::Flat(vec!["a".into(), "b".into()]),
            vec![vec!["1".into(), "2".into()]],
        );
        let renamed = rename(table, &["x", "y"]).unwrap();
        assert_eq!(renamed.columns().unwrap(), ["x", "y"]);
        assert_eq!(renamed.rows()[0], vec!["1", "2"]);
    }

    #[test]
    fn test_normalize_to_canonical_names() {
        let schema = builtin_schema(SchemaClass::Rich, SamplingInterval::TenMinutes);
        let normalized = normalize(rich_10_minutes_table(), &schema).unwrap();
        assert_eq!(normalized.columns().unwrap(), schema.canonical_names());
        assert_eq!(normalized.len(), 1);
    }

    #[test]
    fn test_normalize_twice_is_not_multi_level() {
        let schema = builtin_schema(SchemaClass::Rich, SamplingInterval::TenMinutes);
        let normalized = normalize(rich_10_minutes_table(), &schema).unwrap();
        assert!(matches!(
            normalize(normalized, &schema),
            Err(ScraperError::NotMultiLevel { levels: 1 })
        ));
    }

    #[test]
    fn test_normalize_detects_drift() {
        let schema = builtin_schema(SchemaClass::Rich, SamplingInterval::TenMinutes);
        let sparse = builtin_schema(SchemaClass::Sparse, SamplingInterval::TenMinutes);
        let (outer, inner): (Vec<String>, Vec<String>) =
            sparse.raw_header_parts().iter().cloned().unzip();
        let table = Table::new(Header::Levels(vec![outer, inner]), vec![]);
        match normalize(table, &schema) {
            Err(ScraperError::SchemaDrift { stage, expected, actual }) => {
                assert_eq!(stage, "flatten");
                assert_eq!(expected.len(), 11);
                assert_eq!(actual.len(), 9);
            }
            other => panic!("expected drift, got {other:?}"),
        }
    }
}
