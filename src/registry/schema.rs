//! Raw header layouts and canonical output names per (schema class, interval).
//!
//! Only the 10-minute layouts are checked against captured pages. The hourly, daily,
//! 5-day and 10-day tables model each page as exactly two header levels. A page that
//! groups its columns deeper (daily pages nest 降水量 → 最大 → 1時間) fails in
//! `normalize::flatten` with `NotMultiLevel`, which the pipeline records as
//! `ExtractFailed` instead of writing mislabelled columns.

use super::interval::SamplingInterval;
use super::site::SchemaClass;
use crate::constants::HEADER_SEPARATOR;
use crate::error::{Result, ScraperError};

/// Expected two-level header of a page and the names its columns get in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    raw_header_parts: Vec<(String, String)>,
    canonical_names: Vec<String>,
}

impl ColumnSchema {
    pub fn new(raw_header_parts: Vec<(String, String)>, canonical_names: Vec<String>) -> Result<Self> {
        if raw_header_parts.len() != canonical_names.len() {
            return Err(ScraperError::ColumnCountMismatch {
                expected: raw_header_parts.len(),
                actual: canonical_names.len(),
            });
        }
        Ok(Self {
            raw_header_parts,
            canonical_names,
        })
    }

    /// Builds from `(outer, inner, canonical)` triples, which keeps both sides the same length.
    pub fn from_columns(columns: &[(&str, &str, &str)]) -> Self {
        let (raw_header_parts, canonical_names): (Vec<_>, Vec<_>) = columns
            .iter()
            .map(|(outer, inner, canonical)| {
                ((outer.to_string(), inner.to_string()), canonical.to_string())
            })
            .unzip();
        Self {
            raw_header_parts,
            canonical_names,
        }
    }

    pub fn raw_header_parts(&self) -> &[(String, String)] {
        &self.raw_header_parts
    }

    /// The raw header as it reads after flattening
    pub fn joined_raw_headers(&self) -> Vec<String> {
        self.raw_header_parts
            .iter()
            .map(|(outer, inner)| format!("{outer}{HEADER_SEPARATOR}{inner}"))
            .collect()
    }

    pub fn canonical_names(&self) -> &[String] {
        &self.canonical_names
    }

    pub fn len(&self) -> usize {
        self.canonical_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical_names.is_empty()
    }
}

const WIND: &str = "風向・風速(m/s)";
const PRESSURE: &str = "気圧(hPa)";

const RICH_10_MINUTES: &[(&str, &str, &str)] = &[
    ("時分", "時分", "時分"),
    (PRESSURE, "現地", "現地_気圧(hPa)"),
    (PRESSURE, "海面", "海面_気圧(hPa)"),
    ("降水量 (mm)", "降水量 (mm)", "降水量(mm)"),
    ("気温 (℃)", "気温 (℃)", "気温(ºC)"),
    ("相対湿度 (％)", "相対湿度 (％)", "相対湿度(%)"),
    (WIND, "平均", "平均_風速(m/s)"),
    (WIND, "風向", "平均_風速(m/s)_風向"),
    (WIND, "最大瞬間", "最大瞬間_風速(m/s)"),
    (WIND, "風向.1", "最大瞬間_風速(m/s)_風向"),
    ("日照 時間 (分)", "日照 時間 (分)", "日照時間(min)"),
];

const SPARSE_10_MINUTES: &[(&str, &str, &str)] = &[
    ("時分", "時分", "時分"),
    ("降水量 (mm)", "降水量 (mm)", "降水量(mm)"),
    ("気温 (℃)", "気温 (℃)", "気温(ºC)"),
    ("相対湿度 (％)", "相対湿度 (％)", "相対湿度(%)"),
    (WIND, "平均", "平均_風速(m/s)"),
    (WIND, "風向", "平均_風速(m/s)_風向"),
    (WIND, "最大瞬間", "最大瞬間_風速(m/s)"),
    (WIND, "風向.1", "最大瞬間_風速(m/s)_風向"),
    ("日照 時間 (分)", "日照 時間 (分)", "日照時間(min)"),
];

const RICH_HOURLY: &[(&str, &str, &str)] = &[
    ("時", "時", "時"),
    (PRESSURE, "現地", "現地_気圧(hPa)"),
    (PRESSURE, "海面", "海面_気圧(hPa)"),
    ("降水量 (mm)", "降水量 (mm)", "降水量(mm)"),
    ("気温 (℃)", "気温 (℃)", "気温(ºC)"),
    ("露点 温度 (℃)", "露点 温度 (℃)", "露点温度(ºC)"),
    ("蒸気圧 (hPa)", "蒸気圧 (hPa)", "蒸気圧(hPa)"),
    ("湿度 (％)", "湿度 (％)", "湿度(%)"),
    (WIND, "風速", "風速(m/s)"),
    (WIND, "風向", "風速(m/s)_風向"),
    ("日照 時間 (h)", "日照 時間 (h)", "日照時間(h)"),
    ("全天 日射量 (MJ/㎡)", "全天 日射量 (MJ/㎡)", "全天日射量(MJ/m2)"),
    ("雪(cm)", "降雪", "降雪(cm)"),
    ("雪(cm)", "積雪", "積雪(cm)"),
    ("天気", "天気", "天気"),
    ("雲量", "雲量", "雲量"),
    ("視程 (km)", "視程 (km)", "視程(km)"),
];

const SPARSE_HOURLY: &[(&str, &str, &str)] = &[
    ("時", "時", "時"),
    ("降水量 (mm)", "降水量 (mm)", "降水量(mm)"),
    ("気温 (℃)", "気温 (℃)", "気温(ºC)"),
    ("露点 温度 (℃)", "露点 温度 (℃)", "露点温度(ºC)"),
    ("蒸気圧 (hPa)", "蒸気圧 (hPa)", "蒸気圧(hPa)"),
    ("湿度 (％)", "湿度 (％)", "湿度(%)"),
    (WIND, "平均風速", "平均_風速(m/s)"),
    (WIND, "風向", "平均_風速(m/s)_風向"),
    ("日照 時間 (h)", "日照 時間 (h)", "日照時間(h)"),
    ("雪(cm)", "降雪", "降雪(cm)"),
    ("雪(cm)", "積雪", "積雪(cm)"),
];

const RICH_DAILY: &[(&str, &str, &str)] = &[
    ("日", "日", "日"),
    (PRESSURE, "現地平均", "現地平均_気圧(hPa)"),
    (PRESSURE, "海面平均", "海面平均_気圧(hPa)"),
    ("降水量(mm)", "合計", "合計_降水量(mm)"),
    ("降水量(mm)", "最大1時間", "最大1時間_降水量(mm)"),
    ("降水量(mm)", "最大10分間", "最大10分間_降水量(mm)"),
    ("気温(℃)", "平均", "平均_気温(ºC)"),
    ("気温(℃)", "最高", "最高_気温(ºC)"),
    ("気温(℃)", "最低", "最低_気温(ºC)"),
    ("湿度(％)", "平均", "平均_湿度(%)"),
    ("湿度(％)", "最小", "最小_湿度(%)"),
    (WIND, "平均風速", "平均_風速(m/s)"),
    (WIND, "最大風速", "最大_風速(m/s)"),
    (WIND, "風向", "最大_風速(m/s)_風向"),
    (WIND, "最大瞬間風速", "最大瞬間_風速(m/s)"),
    (WIND, "風向.1", "最大瞬間_風速(m/s)_風向"),
    ("日照 時間 (h)", "日照 時間 (h)", "日照時間(h)"),
];

const SPARSE_DAILY: &[(&str, &str, &str)] = &[
    ("日", "日", "日"),
    ("降水量(mm)", "合計", "合計_降水量(mm)"),
    ("降水量(mm)", "最大1時間", "最大1時間_降水量(mm)"),
    ("降水量(mm)", "最大10分間", "最大10分間_降水量(mm)"),
    ("気温(℃)", "平均", "平均_気温(ºC)"),
    ("気温(℃)", "最高", "最高_気温(ºC)"),
    ("気温(℃)", "最低", "最低_気温(ºC)"),
    (WIND, "平均風速", "平均_風速(m/s)"),
    (WIND, "最大風速", "最大_風速(m/s)"),
    (WIND, "風向", "最大_風速(m/s)_風向"),
    (WIND, "最大瞬間風速", "最大瞬間_風速(m/s)"),
    (WIND, "風向.1", "最大瞬間_風速(m/s)_風向"),
    ("日照 時間 (h)", "日照 時間 (h)", "日照時間(h)"),
];

/// Five-day and ten-day pages share a layout; only the bucket label differs.
fn bucket_columns(bucket: &'static str, class: SchemaClass) -> Vec<(&'static str, &'static str, &'static str)> {
    let mut columns = vec![(bucket, bucket, bucket)];
    if class == SchemaClass::Rich {
        columns.push((PRESSURE, "現地平均", "現地平均_気圧(hPa)"));
        columns.push((PRESSURE, "海面平均", "海面平均_気圧(hPa)"));
    }
    columns.extend([
        ("降水量(mm)", "合計", "合計_降水量(mm)"),
        ("降水量(mm)", "日最大", "日最大_降水量(mm)"),
        ("気温(℃)", "平均", "平均_気温(ºC)"),
        ("気温(℃)", "日最高の平均", "日最高平均_気温(ºC)"),
        ("気温(℃)", "日最低の平均", "日最低平均_気温(ºC)"),
    ]);
    if class == SchemaClass::Rich {
        columns.push(("湿度(％)", "平均", "平均_湿度(%)"));
    }
    columns.extend([
        ("風速(m/s)", "平均", "平均_風速(m/s)"),
        ("日照 時間 (h)", "日照 時間 (h)", "日照時間(h)"),
    ]);
    columns
}

/// The column schema a page of the given class and interval is expected to have
pub fn builtin_schema(class: SchemaClass, interval: SamplingInterval) -> ColumnSchema {
    match (class, interval) {
        (SchemaClass::Rich, SamplingInterval::TenMinutes) => ColumnSchema::from_columns(RICH_10_MINUTES),
        (SchemaClass::Sparse, SamplingInterval::TenMinutes) => ColumnSchema::from_columns(SPARSE_10_MINUTES),
        (SchemaClass::Rich, SamplingInterval::Hourly) => ColumnSchema::from_columns(RICH_HOURLY),
        (SchemaClass::Sparse, SamplingInterval::Hourly) => ColumnSchema::from_columns(SPARSE_HOURLY),
        (SchemaClass::Rich, SamplingInterval::Daily) => ColumnSchema::from_columns(RICH_DAILY),
        (SchemaClass::Sparse, SamplingInterval::Daily) => ColumnSchema::from_columns(SPARSE_DAILY),
        (class, SamplingInterval::FiveDay) => ColumnSchema::from_columns(&bucket_columns("半旬", class)),
        (class, SamplingInterval::TenDay) => ColumnSchema::from_columns(&bucket_columns("旬", class)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rich_10_minutes_joined_headers() {
        let schema = builtin_schema(SchemaClass::Rich, SamplingInterval::TenMinutes);
        let joined = schema.joined_raw_headers();
        assert_eq!(joined.len(), 11);
        assert_eq!(joined[0], "時分_時分");
        assert_eq!(joined[1], "気圧(hPa)_現地");
        assert_eq!(joined[9], "風向・風速(m/s)_風向.1");
        assert_eq!(schema.canonical_names()[10], "日照時間(min)");
    }

    #[test]
    fn test_every_schema_has_unique_names() {
        for class in [SchemaClass::Rich, SchemaClass::Sparse] {
            for interval in SamplingInterval::ALL {
                let schema = builtin_schema(class, interval);
                assert!(!schema.is_empty());
                assert_eq!(schema.raw_header_parts().len(), schema.len());
                let raw: HashSet<String> = schema.joined_raw_headers().into_iter().collect();
                let canonical: HashSet<&String> = schema.canonical_names().iter().collect();
                assert_eq!(raw.len(), schema.len(), "{class:?}/{interval}");
                assert_eq!(canonical.len(), schema.len(), "{class:?}/{interval}");
            }
        }
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let err = ColumnSchema::new(
            vec![("a".into(), "b".into())],
            vec!["x".into(), "y".into()],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScraperError::ColumnCountMismatch { expected: 1, actual: 2 }
        ));
    }
}
