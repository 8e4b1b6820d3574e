//! Table extraction from a JMA past-data page.
//!
//! The observation table carries the id `tablefix1`. Its header is one or more rows of
//! `<th>` cells whose `rowspan`/`colspan` describe grouped columns; these are expanded so
//! every column has a label on every header level.

pub mod table;

pub use table::{FlatTable, Header, RawTable, Table};

use crate::constants::TABLE_ID_MARKER;
use crate::error::{Result, ScraperError};
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

// Browsers clamp spans to these as well
const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 1000;

#[derive(Debug)]
struct Cell {
    text: String,
    is_header: bool,
    rowspan: usize,
    colspan: usize,
}

#[derive(Debug)]
struct Row {
    in_thead: bool,
    cells: Vec<Cell>,
}

/// Locate the single observation table of a page and read it into a [`RawTable`].
pub fn extract_table(page: &str) -> Result<RawTable> {
    let document = Html::parse_document(page);
    let marker = Selector::parse(&format!("[id=\"{TABLE_ID_MARKER}\"]")).unwrap();
    let fragment = document
        .select(&marker)
        .next()
        .ok_or(ScraperError::TableNotFound(TABLE_ID_MARKER))?;

    let table = single_table(fragment)?;
    let rows = read_rows(table);
    let header_rows = count_header_rows(&rows);
    let grid = expand_spans(rows.into_iter().map(|r| r.cells).collect());
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);

    let mut grid: Vec<Vec<String>> = grid
        .into_iter()
        .map(|mut row| {
            row.resize(width, String::new());
            row
        })
        .collect();
    let body = grid.split_off(header_rows.min(grid.len()));
    let header = build_header(grid, width);

    debug!(
        "extracted table: header_levels={} columns={} rows={}",
        header.depth(),
        width,
        body.len()
    );
    Ok(Table::new(header, body))
}

/// The marked element must hold exactly one table (itself or a single descendant).
fn single_table(fragment: ElementRef<'_>) -> Result<ElementRef<'_>> {
    let table_selector = Selector::parse("table").unwrap();
    let mut tables: Vec<ElementRef> = fragment.select(&table_selector).collect();
    if fragment.value().name() == "table" && !tables.iter().any(|t| t.id() == fragment.id()) {
        tables.insert(0, fragment);
    }
    match tables.len() {
        0 => Err(ScraperError::TableNotFound(TABLE_ID_MARKER)),
        1 => Ok(tables[0]),
        n => Err(ScraperError::AmbiguousTable(n)),
    }
}

fn read_rows(table: ElementRef<'_>) -> Vec<Row> {
    let row_selector = Selector::parse("tr").unwrap();
    table
        .select(&row_selector)
        .map(|tr| {
            let in_thead = tr
                .parent()
                .and_then(|p| p.value().as_element().map(|e| e.name() == "thead"))
                .unwrap_or(false);
            let cells = tr
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|c| matches!(c.value().name(), "th" | "td"))
                .map(|c| Cell {
                    text: cell_text(c),
                    is_header: c.value().name() == "th",
                    rowspan: span_attr(c, "rowspan", MAX_ROWSPAN),
                    colspan: span_attr(c, "colspan", MAX_COLSPAN),
                })
                .collect();
            Row { in_thead, cells }
        })
        .filter(|row| !row.cells.is_empty())
        .collect()
}

/// Rows of a `<thead>` if there is one, else the leading rows made only of `<th>`.
fn count_header_rows(rows: &[Row]) -> usize {
    if rows.iter().any(|r| r.in_thead) {
        return rows.iter().take_while(|r| r.in_thead).count();
    }
    rows.iter()
        .take_while(|r| r.cells.iter().all(|c| c.is_header))
        .count()
}

/// Text content with `<br>` and whitespace runs collapsed to single spaces.
fn cell_text(cell: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in cell.descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if e.name() == "br" => text.push(' '),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn span_attr(cell: ElementRef<'_>, name: &str, max: usize) -> usize {
    cell.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .map_or(1, |n| n.min(max))
}

/// Lay cells out on a grid, copying spanned cells into every position they cover.
fn expand_spans(rows: Vec<Vec<Cell>>) -> Vec<Vec<String>> {
    // Per column: text still hanging down from a rowspan above, and how many rows it has left
    let mut carried: Vec<Option<(String, usize)>> = Vec::new();
    let mut grid = Vec::with_capacity(rows.len());

    for cells in rows {
        let mut out: Vec<String> = Vec::new();
        let mut cells = cells.into_iter();
        let mut col = 0;
        loop {
            if let Some(slot) = carried.get_mut(col) {
                if let Some((text, remaining)) = slot.as_mut() {
                    out.push(text.clone());
                    *remaining -= 1;
                    if *remaining == 0 {
                        *slot = None;
                    }
                    col += 1;
                    continue;
                }
            }
            match cells.next() {
                Some(cell) => {
                    for _ in 0..cell.colspan {
                        if cell.rowspan > 1 {
                            if carried.len() <= col {
                                carried.resize(col + 1, None);
                            }
                            carried[col] = Some((cell.text.clone(), cell.rowspan - 1));
                        }
                        out.push(cell.text.clone());
                        col += 1;
                    }
                }
                None if carried.iter().skip(col).any(Option::is_some) => {
                    out.push(String::new());
                    col += 1;
                }
                None => break,
            }
        }
        grid.push(out);
    }
    grid
}

fn build_header(mut levels: Vec<Vec<String>>, width: usize) -> Header {
    match levels.len() {
        0 => Header::Flat((0..width).map(|i| i.to_string()).collect()),
        1 => {
            let mut columns = levels.remove(0);
            dedupe_flat(&mut columns);
            Header::Flat(columns)
        }
        _ => {
            dedupe_levels(&mut levels, width);
            Header::Levels(levels)
        }
    }
}

/// A column whose full label tuple repeats an earlier one gets `.N` on its innermost label.
fn dedupe_levels(levels: &mut [Vec<String>], width: usize) {
    let keys: Vec<Vec<String>> = (0..width)
        .map(|col| levels.iter().map(|level| level[col].clone()).collect())
        .collect();
    let deduped = dedupe_by(keys, |key: &Vec<String>, n| {
        let mut next = key.clone();
        if let Some(innermost) = next.last_mut() {
            *innermost = format!("{innermost}.{n}");
        }
        next
    });
    for (col, key) in deduped.into_iter().enumerate() {
        for (level, label) in levels.iter_mut().zip(key) {
            level[col] = label;
        }
    }
}

fn dedupe_flat(columns: &mut Vec<String>) {
    let deduped = dedupe_by(std::mem::take(columns), |column: &String, n| format!("{column}.{n}"));
    *columns = deduped;
}

/// Later repeats of a key are renamed with `suffix(key, n)`; a generated name that is
/// itself taken is suffixed again until it is unused.
fn dedupe_by<K, F>(keys: Vec<K>, suffix: F) -> Vec<K>
where
    K: Clone + Eq + Hash,
    F: Fn(&K, usize) -> K,
{
    let mut counts: HashMap<K, usize> = HashMap::new();
    keys.into_iter()
        .map(|mut key| {
            let mut count = counts.get(&key).copied().unwrap_or(0);
            while count > 0 {
                counts.insert(key.clone(), count + 1);
                key = suffix(&key, count);
                count = counts.get(&key).copied().unwrap_or(0);
            }
            counts.insert(key.clone(), count + 1);
            key
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> String {
        format!("<html><head><title>t</title></head><body><div>{body}</div></body></html>")
    }

    #[test]
    fn test_missing_marker_is_table_not_found() {
        let html = page("<table id=\"other\"><tr><th>a</th></tr></table>");
        assert!(matches!(extract_table(&html), Err(ScraperError::TableNotFound("tablefix1"))));
    }

    #[test]
    fn test_marker_without_table_is_table_not_found() {
        let html = page("<div id=\"tablefix1\"><p>no data</p></div>");
        assert!(matches!(extract_table(&html), Err(ScraperError::TableNotFound(_))));
    }

    #[test]
    fn test_nested_tables_are_ambiguous() {
        let html = page(
            "<div id=\"tablefix1\"><table><tr><td>a</td></tr></table><table><tr><td>b</td></tr></table></div>",
        );
        assert!(matches!(extract_table(&html), Err(ScraperError::AmbiguousTable(2))));
    }

    #[test]
    fn test_spans_expand_into_two_levels() {
        let html = page(
            r#"<table id="tablefix1">
            <tr><th rowspan="2">時分</th><th colspan="2">気圧(hPa)</th><th rowspan="2">降水量<br>(mm)</th></tr>
            <tr><th>現地</th><th>海面</th></tr>
            <tr><td>00:10</td><td>1019.0</td><td>1022.5</td><td>--</td></tr>
            <tr><td>00:20</td><td>1019.1</td><td>1022.6</td><td>0.0</td></tr>
            </table>"#,
        );
        let table = extract_table(&html).unwrap();
        assert_eq!(
            table.header(),
            &Header::Levels(vec![
                vec!["時分".into(), "気圧(hPa)".into(), "気圧(hPa)".into(), "降水量 (mm)".into()],
                vec!["時分".into(), "現地".into(), "海面".into(), "降水量 (mm)".into()],
            ])
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1], vec!["00:20", "1019.1", "1022.6", "0.0"]);
    }

    #[test]
    fn test_duplicate_columns_get_suffix() {
        let html = page(
            r#"<table id="tablefix1">
            <tr><th colspan="4">風向・風速(m/s)</th></tr>
            <tr><th>平均</th><th>風向</th><th>最大瞬間</th><th>風向</th></tr>
            <tr><td>1.2</td><td>北</td><td>3.4</td><td>北北西</td></tr>
            </table>"#,
        );
        let table = extract_table(&html).unwrap();
        match table.header() {
            Header::Levels(levels) => assert_eq!(levels[1][3], "風向.1"),
            other => panic!("unexpected header {other:?}"),
        }
    }

    #[test]
    fn test_generated_suffix_never_collides_with_existing_label() {
        let html = page(
            r#"<table id="tablefix1"><thead><tr><th>a</th><th>a.1</th><th>a</th><th>a</th></tr></thead>
            <tbody><tr><td>1</td><td>2</td><td>3</td><td>4</td></tr></tbody></table>"#,
        );
        let table = extract_table(&html).unwrap();
        assert_eq!(
            table.header(),
            &Header::Flat(vec!["a".into(), "a.1".into(), "a.1.1".into(), "a.2".into()])
        );

        let html = page(
            r#"<table id="tablefix1">
            <tr><th colspan="3">風向・風速(m/s)</th></tr>
            <tr><th>風向</th><th>風向.1</th><th>風向</th></tr>
            <tr><td>北</td><td>南</td><td>西</td></tr>
            </table>"#,
        );
        let table = extract_table(&html).unwrap();
        match table.header() {
            Header::Levels(levels) => assert_eq!(levels[1], ["風向", "風向.1", "風向.1.1"]),
            other => panic!("unexpected header {other:?}"),
        }
    }

    #[test]
    fn test_single_header_row_is_flat_and_short_rows_are_padded() {
        let html = page(
            r#"<table id="tablefix1"><thead><tr><th>a</th><th>b</th><th>c</th></tr></thead>
            <tbody><tr><td>1</td><td>2</td></tr></tbody></table>"#,
        );
        let table = extract_table(&html).unwrap();
        assert_eq!(table.columns().unwrap(), ["a", "b", "c"]);
        assert_eq!(table.rows()[0], vec!["1", "2", ""]);
    }

    #[test]
    fn test_body_rowspan_is_carried_down() {
        let html = page(
            r#"<table id="tablefix1"><tr><th>k</th><th>v</th></tr>
            <tr><td rowspan="2">x</td><td>1</td></tr>
            <tr><td>2</td></tr></table>"#,
        );
        let table = extract_table(&html).unwrap();
        assert_eq!(table.rows(), &[vec!["x", "1"], vec!["x", "2"]]);
    }
}
