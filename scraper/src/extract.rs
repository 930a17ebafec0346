use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, ScrapeError};

/// Header and data rows of one page's observations table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObservationTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One output record: the page date followed by the table cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationRow {
    pub date: NaiveDate,
    pub cells: Vec<String>,
}

impl ObservationTable {
    pub fn into_rows(self, date: NaiveDate) -> Vec<ObservationRow> {
        self.rows
            .into_iter()
            .map(|cells| ObservationRow { date, cells })
            .collect()
    }
}

/// Which `<table>` on the page holds the observations.
///
/// When `expected_columns` is non-empty the table whose header contains all
/// of them wins; `index` is only used when no table matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSelection {
    pub index: usize,
    pub expected_columns: Vec<String>,
}

impl Default for TableSelection {
    fn default() -> Self {
        TableSelection {
            index: 1,
            expected_columns: Vec::new(),
        }
    }
}

pub fn extract_table(html: &str, selection: &TableSelection) -> Result<ObservationTable> {
    let document = Html::parse_document(html);
    let table = select_table(&document, selection)?;

    Ok(ObservationTable {
        header: extract_header(table),
        rows: extract_rows(table),
    })
}

pub fn select_table<'a>(document: &'a Html, selection: &TableSelection) -> Result<ElementRef<'a>> {
    let table_selector = Selector::parse("table").unwrap();
    let tables: Vec<ElementRef> = document.select(&table_selector).collect();

    if !selection.expected_columns.is_empty() {
        let matching: Vec<ElementRef> = tables
            .iter()
            .copied()
            .filter(|table| has_columns(&extract_header(*table), &selection.expected_columns))
            .collect();

        match matching.len() {
            0 => log::debug!(
                "no table has columns {:?}, falling back to index {}",
                selection.expected_columns,
                selection.index
            ),
            1 => return Ok(matching[0]),
            n => return Err(ScrapeError::AmbiguousTable { matches: n }),
        }
    }

    tables
        .get(selection.index)
        .copied()
        .ok_or(ScrapeError::TableIndexOutOfRange {
            index: selection.index,
            found: tables.len(),
        })
}

pub fn extract_header(table: ElementRef) -> Vec<String> {
    let th_selector = Selector::parse("th").unwrap();
    table.select(&th_selector).map(cell_text).collect()
}

/// Data cells of every row after the first; rows without `td` cells are dropped.
pub fn extract_rows(table: ElementRef) -> Vec<Vec<String>> {
    let tr_selector = Selector::parse("tr").unwrap();
    let td_selector = Selector::parse("td").unwrap();

    table
        .select(&tr_selector)
        .skip(1)
        .map(|row| row.select(&td_selector).map(cell_text).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect()
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn has_columns(header: &[String], expected: &[String]) -> bool {
    expected.iter().all(|column| {
        header
            .iter()
            .any(|h| h.eq_ignore_ascii_case(column.trim()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_table_page_has_no_second_table() {
        let html = "<table><tr><th>A</th></tr><tr><td>1</td></tr></table>";
        let err = extract_table(html, &TableSelection::default()).unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::TableIndexOutOfRange { index: 1, found: 1 }
        ));
    }

    #[test]
    fn empty_rows_are_dropped() {
        let html = r#"
        <table><tr><td>summary</td></tr></table>
        <table>
          <tr><th> A </th><th>B</th></tr>
          <tr><td> 1 </td><td>2</td></tr>
          <tr></tr>
        </table>"#;

        let table = extract_table(html, &TableSelection::default()).unwrap();
        assert_eq!(table.header, columns(&["A", "B"]));

        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let rows = table.into_rows(date);
        assert_eq!(
            rows,
            vec![ObservationRow {
                date,
                cells: columns(&["1", "2"])
            }]
        );
    }

    #[test]
    fn first_row_is_skipped_even_when_it_has_cells() {
        let html = r#"
        <table></table>
        <table>
          <tr><td>not a header</td></tr>
          <tr><td>x</td></tr>
        </table>"#;

        let table = extract_table(html, &TableSelection::default()).unwrap();
        assert!(table.header.is_empty());
        assert_eq!(table.rows, vec![columns(&["x"])]);
    }

    #[test]
    fn ragged_rows_are_kept_as_is() {
        let html = r#"
        <table></table>
        <table>
          <tr><th>A</th><th>B</th></tr>
          <tr><td>1</td></tr>
          <tr><td>1</td><td>2</td><td>3</td></tr>
        </table>"#;

        let table = extract_table(html, &TableSelection::default()).unwrap();
        assert_eq!(table.rows[0].len(), 1);
        assert_eq!(table.rows[1].len(), 3);
    }

    #[test]
    fn expected_columns_pick_table_regardless_of_position() {
        let html = r#"
        <table><tr><th>Time</th><th>Temperature</th></tr><tr><td>1:00</td><td>80</td></tr></table>
        <table><tr><th>Summary</th></tr><tr><td>x</td></tr></table>"#;

        let selection = TableSelection {
            index: 1,
            expected_columns: columns(&["temperature"]),
        };
        let table = extract_table(html, &selection).unwrap();
        assert_eq!(table.header, columns(&["Time", "Temperature"]));
    }

    #[test]
    fn two_matching_tables_are_ambiguous() {
        let html = r#"
        <table><tr><th>Time</th></tr></table>
        <table><tr><th>Time</th></tr></table>"#;

        let selection = TableSelection {
            index: 0,
            expected_columns: columns(&["Time"]),
        };
        assert!(matches!(
            extract_table(html, &selection),
            Err(ScrapeError::AmbiguousTable { matches: 2 })
        ));
    }

    #[test]
    fn no_matching_table_falls_back_to_index() {
        let html = r#"
        <table><tr><th>X</th></tr></table>
        <table><tr><th>Y</th></tr><tr><td>y</td></tr></table>"#;

        let selection = TableSelection {
            index: 1,
            expected_columns: columns(&["Dew Point"]),
        };
        let table = extract_table(html, &selection).unwrap();
        assert_eq!(table.header, columns(&["Y"]));
    }
}
