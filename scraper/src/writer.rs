use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;

use crate::error::Result;
use crate::extract::ObservationRow;

pub const DATE_COLUMN: &str = "Date";

/// Writes observation rows as CSV with a leading row-index column.
///
/// The header line is `,Date,<table columns>`; each row starts with its
/// zero-based position in the whole output. Rows shorter than the header are
/// padded with empty cells; longer rows are written as they are. Rows are
/// flushed per batch so a failed run keeps what was already scraped.
pub struct ObservationWriter<W: Write> {
    csv: csv::Writer<W>,
    next_index: usize,
    header_written: bool,
    header_width: usize,
}

impl ObservationWriter<File> {
    /// Truncates any existing file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(ObservationWriter::new(file))
    }
}

impl<W: Write> ObservationWriter<W> {
    pub fn new(inner: W) -> Self {
        let csv = WriterBuilder::new().flexible(true).from_writer(inner);
        ObservationWriter {
            csv,
            next_index: 0,
            header_written: false,
            header_width: 0,
        }
    }

    pub fn rows_written(&self) -> usize {
        self.next_index
    }

    pub fn write_header(&mut self, columns: &[String]) -> Result<()> {
        if self.header_written {
            return Ok(());
        }
        let mut record = vec!["", DATE_COLUMN];
        record.extend(columns.iter().map(String::as_str));
        self.csv.write_record(&record)?;
        self.header_written = true;
        self.header_width = columns.len();
        Ok(())
    }

    /// Appends one batch of rows and flushes them to the underlying writer.
    pub fn write_rows(&mut self, rows: &[ObservationRow]) -> Result<()> {
        for row in rows {
            let width = row.cells.len().max(self.header_width);
            let mut record = Vec::with_capacity(width + 2);
            record.push(self.next_index.to_string());
            record.push(row.date.to_string());
            record.extend(row.cells.iter().cloned());
            record.resize(width + 2, String::new());
            self.csv.write_record(&record)?;
            self.next_index += 1;
        }
        self.csv.flush()?;
        Ok(())
    }

    /// Writes the bare `,Date` header if no page ever supplied one.
    pub fn finish(mut self) -> Result<W> {
        if !self.header_written {
            self.write_header(&[])?;
        }
        self.csv.flush()?;
        self.csv
            .into_inner()
            .map_err(|e| std::io::Error::new(e.error().kind(), e.error().to_string()).into())
    }
}

/// Writes a whole result set in one go, replacing any existing file.
pub fn write_results<P: AsRef<Path>>(
    path: P,
    header: &[String],
    rows: &[ObservationRow],
) -> Result<()> {
    let mut writer = ObservationWriter::create(path)?;
    writer.write_header(header)?;
    writer.write_rows(rows)?;
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(day: u32, cells: &[&str]) -> ObservationRow {
        ObservationRow {
            date: NaiveDate::from_ymd_opt(2020, 1, day).unwrap(),
            cells: cells.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn index_continues_across_batches() {
        let mut writer = ObservationWriter::new(Vec::new());
        writer.write_header(&header(&["Temp", "Humidity"])).unwrap();
        writer.write_rows(&[row(1, &["80", "70%"])]).unwrap();
        writer.write_rows(&[row(2, &["81", "71%"]), row(2, &["79", "75%"])]).unwrap();
        assert_eq!(writer.rows_written(), 3);

        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(
            out,
            ",Date,Temp,Humidity\n\
             0,2020-01-01,80,70%\n\
             1,2020-01-02,81,71%\n\
             2,2020-01-02,79,75%\n"
        );
    }

    #[test]
    fn short_rows_are_padded_to_header_width() {
        let mut writer = ObservationWriter::new(Vec::new());
        writer.write_header(&header(&["Temp", "Humidity", "Wind"])).unwrap();
        writer.write_rows(&[row(1, &["80"]), row(1, &["81", "70%", "N", "extra"])]).unwrap();

        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(
            out,
            ",Date,Temp,Humidity,Wind\n\
             0,2020-01-01,80,,\n\
             1,2020-01-01,81,70%,N,extra\n"
        );
    }

    #[test]
    fn header_is_written_once() {
        let mut writer = ObservationWriter::new(Vec::new());
        writer.write_header(&header(&["A"])).unwrap();
        writer.write_header(&header(&["B"])).unwrap();
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(out, ",Date,A\n");
    }

    #[test]
    fn empty_run_still_gets_a_header() {
        let writer = ObservationWriter::new(Vec::new());
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(out, ",Date\n");
    }

    #[test]
    fn cells_with_commas_are_quoted() {
        let mut writer = ObservationWriter::new(Vec::new());
        writer.write_header(&header(&["Condition"])).unwrap();
        writer.write_rows(&[row(3, &["Rain, Thunder"])]).unwrap();
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert!(out.ends_with("0,2020-01-03,\"Rain, Thunder\"\n"));
    }

    #[test]
    fn written_file_reads_back_with_expected_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale contents that must disappear\n".repeat(10)).unwrap();

        let columns = header(&["Temp", "Dew", "Wind"]);
        let rows: Vec<_> = (1..=5).map(|d| row(d, &["1", "2", "3"])).collect();
        write_results(&path, &columns, &rows).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .unwrap();
        let records: Vec<_> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(records.len(), rows.len() + 1);
        for record in &records {
            assert_eq!(record.len(), 2 + columns.len());
        }
        assert_eq!(&records[0][1], "Date");
        assert_eq!(&records[5][0], "4");
    }
}
