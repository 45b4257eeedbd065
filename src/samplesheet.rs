//! This module turns user input into an ordered list of bottle IDs, either
//! from a column of an Excel workbook or from pasted text. It also writes the
//! sample workbook users download to see the expected format.

use std::io::{Read, Seek};
use std::path::Path;

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;

use crate::config::Order;
use crate::error::{LabelError, Result};

/// Header of the bottle ID column in the sample workbook
pub const DEFAULT_COLUMN: &str = "Sticker";

/// An ordered list of bottle IDs, trimmed and without blanks
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BottleSheet {
    pub entries: Vec<String>,
}

/// Render a cell the way a user would read it in Excel.
///
/// Excel keeps every number as a float, so whole numbers lose their `.0`
/// here. Anything that doesn't fit an `i64` keeps its float representation.
fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::Empty => String::new(),
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => (*f as i64).to_string(),
        other => other.to_string(),
    }
}

impl From<Vec<String>> for BottleSheet {
    fn from(entries: Vec<String>) -> Self {
        BottleSheet {
            entries: entries
                .into_iter()
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }
}

impl BottleSheet {
    pub fn new() -> Self {
        BottleSheet {
            entries: Vec::new(),
        }
    }

    /// One bottle ID per line. Surrounding whitespace is stripped and empty
    /// lines are skipped, duplicates and order are kept.
    pub fn from_text(text: &str) -> Self {
        BottleSheet {
            entries: text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|l| l.to_string())
                .collect(),
        }
    }

    pub fn from_xlsx(xlsx: &Path, column: &str) -> Result<Self> {
        let mut ss: Xlsx<_> = open_workbook(xlsx)?;
        Self::from_workbook(&mut ss, column)
    }

    pub fn from_reader<RS: Read + Seek>(reader: RS, column: &str) -> Result<Self> {
        let mut ss = Xlsx::new(reader)?;
        Self::from_workbook(&mut ss, column)
    }

    /// Collect `column` of the first worksheet, below its header
    fn from_workbook<RS: Read + Seek>(ss: &mut Xlsx<RS>, column: &str) -> Result<Self> {
        let sheetname = ss.sheet_names().first().cloned().ok_or(LabelError::NoWorksheet)?;
        let sheet = ss.worksheet_range(&sheetname).ok_or(LabelError::NoWorksheet)??;

        let mut rows = sheet.rows();
        let header_row: Vec<String> = rows
            .next()
            .map(|r| r.iter().map(|d| cell_to_string(d).trim().to_string()).collect())
            .unwrap_or_default();
        let col = header_row
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| LabelError::MissingColumn(column.to_string()))?;

        let result: BottleSheet = rows
            .filter_map(|row| row.get(col).map(cell_to_string))
            .collect::<Vec<String>>()
            .into();

        debug!("Read {} bottle IDs from column '{}' of sheet '{}'", result.entries.len(), column, sheetname);
        Ok(result)
    }

    pub fn apply_order(&mut self, order: Order) {
        if order == Order::Sorted {
            self.entries.sort();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the workbook users can download to see what an upload should
    /// look like: a single sheet with a `Sticker` column of bottle IDs.
    pub fn write_template(outfile: &Path) -> Result<()> {
        let workbook = xlsxwriter::Workbook::new(&outfile.to_string_lossy());
        {
            let mut sheet = workbook.add_worksheet(None)?;
            sheet.write_string(0, 0, DEFAULT_COLUMN, None)?;
            for (row, id) in (1001..=1008).enumerate() {
                sheet.write_number(row as u32 + 1, 0, f64::from(id), None)?;
            }
        }
        workbook.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    enum Cell<'a> {
        Text(&'a str),
        Number(f64),
        Blank,
    }

    fn write_fixture(dir: &Path, header: &[&str], rows: &[Vec<Cell>]) -> std::result::Result<PathBuf, Box<dyn std::error::Error>> {
        let path = dir.join("fixture.xlsx");
        let workbook = xlsxwriter::Workbook::new(path.to_str().unwrap());
        {
            let mut sheet = workbook.add_worksheet(None)?;
            for (col, title) in header.iter().enumerate() {
                sheet.write_string(0, col as u16, title, None)?;
            }
            for (row, cells) in rows.iter().enumerate() {
                for (col, cell) in cells.iter().enumerate() {
                    let (row, col) = (row as u32 + 1, col as u16);
                    match cell {
                        Cell::Text(s) => sheet.write_string(row, col, s, None)?,
                        Cell::Number(n) => sheet.write_number(row, col, *n, None)?,
                        Cell::Blank => {}
                    }
                }
            }
        }
        workbook.close()?;
        Ok(path)
    }

    #[test]
    fn text_trims_and_skips_blank_lines() {
        let ss = BottleSheet::from_text("  1001\r\n\n1002 \n   \n1001\n");
        assert_eq!(ss.entries, vec!["1001", "1002", "1001"]);
    }

    #[test]
    fn text_empty() {
        assert!(BottleSheet::from_text("").is_empty());
        assert!(BottleSheet::from_text("\n \n\t\n").is_empty());
    }

    #[test]
    fn sorted_order_is_lexicographic() {
        let mut ss = BottleSheet::from_text("1010\n999\n1002");
        ss.apply_order(Order::Preserve);
        assert_eq!(ss.entries, vec!["1010", "999", "1002"]);
        ss.apply_order(Order::Sorted);
        assert_eq!(ss.entries, vec!["1002", "1010", "999"]);
    }

    #[test]
    fn xlsx_reads_named_column() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = write_fixture(dir.path(), &["Rack", "Sticker"], &[
            vec![Cell::Text("A1"), Cell::Number(1001.0)],
            vec![Cell::Text("A1"), Cell::Blank],
            vec![Cell::Text("A1"), Cell::Text(" 1003 ")],
            vec![Cell::Text("A1"), Cell::Number(1002.0)],
            vec![Cell::Text("A1"), Cell::Text("   ")],
        ])?;

        let ss = BottleSheet::from_xlsx(&path, DEFAULT_COLUMN)?;
        assert_eq!(ss.entries, vec!["1001", "1003", "1002"]);
        Ok(())
    }

    #[test]
    fn xlsx_from_reader() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = write_fixture(dir.path(), &["Tube"], &[
            vec![Cell::Text("T-1")],
            vec![Cell::Number(7.5)],
        ])?;

        let ss = BottleSheet::from_reader(std::fs::File::open(&path)?, "Tube")?;
        assert_eq!(ss.entries, vec!["T-1", "7.5"]);
        Ok(())
    }

    #[test]
    fn xlsx_missing_column() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = write_fixture(dir.path(), &["Bottle"], &[vec![Cell::Number(1.0)]])?;

        match BottleSheet::from_xlsx(&path, DEFAULT_COLUMN) {
            Err(LabelError::MissingColumn(c)) => assert_eq!(c, "Sticker"),
            other => panic!("expected missing column, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn xlsx_unreadable() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("not_a_workbook.xlsx");
        std::fs::write(&path, "1001\n1002\n")?;

        let err = BottleSheet::from_xlsx(&path, DEFAULT_COLUMN).unwrap_err();
        assert!(err.to_string().starts_with("Error reading Excel file"), "{}", err);
        Ok(())
    }

    #[test]
    fn template_roundtrips_through_loader() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("Bottle_Location.xlsx");
        BottleSheet::write_template(&path)?;

        let ss = BottleSheet::from_xlsx(&path, DEFAULT_COLUMN)?;
        assert_eq!(ss.len(), 8);
        assert_eq!(ss.entries.first().map(String::as_str), Some("1001"));
        Ok(())
    }
}
