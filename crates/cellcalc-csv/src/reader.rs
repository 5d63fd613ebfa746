//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::CsvReadOptions;
use cellcalc_core::{CellAddress, Error, Sheet};

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read a CSV file into a sheet
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Sheet> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read CSV from a reader into a sheet
    ///
    /// Record `n` (0-based) fills row `n + 1` of the sheet, starting at column A. Fields are kept verbatim apart from
    /// optional trimming; empty fields leave their cell empty.
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<Sheet> {
        let trim = if options.trim {
            csv::Trim::All
        } else {
            csv::Trim::None
        };

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(options.has_header)
            .flexible(true)
            .trim(trim)
            .from_reader(reader);

        let mut sheet = Sheet::new();
        let mut records = 0usize;

        for (index, result) in csv_reader.records().enumerate() {
            let record = result?;
            let row =
                u32::try_from(index).map_err(|_| Error::RowOutOfRange(index.to_string()))?;

            for (col, field) in record.iter().enumerate() {
                if field.is_empty() {
                    continue;
                }
                let col =
                    u32::try_from(col).map_err(|_| Error::ColumnOutOfRange(col.to_string()))?;
                sheet.set_cell(CellAddress::new(row, col), field);
            }

            records += 1;
        }

        log::debug!("read {} records into {} cells", records, sheet.len());
        Ok(sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn read(text: &str, options: &CsvReadOptions) -> Sheet {
        CsvReader::read(text.as_bytes(), options).unwrap()
    }

    fn cell<'a>(sheet: &'a Sheet, a1: &str) -> Option<&'a str> {
        sheet.cell(CellAddress::parse(a1).unwrap())
    }

    #[test]
    fn test_read_positions() {
        let sheet = read("1,2\nA1+B1,  =A2*2 \n", &CsvReadOptions::default());

        assert_eq!(sheet.len(), 4);
        assert_eq!(cell(&sheet, "A1"), Some("1"));
        assert_eq!(cell(&sheet, "B1"), Some("2"));
        assert_eq!(cell(&sheet, "A2"), Some("A1+B1"));
        assert_eq!(cell(&sheet, "B2"), Some("=A2*2"));
    }

    #[test]
    fn test_empty_fields_leave_cells_empty() {
        let sheet = read("1,,3\n,\n", &CsvReadOptions::default());

        assert_eq!(sheet.len(), 2);
        assert_eq!(cell(&sheet, "B1"), None);
        assert_eq!(cell(&sheet, "C1"), Some("3"));
    }

    #[test]
    fn test_ragged_records() {
        let sheet = read("1\n1,2,3\n", &CsvReadOptions::default());

        assert_eq!(sheet.dimensions(), (2, 3));
    }

    #[test]
    fn test_header_is_skipped() {
        let options = CsvReadOptions {
            has_header: true,
            ..Default::default()
        };
        let sheet = read("x,y\n1,2\n", &options);

        assert_eq!(cell(&sheet, "A1"), Some("1"));
        assert_eq!(sheet.len(), 2);
    }

    #[test]
    fn test_untrimmed_fields() {
        let options = CsvReadOptions {
            trim: false,
            delimiter: b';',
            ..Default::default()
        };
        let sheet = read(" 1 ;2\n", &options);

        assert_eq!(cell(&sheet, "A1"), Some(" 1 "));
        assert_eq!(cell(&sheet, "B1"), Some("2"));
    }
}
