//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::{CsvWriteOptions, LineTerminator};

/// CSV file writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write a grid of cell text to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        rows: &[Vec<String>],
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let file = File::create(path)?;
        Self::write(rows, file, options)
    }

    /// Write a grid of cell text to a writer, one record per row
    pub fn write<W: Write>(
        rows: &[Vec<String>],
        writer: W,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(terminator)
            .flexible(true)
            .from_writer(writer);

        for row in rows {
            csv_writer.write_record(row)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write(rows: &[Vec<String>], options: &CsvWriteOptions) -> String {
        let mut out = Vec::new();
        CsvWriter::write(rows, &mut out, options).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_write_grid() {
        let rows = grid(&[&["1", "2.5"], &["#DIV/0!", ""]]);

        assert_eq!(
            write(&rows, &CsvWriteOptions::default()),
            "1,2.5\n#DIV/0!,\n"
        );
    }

    #[test]
    fn test_write_crlf_and_delimiter() {
        let options = CsvWriteOptions {
            delimiter: b'\t',
            line_terminator: LineTerminator::CRLF,
            ..Default::default()
        };

        assert_eq!(write(&grid(&[&["1", "2"]]), &options), "1\t2\r\n");
    }

    #[test]
    fn test_fields_with_delimiters_are_quoted() {
        assert_eq!(
            write(&grid(&[&["a,b"]]), &CsvWriteOptions::default()),
            "\"a,b\"\n"
        );
    }
}
