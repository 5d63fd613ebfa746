//! Raw cell storage

use crate::address::CellAddress;
use crate::error::Result;
use std::collections::BTreeMap;

/// A sheet of raw cell text
///
/// Every populated cell holds the text the user typed, either a plain number (`"42"`)
/// or a formula (`"A1*2"`, optionally written `"=A1*2"`). The sheet never interprets
/// that text; an evaluation pass does.
///
/// Whitespace-only text is treated as no content, so the cell is removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    cells: BTreeMap<CellAddress, String>,
}

impl Sheet {
    /// Create an empty sheet
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sheet from a row-major grid of cell text
    ///
    /// Row `i`, column `j` of the grid becomes the cell at `CellAddress::new(i, j)`.
    pub fn from_rows<R, C, S>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sheet = Self::new();
        for (row, cells) in rows.into_iter().enumerate() {
            for (col, text) in cells.into_iter().enumerate() {
                sheet.set_cell(CellAddress::new(row as u32, col as u32), text);
            }
        }
        sheet
    }

    /// Set the raw text of a cell
    pub fn set_cell(&mut self, address: CellAddress, text: impl Into<String>) {
        let text = text.into();
        if text.trim().is_empty() {
            self.cells.remove(&address);
        } else {
            self.cells.insert(address, text);
        }
    }

    /// Set the raw text of a cell addressed in A1 notation
    pub fn set_cell_a1(&mut self, address: &str, text: impl Into<String>) -> Result<()> {
        let address = CellAddress::parse(address)?;
        self.set_cell(address, text);
        Ok(())
    }

    /// Get the raw text of a cell
    pub fn cell(&self, address: CellAddress) -> Option<&str> {
        self.cells.get(&address).map(String::as_str)
    }

    /// Remove a cell's content, returning the previous text
    pub fn clear_cell(&mut self, address: CellAddress) -> Option<String> {
        self.cells.remove(&address)
    }

    /// Iterate populated cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellAddress, &str)> + '_ {
        self.cells.iter().map(|(addr, text)| (*addr, text.as_str()))
    }

    /// Number of populated cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the sheet has no populated cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Size of the used area as `(rows, cols)`, anchored at A1
    pub fn dimensions(&self) -> (u32, u32) {
        self.cells.keys().fold((0, 0), |(rows, cols), addr| {
            (rows.max(addr.row + 1), cols.max(addr.col + 1))
        })
    }
}
