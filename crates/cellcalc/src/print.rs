//! Aligned text rendering of a value grid
//!
//! ```text
//!  --------------------
//!  | / | A  | B       |
//!  --------------------
//!  | 1 | 10 | 20      |
//!  --------------------
//!  | 2 | 5  | #DIV/0! |
//!  --------------------
//! ```
//!
//! A header row of column letters and a header column of row numbers frame the values,
//! and every row is followed by a divider.

use cellcalc_core::CellAddress;

/// Render a row-major grid of cell text as a framed table
///
/// Ragged rows are padded with empty cells.
pub fn render_grid(rows: &[Vec<String>]) -> String {
    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let framed = framed_grid(rows, cols);

    let widths: Vec<usize> = (0..=cols)
        .map(|col| {
            framed
                .iter()
                .map(|row| row[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let divider = format!(
        " {} ",
        "-".repeat(widths.iter().sum::<usize>() + widths.len() * 3 + 1)
    );

    let mut out = String::new();
    out.push_str(&divider);
    out.push('\n');

    for row in &framed {
        for (value, width) in row.iter().zip(&widths) {
            out.push_str(&format!(" | {:<width$}", value, width = width));
        }
        out.push_str(" |\n");
        out.push_str(&divider);
        out.push('\n');
    }

    out
}

/// The grid with a header row and header column added
fn framed_grid(rows: &[Vec<String>], cols: usize) -> Vec<Vec<String>> {
    let mut framed = Vec::with_capacity(rows.len() + 1);

    let mut header = Vec::with_capacity(cols + 1);
    header.push("/".to_string());
    header.extend((0..cols).map(|col| CellAddress::column_to_letters(col as u32)));
    framed.push(header);

    for (index, row) in rows.iter().enumerate() {
        let mut line = Vec::with_capacity(cols + 1);
        line.push((index + 1).to_string());
        line.extend(row.iter().cloned());
        line.resize(cols + 1, String::new());
        framed.push(line);
    }

    framed
}
