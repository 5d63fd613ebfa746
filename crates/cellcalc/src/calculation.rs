//! Sheet calculation engine
//!
//! Runs a full evaluation pass over a [`Sheet`]: every populated cell is parsed, a
//! dependency graph is built across all cells, cells on cycles are set aside and the rest
//! are evaluated in dependency order. Every cell ends the pass either resolved to a
//! number or errored; one cell's failure never stops the pass.
//!
//! # Example
//!
//! ```rust
//! use cellcalc::prelude::*;
//!
//! let sheet = Sheet::from_rows(vec![vec!["1", "A1+1", "B1*C1"]]);
//! let result = sheet.calculate();
//!
//! assert_eq!(result.get("B1"), Ok(2.0));
//! assert!(matches!(result.get("C1"), Err(FormulaError::CircularReference(_))));
//! println!("{} errors", result.stats().errors);
//! ```

use cellcalc_core::{CellAddress, Sheet};
use cellcalc_formula::parser::parse_reference;
use cellcalc_formula::{
    evaluate, parse_formula, schedule, DependencyGraph, Expr, FormulaError, FormulaResult,
    Schedule, ValueCache,
};
use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How the ordered cells are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecalcMode {
    /// One cell at a time in dependency order
    #[default]
    SingleThreaded,
    /// Independent cells of each dependency layer in parallel
    ///
    /// Falls back to layer-by-layer single-threaded evaluation without the `parallel`
    /// feature.
    MultiThreaded,
}

/// Options for sheet calculation
#[derive(Debug, Clone, Default)]
pub struct CalculationOptions {
    pub mode: RecalcMode,
}

/// Statistics from a calculation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationStats {
    /// Number of populated cells
    pub cell_count: usize,
    /// Number of cells holding more than a plain number
    pub formula_count: usize,
    /// Number of cells run through the evaluator
    pub cells_calculated: usize,
    /// Number of cells on circular references
    pub circular_references: usize,
    /// Number of cells that ended the pass in error
    pub errors: usize,
}

/// Extension trait for Sheet to add calculation methods
pub trait SheetCalculationExt {
    /// Calculate every cell with default options
    fn calculate(&self) -> EvaluatedSheet;

    /// Calculate every cell with custom options
    fn calculate_with_options(&self, options: &CalculationOptions) -> EvaluatedSheet;
}

impl SheetCalculationExt for Sheet {
    fn calculate(&self) -> EvaluatedSheet {
        self.calculate_with_options(&CalculationOptions::default())
    }

    fn calculate_with_options(&self, options: &CalculationOptions) -> EvaluatedSheet {
        CalculationEngine::new(options.clone()).calculate_all(self)
    }
}

/// The outcome of one evaluation pass
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedSheet {
    values: ValueCache,
    stats: CalculationStats,
    dimensions: (u32, u32),
}

impl EvaluatedSheet {
    /// Outcome of a cell; `None` for cells without content
    pub fn value(&self, cell: CellAddress) -> Option<&FormulaResult<f64>> {
        self.values.get(cell)
    }

    /// Outcome of a cell addressed in A1 notation
    ///
    /// Reading a cell without content gives [`FormulaError::UndefinedReference`], just as
    /// a formula reading it would. A malformed reference gives a syntax error.
    pub fn get(&self, reference: &str) -> FormulaResult<f64> {
        let cell = parse_reference(reference)?;
        match self.values.get(cell) {
            Some(outcome) => outcome.clone(),
            None => Err(FormulaError::UndefinedReference(cell)),
        }
    }

    /// All cell outcomes in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (CellAddress, &FormulaResult<f64>)> + '_ {
        self.values.iter()
    }

    /// Errored cells in row-major order
    pub fn errors(&self) -> impl Iterator<Item = (CellAddress, &FormulaError)> + '_ {
        self.values
            .iter()
            .filter_map(|(cell, outcome)| outcome.as_ref().err().map(|e| (cell, e)))
    }

    pub fn stats(&self) -> &CalculationStats {
        &self.stats
    }

    /// The underlying value cache
    pub fn values(&self) -> &ValueCache {
        &self.values
    }

    /// Size of the used area as `(rows, cols)`
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Text shown for a cell in a rendered grid
    pub fn display_value(&self, cell: CellAddress) -> String {
        match self.values.get(cell) {
            None => String::new(),
            Some(Ok(n)) => format_number(*n),
            Some(Err(e)) => e.marker().to_string(),
        }
    }

    /// Row-major grid of display values covering the used area
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let (rows, cols) = self.dimensions;
        (0..rows)
            .map(|row| {
                (0..cols)
                    .map(|col| self.display_value(CellAddress::new(row, col)))
                    .collect()
            })
            .collect()
    }

    /// Render the sheet as an aligned text grid with row and column headers
    pub fn to_grid_string(&self) -> String {
        crate::print::render_grid(&self.to_rows())
    }
}

/// Format a number without a trailing `.0` for integral values
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// The calculation engine
struct CalculationEngine {
    options: CalculationOptions,
    /// Parsed expressions of every cell that parsed successfully
    parsed: BTreeMap<CellAddress, Expr>,
    values: ValueCache,
    stats: CalculationStats,
}

impl CalculationEngine {
    fn new(options: CalculationOptions) -> Self {
        Self {
            options,
            parsed: BTreeMap::new(),
            values: ValueCache::new(),
            stats: CalculationStats::default(),
        }
    }

    /// Calculate every cell in the sheet
    fn calculate_all(mut self, sheet: &Sheet) -> EvaluatedSheet {
        // Phase 1: Parse every cell; parse failures are final for this pass
        self.collect_cells(sheet);

        // Phase 2: Build the dependency graph
        let graph = DependencyGraph::build(self.parsed.iter().map(|(cell, expr)| (*cell, expr)));

        // Phase 3: Order cells, setting aside circular references
        let schedule = schedule(&graph);
        self.mark_circular_references(&schedule);

        // Phase 4: Evaluate in order
        match self.options.mode {
            RecalcMode::SingleThreaded => self.calculate_cells_simple(schedule.order()),
            RecalcMode::MultiThreaded => self.calculate_cells_layered(&schedule.layers(&graph)),
        }

        self.stats.errors = self.values.iter().filter(|(_, v)| v.is_err()).count();
        log::debug!(
            "Calculated {} of {} cells ({} formulas, {} circular, {} errors)",
            self.stats.cells_calculated,
            self.stats.cell_count,
            self.stats.formula_count,
            self.stats.circular_references,
            self.stats.errors
        );

        EvaluatedSheet {
            values: self.values,
            stats: self.stats,
            dimensions: sheet.dimensions(),
        }
    }

    fn collect_cells(&mut self, sheet: &Sheet) {
        for (cell, text) in sheet.cells() {
            self.stats.cell_count += 1;

            match parse_formula(text) {
                Ok(expr) => {
                    if !matches!(expr, Expr::Literal(_)) {
                        self.stats.formula_count += 1;
                    }
                    self.parsed.insert(cell, expr);
                }
                Err(e) => {
                    log::warn!("Failed to parse cell {}: {}", cell, e);
                    self.stats.formula_count += 1;
                    self.values.insert(cell, Err(e));
                }
            }
        }
    }

    fn mark_circular_references(&mut self, schedule: &Schedule) {
        for &cell in schedule.cycles() {
            log::warn!("Cell {} is part of a circular reference", cell);
            self.values
                .insert(cell, Err(FormulaError::CircularReference(cell)));
        }
        self.stats.circular_references = schedule.cycles().len();
    }

    fn evaluate_cell(&self, cell: CellAddress) -> FormulaResult<f64> {
        match self.parsed.get(&cell) {
            Some(expr) => evaluate(expr, &self.values),
            // Scheduled cells always come from `parsed`
            None => Err(FormulaError::UndefinedReference(cell)),
        }
    }

    fn record(&mut self, cell: CellAddress, outcome: FormulaResult<f64>) {
        match &outcome {
            Ok(n) => log::trace!("{} = {}", cell, n),
            Err(e) => log::trace!("{} failed: {}", cell, e),
        }
        self.stats.cells_calculated += 1;
        self.values.insert(cell, outcome);
    }

    /// Calculate cells one at a time; each result is cached before the next cell runs
    fn calculate_cells_simple(&mut self, order: &[CellAddress]) {
        for &cell in order {
            let outcome = self.evaluate_cell(cell);
            self.record(cell, outcome);
        }
    }

    /// Calculate layer by layer; a layer only reads results of earlier layers, so its
    /// cells are evaluated against a cache that is not written until the layer is done
    fn calculate_cells_layered(&mut self, layers: &[Vec<CellAddress>]) {
        for layer in layers {
            #[cfg(feature = "parallel")]
            let results: Vec<(CellAddress, FormulaResult<f64>)> = layer
                .par_iter()
                .map(|&cell| (cell, self.evaluate_cell(cell)))
                .collect();

            #[cfg(not(feature = "parallel"))]
            let results: Vec<(CellAddress, FormulaResult<f64>)> = layer
                .iter()
                .map(|&cell| (cell, self.evaluate_cell(cell)))
                .collect();

            for (cell, outcome) in results {
                self.record(cell, outcome);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sheet(cells: &[(&str, &str)]) -> Sheet {
        let mut sheet = Sheet::new();
        for (a1, text) in cells {
            sheet.set_cell_a1(a1, *text).unwrap();
        }
        sheet
    }

    fn addr(a1: &str) -> CellAddress {
        CellAddress::parse(a1).unwrap()
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(14.0), "14");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e20), "100000000000000000000");
    }

    #[test]
    fn test_stats() {
        let result = sheet(&[
            ("A1", "1"),
            ("A2", "A1+1"),
            ("A3", "A3"),
            ("A4", "1+"),
            ("A5", "A4*2"),
        ])
        .calculate();

        assert_eq!(
            result.stats(),
            &CalculationStats {
                cell_count: 5,
                formula_count: 4,
                cells_calculated: 3,
                circular_references: 1,
                errors: 3,
            }
        );
    }

    #[test]
    fn test_parse_failure_propagates_as_dependency_failure() {
        let result = sheet(&[("A1", "2+*3"), ("B1", "A1+1")]).calculate();

        assert!(matches!(result.get("A1"), Err(FormulaError::Syntax { .. })));
        assert_eq!(result.get("B1"), Err(FormulaError::DependencyFailed(addr("A1"))));
    }

    #[test]
    fn test_get_empty_and_malformed_references() {
        let result = sheet(&[("A1", "1")]).calculate();

        assert_eq!(result.get("C3"), Err(FormulaError::UndefinedReference(addr("C3"))));
        assert!(matches!(result.get("12"), Err(FormulaError::Syntax { .. })));
        assert!(result.value(addr("C3")).is_none());
    }

    #[test]
    fn test_display_values_and_rows() {
        let result = sheet(&[("A1", "3"), ("B1", "A1/2"), ("A2", "1/0"), ("C2", "A2")])
            .calculate();

        assert_eq!(result.dimensions(), (2, 3));
        assert_eq!(
            result.to_rows(),
            vec![
                vec!["3".to_string(), "1.5".to_string(), String::new()],
                vec!["#DIV/0!".to_string(), String::new(), "#DEP!".to_string()],
            ]
        );
    }

    #[test]
    fn test_errors_iterator() {
        let result = sheet(&[("A1", "B9"), ("A2", "4")]).calculate();
        let errors: Vec<_> = result.errors().collect();

        assert_eq!(
            errors,
            vec![(addr("A1"), &FormulaError::UndefinedReference(addr("B9")))]
        );
    }

    #[test]
    fn test_layered_mode_matches_single_threaded() {
        let sheet = sheet(&[
            ("A1", "1"),
            ("A2", "A1*2"),
            ("B1", "A1+A2"),
            ("B2", "B1/(A1-1)"),
            ("C1", "B1+B2"),
            ("C2", "C2+1"),
            ("D1", "C2*0+5"),
        ]);

        let single = sheet.calculate();
        let multi = sheet.calculate_with_options(&CalculationOptions {
            mode: RecalcMode::MultiThreaded,
        });

        assert_eq!(
            single.iter().collect::<Vec<_>>(),
            multi.iter().collect::<Vec<_>>()
        );
        assert_eq!(single.stats(), multi.stats());
    }
}
