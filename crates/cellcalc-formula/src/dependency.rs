//! Dependency tracking for formula calculation

use crate::ast::Expr;
use cellcalc_core::CellAddress;
use std::collections::{BTreeMap, BTreeSet};

/// Dependency graph for formula cells
///
/// An edge runs from a dependent cell to each cell its expression reads (its
/// precedents). Every populated cell is a node, so a cell holding a plain number is a
/// node with no outgoing edges. Referenced cells without content are not nodes.
///
/// The graph is rebuilt for every evaluation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DependencyGraph {
    /// Cell → Cells it depends on (precedents)
    precedents: BTreeMap<CellAddress, BTreeSet<CellAddress>>,
    /// Cell → Cells that depend on it (dependents)
    dependents: BTreeMap<CellAddress, BTreeSet<CellAddress>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from every cell's parsed expression
    ///
    /// # Example
    /// ```rust
    /// use cellcalc_core::CellAddress;
    /// use cellcalc_formula::{parse_formula, DependencyGraph};
    ///
    /// let a1 = CellAddress::parse("A1").unwrap();
    /// let b1 = CellAddress::parse("B1").unwrap();
    /// let exprs = vec![(a1, parse_formula("B1*2").unwrap()), (b1, parse_formula("3").unwrap())];
    ///
    /// let graph = DependencyGraph::build(exprs.iter().map(|(addr, expr)| (*addr, expr)));
    /// assert!(graph.precedents(a1).eq([b1]));
    /// assert!(graph.dependents(b1).eq([a1]));
    /// ```
    pub fn build<'e, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = (CellAddress, &'e Expr)>,
    {
        let mut graph = Self::new();
        for (cell, expr) in cells {
            graph.add_cell(cell);
            for precedent in expr.references() {
                graph.add_dependency(precedent, cell);
            }
        }
        graph
    }

    /// Add a node with no edges (no-op if already present)
    pub fn add_cell(&mut self, cell: CellAddress) {
        self.precedents.entry(cell).or_default();
    }

    /// Add a dependency: dependent depends on precedent
    pub fn add_dependency(&mut self, precedent: CellAddress, dependent: CellAddress) {
        self.precedents
            .entry(dependent)
            .or_default()
            .insert(precedent);
        self.dependents
            .entry(precedent)
            .or_default()
            .insert(dependent);
    }

    /// Get cells that the given cell depends on
    pub fn precedents(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.precedents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get cells that depend on the given cell
    pub fn dependents(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Whether the cell is a node of the graph (has content)
    pub fn contains(&self, cell: CellAddress) -> bool {
        self.precedents.contains_key(&cell)
    }

    /// All nodes in row-major order
    pub fn cells(&self) -> impl Iterator<Item = CellAddress> + '_ {
        self.precedents.keys().copied()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.precedents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.precedents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_formula;
    use pretty_assertions::assert_eq;

    fn addr(a1: &str) -> CellAddress {
        CellAddress::parse(a1).unwrap()
    }

    fn graph(cells: &[(&str, &str)]) -> DependencyGraph {
        let exprs: Vec<(CellAddress, Expr)> = cells
            .iter()
            .map(|(a1, text)| (addr(a1), parse_formula(text).unwrap()))
            .collect();
        DependencyGraph::build(exprs.iter().map(|(a, e)| (*a, e)))
    }

    #[test]
    fn test_add_dependency() {
        let mut graph = DependencyGraph::new();

        let a1 = addr("A1");
        let b1 = addr("B1");

        graph.add_dependency(a1, b1);

        assert!(graph.dependents(a1).any(|c| c == b1));
        assert!(graph.precedents(b1).any(|c| c == a1));
    }

    #[test]
    fn test_build_collects_distinct_references() {
        let graph = graph(&[("A1", "B1+B1*C1"), ("B1", "1"), ("C1", "2")]);

        assert_eq!(
            graph.precedents(addr("A1")).collect::<Vec<_>>(),
            vec![addr("B1"), addr("C1")]
        );
        assert_eq!(graph.precedents(addr("B1")).count(), 0);
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_literal_cells_are_leaves() {
        let graph = graph(&[("A1", "42")]);

        assert!(graph.contains(addr("A1")));
        assert_eq!(graph.precedents(addr("A1")).count(), 0);
        assert_eq!(graph.dependents(addr("A1")).count(), 0);
    }

    #[test]
    fn test_references_to_empty_cells_are_not_nodes() {
        let graph = graph(&[("A1", "Z9+1")]);

        assert!(!graph.contains(addr("Z9")));
        assert_eq!(graph.dependents(addr("Z9")).collect::<Vec<_>>(), vec![addr("A1")]);
        assert_eq!(graph.cells().collect::<Vec<_>>(), vec![addr("A1")]);
    }

    #[test]
    fn test_self_reference_is_an_edge() {
        let graph = graph(&[("A1", "A1+1")]);

        assert_eq!(graph.precedents(addr("A1")).collect::<Vec<_>>(), vec![addr("A1")]);
    }
}
