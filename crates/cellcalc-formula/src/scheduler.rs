//! Evaluation ordering over a dependency graph
//!
//! Both operations are iterative depth-first searches over an explicit visitation-state
//! table, so stack usage does not grow with the length of a dependency chain.
//!
//! - [`order`] is strict: it stops at the first cycle it meets.
//! - [`schedule`] is what an evaluation pass uses: it separates every cell lying on a
//!   cycle from the cells that can still be ordered.

use crate::dependency::DependencyGraph;
use crate::error::{FormulaError, FormulaResult};
use cellcalc_core::CellAddress;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

/// Order the cells of a graph so every cell comes after all cells it depends on
///
/// Fails with [`FormulaError::CircularReference`] naming the cell where the first cycle
/// was entered. A cell referencing itself is a one-cell cycle.
pub fn order(graph: &DependencyGraph) -> FormulaResult<Vec<CellAddress>> {
    let mut state: HashMap<CellAddress, VisitState> = HashMap::with_capacity(graph.len());
    let mut ordered = Vec::with_capacity(graph.len());
    let state_of = |state: &HashMap<CellAddress, VisitState>, cell| {
        state.get(&cell).copied().unwrap_or(VisitState::Unvisited)
    };

    for root in graph.cells() {
        if state_of(&state, root) != VisitState::Unvisited {
            continue;
        }

        state.insert(root, VisitState::InProgress);
        let mut stack = vec![(root, graph.precedents(root))];

        while let Some((cell, precedents)) = stack.last_mut() {
            match precedents.next() {
                Some(next) => match state_of(&state, next) {
                    VisitState::InProgress => {
                        return Err(FormulaError::CircularReference(next));
                    }
                    VisitState::Done => {}
                    VisitState::Unvisited => {
                        // Empty cells are not nodes and need no ordering
                        if graph.contains(next) {
                            state.insert(next, VisitState::InProgress);
                            stack.push((next, graph.precedents(next)));
                        }
                    }
                },
                None => {
                    let cell = *cell;
                    state.insert(cell, VisitState::Done);
                    ordered.push(cell);
                    stack.pop();
                }
            }
        }
    }

    Ok(ordered)
}

/// Result of scheduling a whole sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    /// Acyclic cells, each after every cell it depends on
    order: Vec<CellAddress>,
    /// Cells lying on at least one cycle
    cycles: BTreeSet<CellAddress>,
}

impl Schedule {
    /// Cells that can be evaluated, in evaluation order
    pub fn order(&self) -> &[CellAddress] {
        &self.order
    }

    /// Cells that lie on a cycle and cannot be evaluated
    pub fn cycles(&self) -> &BTreeSet<CellAddress> {
        &self.cycles
    }

    pub fn is_cyclic(&self, cell: CellAddress) -> bool {
        self.cycles.contains(&cell)
    }

    /// Partition the ordered cells into layers
    ///
    /// A cell in layer `k` only depends on cells of earlier layers, on cycle cells, or
    /// on empty cells, so all cells of one layer can be evaluated independently once the
    /// earlier layers are done.
    pub fn layers(&self, graph: &DependencyGraph) -> Vec<Vec<CellAddress>> {
        let mut level: HashMap<CellAddress, usize> = HashMap::with_capacity(self.order.len());
        let mut layers: Vec<Vec<CellAddress>> = Vec::new();

        for &cell in &self.order {
            let depth = graph
                .precedents(cell)
                .filter_map(|p| level.get(&p).map(|l| l + 1))
                .max()
                .unwrap_or(0);

            level.insert(cell, depth);
            if layers.len() <= depth {
                layers.resize_with(depth + 1, Vec::new);
            }
            layers[depth].push(cell);
        }

        layers
    }
}

#[derive(Debug, Clone, Copy)]
struct Link {
    state: VisitState,
    index: usize,
    low: usize,
}

/// Schedule every cell of a graph, setting aside the cells that lie on cycles
///
/// Unlike [`order`] this never fails. The visitation-state table is extended with
/// low-links (Tarjan's algorithm): a cell stays in progress until its strongly connected
/// component is complete, so a cell that closes a cycle through an already finished
/// cell is still reported as part of that cycle.
///
/// # Example
/// ```rust
/// use cellcalc_core::CellAddress;
/// use cellcalc_formula::{parse_formula, schedule, DependencyGraph};
///
/// let cells: Vec<_> = [("A1", "B1"), ("B1", "A1"), ("C1", "1"), ("D1", "C1+1")]
///     .iter()
///     .map(|(a1, text)| (CellAddress::parse(a1).unwrap(), parse_formula(text).unwrap()))
///     .collect();
/// let graph = DependencyGraph::build(cells.iter().map(|(a, e)| (*a, e)));
///
/// let schedule = schedule(&graph);
/// assert_eq!(schedule.cycles().len(), 2);
/// assert_eq!(schedule.order().len(), 2);
/// ```
pub fn schedule(graph: &DependencyGraph) -> Schedule {
    let mut links: HashMap<CellAddress, Link> = HashMap::with_capacity(graph.len());
    let mut component_stack: Vec<CellAddress> = Vec::new();
    let mut result = Schedule::default();
    let mut next_index = 0usize;

    for root in graph.cells() {
        if links.contains_key(&root) {
            continue;
        }

        let mut visit = |cell: CellAddress,
                         links: &mut HashMap<CellAddress, Link>,
                         component_stack: &mut Vec<CellAddress>| {
            links.insert(
                cell,
                Link {
                    state: VisitState::InProgress,
                    index: next_index,
                    low: next_index,
                },
            );
            next_index += 1;
            component_stack.push(cell);
        };

        visit(root, &mut links, &mut component_stack);
        let mut stack = vec![(root, graph.precedents(root))];

        while let Some((cell, precedents)) = stack.last_mut() {
            let cell = *cell;

            if let Some(next) = precedents.next() {
                if !graph.contains(next) {
                    continue;
                }
                match links.get(&next).map(|l| (l.state, l.index)) {
                    None => {
                        visit(next, &mut links, &mut component_stack);
                        stack.push((next, graph.precedents(next)));
                    }
                    Some((VisitState::InProgress, index)) => {
                        if let Some(link) = links.get_mut(&cell) {
                            link.low = link.low.min(index);
                        }
                    }
                    Some(_) => {}
                }
                continue;
            }

            stack.pop();
            let Some(link) = links.get(&cell).copied() else {
                continue;
            };

            if let Some((parent, _)) = stack.last() {
                if let Some(parent_link) = links.get_mut(parent) {
                    parent_link.low = parent_link.low.min(link.low);
                }
            }

            if link.low != link.index {
                continue;
            }

            // `cell` roots a complete component
            let mut component = Vec::new();
            while let Some(member) = component_stack.pop() {
                if let Some(member_link) = links.get_mut(&member) {
                    member_link.state = VisitState::Done;
                }
                component.push(member);
                if member == cell {
                    break;
                }
            }

            let self_loop = graph.precedents(cell).any(|p| p == cell);
            if component.len() > 1 || self_loop {
                log::debug!(
                    "Cells {} form a circular reference",
                    component
                        .iter()
                        .map(CellAddress::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                result.cycles.extend(component);
            } else {
                result.order.push(cell);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;
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

    fn names(cells: &[CellAddress]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn assert_dependencies_first(graph: &DependencyGraph, ordered: &[CellAddress]) {
        for (i, &cell) in ordered.iter().enumerate() {
            for precedent in graph.precedents(cell) {
                if let Some(j) = ordered.iter().position(|&c| c == precedent) {
                    assert!(j < i, "{} must come before {}", precedent, cell);
                }
            }
        }
    }

    #[test]
    fn test_order_chain() {
        let graph = graph(&[("A1", "B1+1"), ("B1", "C1*2"), ("C1", "3")]);
        assert_eq!(names(&order(&graph).unwrap()), vec!["C1", "B1", "A1"]);
    }

    #[test]
    fn test_order_shared_dependency_visited_once() {
        let graph = graph(&[("A1", "C1+D1"), ("B1", "C1"), ("C1", "D1"), ("D1", "1")]);
        let ordered = order(&graph).unwrap();

        assert_eq!(ordered.len(), 4);
        assert_dependencies_first(&graph, &ordered);
    }

    #[test]
    fn test_order_skips_empty_references() {
        let graph = graph(&[("A1", "Z1+1")]);
        assert_eq!(names(&order(&graph).unwrap()), vec!["A1"]);
    }

    #[test]
    fn test_order_self_reference() {
        let graph = graph(&[("A1", "A1+1")]);
        assert_eq!(order(&graph), Err(FormulaError::CircularReference(addr("A1"))));
    }

    #[test]
    fn test_order_mutual_reference() {
        let graph = graph(&[("A1", "B1"), ("B1", "A1")]);
        assert_eq!(order(&graph), Err(FormulaError::CircularReference(addr("A1"))));
    }

    #[test]
    fn test_schedule_without_cycles_matches_order() {
        let graph = graph(&[("A1", "B1+C1"), ("B1", "C1"), ("C1", "2"), ("D1", "A1")]);
        let schedule = schedule(&graph);

        assert!(schedule.cycles().is_empty());
        assert_eq!(schedule.order().len(), 4);
        assert_dependencies_first(&graph, schedule.order());
    }

    #[test]
    fn test_schedule_isolates_cycles() {
        let graph = graph(&[
            ("A1", "B1"),
            ("B1", "A1"),
            ("C1", "C1"),
            ("D1", "A1+E1"),
            ("E1", "5"),
        ]);
        let schedule = schedule(&graph);

        assert_eq!(
            schedule.cycles().iter().map(|c| c.to_string()).collect::<Vec<_>>(),
            vec!["A1", "B1", "C1"]
        );
        assert_eq!(names(schedule.order()), vec!["E1", "D1"]);
    }

    #[test]
    fn test_schedule_cycle_closed_through_finished_cell() {
        // A1 -> B1 -> A1 and A1 -> C1 -> B1: C1 is on the cycle A1 -> C1 -> B1 -> A1
        // even though B1 has been fully explored by the time C1 is reached.
        let graph = graph(&[("A1", "B1+C1"), ("B1", "A1"), ("C1", "B1")]);
        let schedule = schedule(&graph);

        assert_eq!(schedule.cycles().len(), 3);
        assert!(schedule.order().is_empty());
    }

    #[test]
    fn test_schedule_cell_downstream_of_cycle_is_not_cyclic() {
        let graph = graph(&[("A1", "B1"), ("B1", "A1"), ("C1", "A1")]);
        let schedule = schedule(&graph);

        assert!(!schedule.is_cyclic(addr("C1")));
        assert_eq!(names(schedule.order()), vec!["C1"]);
    }

    #[test]
    fn test_layers() {
        let graph = graph(&[
            ("A1", "1"),
            ("A2", "2"),
            ("B1", "A1+A2"),
            ("B2", "A2*2"),
            ("C1", "B1+B2+A1"),
        ]);
        let schedule = schedule(&graph);
        let layers: Vec<Vec<String>> = schedule
            .layers(&graph)
            .iter()
            .map(|layer| names(layer))
            .collect();

        assert_eq!(
            layers,
            vec![vec!["A1", "A2"], vec!["B1", "B2"], vec!["C1"]]
        );
    }

    #[test]
    fn test_long_chain_does_not_overflow_stack() {
        // A1 reads A2, A2 reads A3, ... so the first root walks the whole chain
        let cells: Vec<(CellAddress, Expr)> = (0..50_000u32)
            .map(|row| {
                let expr = if row == 49_999 {
                    Expr::Literal(1.0)
                } else {
                    Expr::CellRef(CellAddress::new(row + 1, 0))
                };
                (CellAddress::new(row, 0), expr)
            })
            .collect();
        let graph = DependencyGraph::build(cells.iter().map(|(a, e)| (*a, e)));

        assert_eq!(order(&graph).unwrap().len(), 50_000);
        assert_eq!(schedule(&graph).order().len(), 50_000);
    }
}
