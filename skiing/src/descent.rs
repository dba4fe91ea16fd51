use std::{cmp::Ordering, fmt};

use itertools::Itertools;
use petgraph::graph::{Graph, NodeIndex};
use tracing::debug;

use crate::grid::{Cell, Grid};

/// Which cells a search starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Roots {
    /// Cells with no strictly higher neighbour, plateau cells included.
    #[default]
    Summits,
    /// Cells whose neighbours are all strictly lower.
    Sources,
}

/// Directed graph of single downhill steps. Node indices match the grid's
/// row-major indices.
#[derive(Debug, Clone)]
pub struct DescentGraph {
    graph: Graph<Cell, ()>,
    sources: Vec<bool>,
    summits: Vec<bool>,
}

impl From<&Grid> for DescentGraph {
    fn from(grid: &Grid) -> Self {
        let mut graph = Graph::with_capacity(grid.len(), 2 * grid.len());
        for cell in grid.cells() {
            graph.add_node(cell);
        }

        let mut sources = Vec::with_capacity(grid.len());
        let mut summits = Vec::with_capacity(grid.len());

        for cell in grid.cells() {
            let from = NodeIndex::new(grid.ind(cell.pos));
            let (mut source, mut summit) = (true, true);

            for next in grid.neighbours(cell.pos) {
                match next.elevation.cmp(&cell.elevation) {
                    Ordering::Less => {
                        graph.add_edge(from, NodeIndex::new(grid.ind(next.pos)), ());
                    }
                    Ordering::Equal => source = false,
                    Ordering::Greater => {
                        source = false;
                        summit = false;
                    }
                }
            }

            sources.push(source);
            summits.push(summit);
        }

        debug!(
            cells = graph.node_count(),
            descents = graph.edge_count(),
            sources = sources.iter().filter(|&&s| s).count(),
            summits = summits.iter().filter(|&&s| s).count(),
            "built descent graph"
        );

        Self {
            graph,
            sources,
            summits,
        }
    }
}

impl DescentGraph {
    pub fn graph(&self) -> &Graph<Cell, ()> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn cell(&self, node: NodeIndex) -> Cell {
        self.graph[node]
    }

    pub fn elevation(&self, node: NodeIndex) -> i32 {
        self.graph[node].elevation
    }

    pub fn descents(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(node)
    }

    pub fn is_source(&self, node: NodeIndex) -> bool {
        self.sources[node.index()]
    }

    pub fn is_summit(&self, node: NodeIndex) -> bool {
        self.summits[node.index()]
    }

    /// Start cells in row-major order.
    pub fn roots(&self, roots: Roots) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices().filter(move |&node| match roots {
            Roots::Summits => self.is_summit(node),
            Roots::Sources => self.is_source(node),
        })
    }
}

impl fmt::Display for DescentGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.graph.node_indices() {
            let cell = self.cell(node);
            writeln!(
                f,
                "({}, {}) {}: source: {}, summit: {}, descents: [{}]",
                cell.pos.row,
                cell.pos.col,
                cell.elevation,
                self.is_source(node),
                self.is_summit(node),
                self.descents(node).map(|n| self.elevation(n)).join(", ")
            )?;
        }
        Ok(())
    }
}
