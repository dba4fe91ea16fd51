use std::{cmp::Ordering, iter};

use crate::{descent::DescentGraph, explore::ParentMap, grid::Cell};

/// Cells of one run, starting cell first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    cells: Vec<Cell>,
    steepness: i64,
}

impl Route {
    /// Steepness is the last cell's elevation minus the first's, so a run
    /// downhill has steepness of zero or below.
    pub fn new(cells: Vec<Cell>) -> Self {
        let steepness = match (cells.first(), cells.last()) {
            (Some(first), Some(last)) => i64::from(last.elevation) - i64::from(first.elevation),
            _ => 0,
        };
        Self { cells, steepness }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn steepness(&self) -> i64 {
        self.steepness
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn elevations(&self) -> impl Iterator<Item = i32> + '_ {
        self.cells.iter().map(|c| c.elevation)
    }
}

/// What the reducer keeps among the longest routes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    /// Those with the greatest steepness, i.e. the smallest drop.
    #[default]
    MaxSteepness,
    /// Those with the largest drop from start to end.
    MaxDrop,
    /// All of them.
    AllLongest,
}

/// The best routes found so far. Every kept route ranks equal to the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestRoutes {
    selection: Selection,
    routes: Vec<Route>,
}

impl BestRoutes {
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            routes: Vec::new(),
        }
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn into_routes(self) -> Vec<Route> {
        self.routes
    }

    /// Length shared by every kept route.
    pub fn length(&self) -> Option<usize> {
        self.routes.first().map(Route::len)
    }

    pub fn steepness(&self) -> Option<i64> {
        self.routes.first().map(Route::steepness)
    }

    /// How a route of this length and steepness compares with the kept ones,
    /// `None` while nothing is kept.
    fn rank(&self, length: usize, steepness: i64) -> Option<Ordering> {
        let best = self.routes.first()?;
        Some(match self.selection {
            Selection::MaxSteepness => (length, steepness).cmp(&(best.len(), best.steepness())),
            Selection::MaxDrop => length
                .cmp(&best.len())
                .then(best.steepness().cmp(&steepness)),
            Selection::AllLongest => length.cmp(&best.len()),
        })
    }

    pub fn fold(&mut self, route: Route) {
        match self.rank(route.len(), route.steepness()) {
            None | Some(Ordering::Greater) => {
                self.routes.clear();
                self.routes.push(route);
            }
            Some(Ordering::Equal) => self.routes.push(route),
            Some(Ordering::Less) => {}
        }

        debug_assert!(self
            .routes
            .last()
            .map_or(false, |r| self.rank(r.len(), r.steepness()) == Some(Ordering::Equal)));
    }

    /// Folds in the root of `parents` and one route per key, each running
    /// from the root down to that key. Candidates are ranked from their
    /// depth and end points before their cells are collected.
    pub fn fold_parents(&mut self, graph: &DescentGraph, parents: &ParentMap) {
        let Some(root) = parents.root() else {
            return;
        };
        let top = i64::from(graph.elevation(root));

        for leaf in iter::once(root).chain(parents.keys()) {
            let Some(depth) = parents.depth(leaf) else {
                continue;
            };
            let steepness = i64::from(graph.elevation(leaf)) - top;
            if self.rank(depth + 1, steepness) == Some(Ordering::Less) {
                continue;
            }

            let mut cells = parents
                .chain(leaf)
                .map(|node| graph.cell(node))
                .collect::<Vec<_>>();
            cells.reverse();
            self.fold(Route::new(cells));
        }
    }

    pub fn merge(mut self, other: Self) -> Self {
        for route in other.routes {
            self.fold(route);
        }
        self
    }
}
