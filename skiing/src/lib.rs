//! Longest, then steepest, ski run down a grid of elevations.
//!
//! A run moves between orthogonal neighbours and every step goes strictly
//! downhill. The pipeline reads a [`Grid`], builds its [`DescentGraph`],
//! explores it from every start cell with an [`Explorer`] and folds each
//! resulting [`ParentMap`] into [`BestRoutes`].

pub mod descent;
pub mod explore;
pub mod grid;
pub mod report;
pub mod route;

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, trace};

pub use descent::{DescentGraph, Roots};
pub use explore::{Explorer, ParentMap, ParentRule};
pub use grid::{Cell, Grid, MalformedInput, Position};
pub use report::Report;
pub use route::{BestRoutes, Route, Selection};

#[derive(Error, Debug)]
pub enum SkiError {
    #[error("error reading map file '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error processing map file '{}'", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: MalformedInput,
    },
}

/// Knobs for one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchConfig {
    pub roots: Roots,
    pub parents: ParentRule,
    pub selection: Selection,
    /// Explore start cells on the rayon thread pool.
    pub parallel: bool,
}

pub fn load_grid(path: &Path) -> Result<Grid, SkiError> {
    let input = util::read_input(path).map_err(|source| SkiError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let grid: Grid = input.parse().map_err(|source| SkiError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        path = %path.display(),
        rows = grid.rows(),
        cols = grid.cols(),
        "loaded grid"
    );
    Ok(grid)
}

pub fn find_best_routes(grid: &Grid, config: SearchConfig) -> BestRoutes {
    let graph = DescentGraph::from(grid);
    trace!("descent graph:\n{graph}");

    let roots = graph.roots(config.roots).collect::<Vec<_>>();
    debug!(roots = roots.len(), ?config, "exploring");

    let best = if config.parallel {
        roots
            .into_par_iter()
            .fold(
                || {
                    (
                        Explorer::new(&graph, config.parents),
                        BestRoutes::new(config.selection),
                    )
                },
                |(mut explorer, mut best), root| {
                    best.fold_parents(&graph, explorer.explore(root));
                    (explorer, best)
                },
            )
            .map(|(_, best)| best)
            .reduce(|| BestRoutes::new(config.selection), BestRoutes::merge)
    } else {
        let mut explorer = Explorer::new(&graph, config.parents);
        roots
            .into_iter()
            .fold(BestRoutes::new(config.selection), |mut best, root| {
                best.fold_parents(&graph, explorer.explore(root));
                best
            })
    };

    info!(
        routes = best.len(),
        length = best.length(),
        steepness = best.steepness(),
        "search finished"
    );
    best
}
