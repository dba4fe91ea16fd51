use std::{cmp::Reverse, fmt};

use itertools::Itertools;

use crate::route::{BestRoutes, Route};

/// Human readable summary of the winning routes.
pub struct Report<'a> {
    best: &'a BestRoutes,
}

impl<'a> Report<'a> {
    pub fn new(best: &'a BestRoutes) -> Self {
        Self { best }
    }
}

/// Elevations of `route`, highest first, joined by `" -> "`.
pub fn descending(route: &Route) -> String {
    route
        .elevations()
        .sorted_by_key(|&e| Reverse(e))
        .join(" -> ")
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.best.length() {
            None => writeln!(f, "found 0 route(s)"),
            Some(length) => {
                writeln!(
                    f,
                    "found {} route(s) with length {length}:",
                    self.best.len()
                )?;
                writeln!(f)?;
                for route in self.best.routes() {
                    writeln!(f, "steep {}:\t{}", route.steepness(), descending(route))?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        grid::{Cell, Position},
        route::Selection,
    };

    fn route(elevations: &[i32]) -> Route {
        Route::new(
            elevations
                .iter()
                .enumerate()
                .map(|(row, &elevation)| Cell {
                    pos: Position::new(row, 0),
                    elevation,
                })
                .collect(),
        )
    }

    #[test]
    fn sorts_elevations_descending() {
        assert_eq!(descending(&route(&[1, 3, 5, 7, 9])), "9 -> 7 -> 5 -> 3 -> 1");
        assert_eq!(descending(&route(&[4])), "4");
    }

    #[test]
    fn lists_every_route() {
        let mut best = BestRoutes::new(Selection::MaxSteepness);
        best.fold(route(&[9, 7, 5]));
        best.fold(route(&[6, 4, 2]));

        assert_eq!(
            Report::new(&best).to_string(),
            "found 2 route(s) with length 3:\n\nsteep -4:\t9 -> 7 -> 5\nsteep -4:\t6 -> 4 -> 2\n"
        );
    }

    #[test]
    fn empty_set() {
        let best = BestRoutes::new(Selection::MaxSteepness);
        assert_eq!(Report::new(&best).to_string(), "found 0 route(s)\n");
    }
}
