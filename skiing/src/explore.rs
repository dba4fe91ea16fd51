use std::{cmp::Reverse, iter};

use petgraph::graph::NodeIndex;
use tracing::trace;

use crate::descent::DescentGraph;

/// How a visited cell's parent is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParentRule {
    /// A predecessor on a longest chain from the root. Ties keep the
    /// earlier link.
    #[default]
    LongestChain,
    /// The predecessor the traversal first reached the cell from.
    FirstDiscovery,
}

#[derive(Debug, Clone, Copy)]
struct Link {
    parent: NodeIndex,
    depth: usize,
}

/// Predecessor links of every cell reached from one root. The root itself is
/// never a key.
#[derive(Debug, Clone)]
pub struct ParentMap {
    root: Option<NodeIndex>,
    links: Vec<Option<Link>>,
    visited: Vec<NodeIndex>,
}

impl ParentMap {
    fn new(node_count: usize) -> Self {
        Self {
            root: None,
            links: vec![None; node_count],
            visited: Vec::new(),
        }
    }

    fn reset(&mut self, root: NodeIndex) {
        for node in self.visited.drain(..) {
            self.links[node.index()] = None;
        }
        self.root = Some(root);
    }

    fn link(&mut self, node: NodeIndex, parent: NodeIndex, depth: usize) {
        if self.links[node.index()].replace(Link { parent, depth }).is_none() {
            self.visited.push(node);
        }
    }

    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    pub fn contains(&self, node: NodeIndex) -> bool {
        self.links[node.index()].is_some()
    }

    pub fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.links[node.index()].map(|link| link.parent)
    }

    /// Steps from the root to `node`: 0 for the root, `None` if unreached.
    pub fn depth(&self, node: NodeIndex) -> Option<usize> {
        if self.root == Some(node) {
            Some(0)
        } else {
            self.links[node.index()].map(|link| link.depth)
        }
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    /// Keys in discovery order.
    pub fn keys(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.visited.iter().copied()
    }

    /// `leaf`, its parent, and so on up to the root.
    pub fn chain(&self, leaf: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        iter::successors(Some(leaf), |&node| self.parent(node))
    }
}

/// Depth-first walker over a [`DescentGraph`]. The parent map and the work
/// stack are reused from one root to the next.
pub struct Explorer<'g> {
    graph: &'g DescentGraph,
    rule: ParentRule,
    parents: ParentMap,
    stack: Vec<(NodeIndex, NodeIndex)>,
    order: Vec<NodeIndex>,
}

impl<'g> Explorer<'g> {
    pub fn new(graph: &'g DescentGraph, rule: ParentRule) -> Self {
        Self {
            graph,
            rule,
            parents: ParentMap::new(graph.node_count()),
            stack: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn explore(&mut self, root: NodeIndex) -> &ParentMap {
        self.parents.reset(root);
        self.discover(root);
        if self.rule == ParentRule::LongestChain {
            self.settle(root);
        }

        trace!(
            root = root.index(),
            visited = self.parents.len(),
            "explored"
        );
        &self.parents
    }

    fn discover(&mut self, root: NodeIndex) {
        let Self {
            graph,
            parents,
            stack,
            ..
        } = self;

        stack.clear();
        stack.extend(graph.descents(root).map(|next| (next, root)));

        while let Some((node, parent)) = stack.pop() {
            if parents.contains(node) {
                continue;
            }
            debug_assert_ne!(node, root, "descent graph has a cycle");

            let depth = parents.depth(parent).map_or(1, |d| d + 1);
            parents.link(node, parent, depth);
            stack.extend(
                graph
                    .descents(node)
                    .filter(|&next| !parents.contains(next))
                    .map(|next| (next, node)),
            );
        }
    }

    /// Relaxes every reached descent in descending elevation order, which is
    /// a topological order of the descent graph.
    fn settle(&mut self, root: NodeIndex) {
        let Self {
            graph,
            parents,
            order,
            ..
        } = self;

        order.clear();
        order.extend(parents.keys());
        order.sort_by_key(|&node| (Reverse(graph.elevation(node)), node.index()));

        for node in iter::once(root).chain(order.iter().copied()) {
            let Some(depth) = parents.depth(node) else {
                continue;
            };
            for next in graph.descents(node) {
                if parents.depth(next).map_or(true, |d| depth + 1 > d) {
                    parents.link(next, node, depth + 1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descent::Roots;
    use crate::grid::{Grid, Position};
    use rstest::rstest;

    const TEST_INPUT: &str = include_str!("../data/test_input");
    const REDMART: &str = include_str!("../data/redmart");

    fn build(input: &str) -> (Grid, DescentGraph) {
        let grid: Grid = input.parse().unwrap();
        let graph = DescentGraph::from(&grid);
        (grid, graph)
    }

    fn reachable(graph: &DescentGraph, root: NodeIndex) -> Vec<NodeIndex> {
        let mut dfs = petgraph::visit::Dfs::new(graph.graph(), root);
        let mut found = Vec::new();
        while let Some(node) = dfs.next(graph.graph()) {
            if node != root {
                found.push(node);
            }
        }
        found.sort();
        found
    }

    #[rstest]
    #[case(TEST_INPUT, ParentRule::LongestChain)]
    #[case(TEST_INPUT, ParentRule::FirstDiscovery)]
    #[case(REDMART, ParentRule::LongestChain)]
    #[case(REDMART, ParentRule::FirstDiscovery)]
    fn parent_map_is_a_tree_of_descents(#[case] input: &str, #[case] rule: ParentRule) {
        let (_, graph) = build(input);
        let mut explorer = Explorer::new(&graph, rule);

        for root in graph.roots(Roots::Summits).collect::<Vec<_>>() {
            let parents = explorer.explore(root);

            assert_eq!(parents.root(), Some(root));
            assert!(!parents.contains(root));

            let mut keys = parents.keys().collect::<Vec<_>>();
            keys.sort();
            assert_eq!(keys, reachable(&graph, root));

            for leaf in parents.keys() {
                let chain = parents.chain(leaf).collect::<Vec<_>>();
                assert_eq!(chain.last(), Some(&root));
                assert_eq!(chain.len(), parents.depth(leaf).unwrap() + 1);
                for pair in chain.windows(2) {
                    assert!(graph.descents(pair[1]).any(|n| n == pair[0]));
                }
            }
        }
    }

    #[test]
    fn longest_chain_follows_the_spiral() {
        let (grid, graph) = build(TEST_INPUT);
        let root = NodeIndex::new(grid.ind(Position::new(2, 2)));
        let bottom = NodeIndex::new(grid.ind(Position::new(0, 0)));

        let mut explorer = Explorer::new(&graph, ParentRule::LongestChain);
        let parents = explorer.explore(root);

        assert_eq!(parents.len(), 24);
        assert_eq!(parents.depth(bottom), Some(24));
        let elevations = parents
            .chain(bottom)
            .map(|n| graph.elevation(n))
            .collect::<Vec<_>>();
        assert_eq!(elevations, (1..=25).collect::<Vec<_>>());
    }

    #[test]
    fn first_discovery_is_no_deeper() {
        let (grid, graph) = build(TEST_INPUT);
        let root = NodeIndex::new(grid.ind(Position::new(2, 2)));

        let mut first = Explorer::new(&graph, ParentRule::FirstDiscovery);
        let parents = first.explore(root);
        let first_depths = parents
            .keys()
            .map(|n| (n, parents.depth(n)))
            .collect::<Vec<_>>();

        let mut longest = Explorer::new(&graph, ParentRule::LongestChain);
        let parents = longest.explore(root);
        for (node, depth) in first_depths {
            assert!(depth <= parents.depth(node));
        }
    }

    #[test]
    fn map_is_cleared_between_roots() {
        let (grid, graph) = build("1 5\n5 1 4 2 3");
        let mut explorer = Explorer::new(&graph, ParentRule::default());

        let first = NodeIndex::new(grid.ind(Position::new(0, 0)));
        assert_eq!(explorer.explore(first).len(), 1);

        let second = NodeIndex::new(grid.ind(Position::new(0, 2)));
        let parents = explorer.explore(second);
        assert_eq!(parents.root(), Some(second));
        assert_eq!(parents.len(), 2);
        assert!(!parents.contains(NodeIndex::new(0)));
    }

    #[test]
    fn isolated_root_has_no_keys() {
        let (_, graph) = build("1 1\n5");
        let mut explorer = Explorer::new(&graph, ParentRule::default());
        let parents = explorer.explore(NodeIndex::new(0));
        assert!(parents.is_empty());
        assert_eq!(parents.depth(NodeIndex::new(0)), Some(0));
        assert_eq!(parents.chain(NodeIndex::new(0)).count(), 1);
    }
}
