//! Table relationship graph and breadth-first expansion.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use wcm_model::TableName;

/// Symmetric table adjacency.
///
/// Tables are interned to dense ids; neighbor lists are sorted by table name
/// so traversal order is deterministic.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    names: Vec<TableName>,
    ids: HashMap<TableName, usize>,
    adjacency: Vec<Vec<usize>>,
}

impl RelationshipGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from foreign-key edges. Each edge links both ways.
    pub fn from_edges(edges: impl IntoIterator<Item = (TableName, TableName)>) -> Self {
        let mut graph = Self::new();
        for (from, to) in edges {
            graph.add_edge(from, to);
        }
        graph.finish()
    }

    /// Builds a graph from a table-to-neighbors map, adding the reverse
    /// direction of every listed edge.
    pub fn from_adjacency<N>(adjacency: impl IntoIterator<Item = (TableName, N)>) -> Self
    where
        N: IntoIterator<Item = TableName>,
    {
        let mut graph = Self::new();
        for (table, neighbors) in adjacency {
            graph.intern(table.clone());
            for neighbor in neighbors {
                graph.add_edge(table.clone(), neighbor);
            }
        }
        graph.finish()
    }

    fn intern(&mut self, table: TableName) -> usize {
        if let Some(&id) = self.ids.get(&table) {
            return id;
        }
        let id = self.names.len();
        self.ids.insert(table.clone(), id);
        self.names.push(table);
        self.adjacency.push(Vec::new());
        id
    }

    fn add_edge(&mut self, from: TableName, to: TableName) {
        let a = self.intern(from);
        let b = self.intern(to);
        if a != b {
            self.adjacency[a].push(b);
            self.adjacency[b].push(a);
        }
    }

    fn finish(mut self) -> Self {
        let names = &self.names;
        for neighbors in &mut self.adjacency {
            neighbors.sort_by(|x, y| names[*x].cmp(&names[*y]));
            neighbors.dedup();
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn table_count(&self) -> usize {
        self.names.len()
    }

    /// Undirected edges, each counted once.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn contains(&self, table: &TableName) -> bool {
        self.ids.contains_key(table)
    }

    pub fn neighbors<'a>(&'a self, table: &TableName) -> impl Iterator<Item = &'a TableName> + 'a {
        self.ids
            .get(table)
            .map(|&id| self.adjacency[id].as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&id| &self.names[id])
    }

    /// Breadth-first expansion from `seeds` up to `max_depth` hops.
    ///
    /// Returns the discovered tables in visit order, seeds first. Every table
    /// is visited at most once.
    pub fn bfs<'a>(&self, seeds: impl IntoIterator<Item = &'a TableName>, max_depth: usize) -> Vec<TableName> {
        let mut visited = VisitedSet::with_len(self.names.len());
        let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
        let mut order = Vec::new();

        for seed in seeds {
            if let Some(&id) = self.ids.get(seed)
                && visited.insert(id)
            {
                queue.push_back((id, 0));
            }
        }

        while let Some((id, depth)) = queue.pop_front() {
            order.push(self.names[id].clone());
            if depth == max_depth {
                continue;
            }
            for &next in &self.adjacency[id] {
                if visited.insert(next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }
        order
    }
}

/// Fixed-size bitset over interned table ids.
struct VisitedSet {
    words: Vec<u64>,
}

impl VisitedSet {
    fn with_len(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
        }
    }

    /// Marks `id`; returns false if it was already marked.
    fn insert(&mut self, id: usize) -> bool {
        let mask = 1u64 << (id % 64);
        let word = &mut self.words[id / 64];
        let fresh = *word & mask == 0;
        *word |= mask;
        fresh
    }
}

/// Result of expanding a query's tables over the relationship graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalResult {
    /// False when no graph was available; `related` is then empty.
    pub performed: bool,
    /// Original tables tied for the highest frequency.
    pub seeds: BTreeSet<TableName>,
    /// Tables reached by the search, in visit order.
    pub visit_order: Vec<TableName>,
    /// Reached tables that were not among the originals.
    pub related: BTreeSet<TableName>,
    /// Originals plus related.
    pub all: BTreeSet<TableName>,
}

/// Expands the frequency-maximal tables of `frequencies` over `graph`.
pub fn traverse(
    frequencies: &BTreeMap<TableName, usize>,
    graph: Option<&RelationshipGraph>,
    max_depth: usize,
) -> TraversalResult {
    let original: BTreeSet<TableName> = frequencies.keys().cloned().collect();
    let top = frequencies.values().copied().max().unwrap_or(0);
    let seeds: BTreeSet<TableName> = frequencies
        .iter()
        .filter(|(_, frequency)| **frequency == top)
        .map(|(table, _)| table.clone())
        .collect();

    let Some(graph) = graph.filter(|graph| !graph.is_empty()) else {
        debug!(tables = original.len(), "no relationship graph, traversal skipped");
        return TraversalResult {
            performed: false,
            seeds,
            visit_order: Vec::new(),
            related: BTreeSet::new(),
            all: original,
        };
    };

    let visit_order = graph.bfs(&seeds, max_depth);
    let related: BTreeSet<TableName> = visit_order
        .iter()
        .filter(|table| !original.contains(*table))
        .cloned()
        .collect();
    let all: BTreeSet<TableName> = original.union(&related).cloned().collect();
    debug!(
        seeds = seeds.len(),
        visited = visit_order.len(),
        related = related.len(),
        max_depth,
        "relationship traversal"
    );

    TraversalResult {
        performed: true,
        seeds,
        visit_order,
        related,
        all,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str) -> TableName {
        TableName::from(name)
    }

    #[test]
    fn edges_are_symmetric_and_deduplicated() {
        let graph = RelationshipGraph::from_edges([
            (table("orders"), table("customers")),
            (table("customers"), table("orders")),
            (table("orders"), table("orders")),
        ]);
        assert_eq!(graph.table_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        let neighbors: Vec<&str> = graph
            .neighbors(&table("customers"))
            .map(TableName::as_str)
            .collect();
        assert_eq!(neighbors, vec!["orders"]);
        assert_eq!(graph.neighbors(&table("missing")).count(), 0);
    }

    #[test]
    fn visited_set_marks_once() {
        let mut visited = VisitedSet::with_len(130);
        assert!(visited.insert(129));
        assert!(!visited.insert(129));
        assert!(visited.insert(0));
    }

    #[test]
    fn bfs_respects_depth() {
        let graph = RelationshipGraph::from_edges([
            (table("a"), table("b")),
            (table("b"), table("c")),
            (table("c"), table("d")),
        ]);
        let order: Vec<String> = graph
            .bfs([&table("a")], 2)
            .into_iter()
            .map(|t| t.as_str().to_string())
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(graph.bfs([&table("a")], 0), vec![table("a")]);
    }
}
