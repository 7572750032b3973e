//! Task connectivity
//!
//! The SBP stores its graph as a flat list of directed connections. For
//! scoping views, direction does not matter: two tasks are related when any
//! chain of connections joins them. Adjacency is built inside each call from
//! the edge list and discarded afterwards, so it can never drift from the
//! document.

use capmap_dsl::Connection;
use petgraph::graphmap::UnGraphMap;
use std::collections::HashSet;

/// Every task id reachable from `seeds`, treating connections as undirected
///
/// Seeds are always part of the result, even when no connection touches
/// them. Endpoints are taken as-is, so ids that are not tasks (for example
/// dangling edge ends) can appear in the result.
#[must_use]
pub fn reachable_tasks<I, S>(seeds: I, connections: &[Connection]) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let graph: UnGraphMap<&str, ()> = UnGraphMap::from_edges(
        connections
            .iter()
            .map(|c| (c.source.as_str(), c.target.as_str())),
    );

    let seeds: Vec<S> = seeds.into_iter().collect();
    let mut work: Vec<&str> = seeds.iter().map(AsRef::as_ref).collect();
    let mut visited: HashSet<&str> = HashSet::new();

    while let Some(task) = work.pop() {
        if !visited.insert(task) {
            continue;
        }
        if graph.contains_node(task) {
            work.extend(graph.neighbors(task).filter(|n| !visited.contains(n)));
        }
    }

    visited.into_iter().map(str::to_string).collect()
}
