use petgraph::dot::Dot;
use tracing::{enabled, trace, Level};

use super::builder::QueryGraph;

pub fn trace_graph(graph: &QueryGraph) {
    if !enabled!(Level::TRACE) {
        return;
    }

    trace!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "query graph\n{:?}",
        Dot::with_config(&graph.graph, &[])
    );
}
