use std::collections::HashMap;

use petgraph::{
    graph::{EdgeIndex, NodeIndex},
    stable_graph::StableDiGraph,
    visit::EdgeRef,
    Direction,
};
use tracing::debug;

use super::clauses::{segment_clauses, summarize};
use super::graph::{discover_tables, extract_table_names};
use super::styles::{style_for, ROOT_STYLE, TABLE_STYLE};
use super::types::{
    ClauseSegment, EdgeStyle, GraphEdge, GraphNode, NodeRole, TableRef, Token,
};

pub const ROOT_ID: &str = "sql_query_root";
pub const ROOT_LABEL: &str = "SQL Query";
pub const ACCESS_LABEL: &str = "accesses";

/// Graph title: the statement echoed back, cut to `width` characters.
pub fn title_for(query: &str, width: usize) -> String {
    if query.chars().count() > width {
        format!("SQL Query: {}...", query.chars().take(width).collect::<String>())
    } else {
        format!("SQL Query: {}", query)
    }
}

/// The structure of one statement: table nodes, the root, and one node per
/// clause occurrence. Solid edges chain the clauses in source order, dashed
/// edges link FROM/JOIN clauses to the tables they read.
#[derive(Debug)]
pub struct QueryGraph {
    pub graph: StableDiGraph<GraphNode, GraphEdge>,
    pub root: NodeIndex,
    pub title: String,
}

impl QueryGraph {
    /// Nodes in creation order.
    pub fn nodes(&self) -> Vec<&GraphNode> {
        self.graph.node_indices().map(|idx| &self.graph[idx]).collect()
    }

    #[cfg(test)]
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.graph
            .node_indices()
            .map(|idx| &self.graph[idx])
            .find(|node| node.id == id)
    }

    pub fn table_nodes(&self) -> Vec<&GraphNode> {
        self.nodes().into_iter().filter(|x| x.is_table()).collect()
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.table_nodes()
            .into_iter()
            .filter_map(|x| match &x.role {
                NodeRole::Table(table) => Some(table.name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Edges in creation order as (from, to, edge).
    pub fn edges(&self) -> Vec<(&GraphNode, &GraphNode, &GraphEdge)> {
        self.graph
            .edge_indices()
            .filter_map(|idx: EdgeIndex| {
                let (from, to) = self.graph.edge_endpoints(idx)?;
                Some((&self.graph[from], &self.graph[to], &self.graph[idx]))
            })
            .collect()
    }

    /// The root followed by every clause node along the solid chain.
    pub fn chain(&self) -> Vec<&GraphNode> {
        let mut chain = vec![&self.graph[self.root]];
        let mut cursor = self.root;

        while let Some(next) = self
            .graph
            .edges_directed(cursor, Direction::Outgoing)
            .find(|edge| edge.weight().style == EdgeStyle::Solid)
            .map(|edge| edge.target())
        {
            chain.push(&self.graph[next]);
            cursor = next;
        }

        chain
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Builds a [`QueryGraph`] from the tokens of one statement. A builder is
/// consumed by [`GraphBuilder::build`], so the table lookup never outlives
/// the statement it was filled from.
pub struct GraphBuilder {
    graph: StableDiGraph<GraphNode, GraphEdge>,
    tables: HashMap<String, NodeIndex>,
    detail_budget: usize,
}

impl GraphBuilder {
    pub fn new(detail_budget: usize) -> Self {
        GraphBuilder {
            graph: StableDiGraph::new(),
            tables: HashMap::new(),
            detail_budget,
        }
    }

    pub fn build(mut self, tokens: &[Token], title: String) -> QueryGraph {
        // Every table node has to exist before the clause pass links to it,
        // whatever order the clauses reference them in.
        for name in discover_tables(tokens) {
            self.add_table(name);
        }

        let root = self.graph.add_node(GraphNode {
            id: ROOT_ID.to_string(),
            label: ROOT_LABEL.to_string(),
            style: ROOT_STYLE,
            role: NodeRole::Root,
        });

        let mut cursor = root;
        for segment in segment_clauses(tokens) {
            cursor = self.add_clause(cursor, segment);
        }

        QueryGraph {
            graph: self.graph,
            root,
            title,
        }
    }

    fn add_table(&mut self, name: String) {
        if self.tables.contains_key(&name) {
            return;
        }

        let node = self.graph.add_node(GraphNode {
            id: format!("tbl_{}", name),
            label: format!("TABLE\n{}", name),
            style: TABLE_STYLE,
            role: NodeRole::Table(TableRef { name: name.clone() }),
        });
        self.tables.insert(name, node);
    }

    fn add_clause(&mut self, cursor: NodeIndex, segment: ClauseSegment) -> NodeIndex {
        let kind = segment.kind;
        let summary = summarize(&segment.detail_tokens, self.detail_budget);
        let label = if summary.is_empty() {
            kind.name().to_string()
        } else {
            format!("{}\n({})", kind, summary)
        };

        let accessed = if kind.accesses_tables() {
            extract_table_names(&segment.detail_tokens)
        } else {
            Vec::new()
        };

        let node = self.graph.add_node(GraphNode {
            id: format!("clause_{}_{}", kind.slug(), segment.position),
            label,
            style: style_for(kind),
            role: NodeRole::Clause(segment),
        });
        self.graph.add_edge(
            cursor,
            node,
            GraphEdge {
                style: EdgeStyle::Solid,
                label: None,
            },
        );

        for name in accessed {
            let Some(table) = self.tables.get(&name) else {
                continue;
            };
            debug!(clause = %kind, table = %name, "access edge");
            self.graph.add_edge(
                node,
                *table,
                GraphEdge {
                    style: EdgeStyle::Dashed,
                    label: Some(ACCESS_LABEL.to_string()),
                },
            );
        }

        node
    }
}
