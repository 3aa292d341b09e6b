use std::{fs, path::Path};

use tempfile::tempdir;

use crate::config::{OutputFormat, VisualizeOptions};

use super::{
    builder::{QueryGraph, ACCESS_LABEL, ROOT_ID},
    error::VisualizeError,
    main::{build_query_graph, visualize_with},
    render::{to_dot_source, to_json, GraphvizRenderer, ImageFormat, JsonRenderer, DotSourceRenderer},
    styles::style_for,
    types::{ClauseKind, EdgeStyle, JoinDirection, NodeRole},
};

fn build(sql: &str) -> QueryGraph {
    build_query_graph(sql, &VisualizeOptions::default()).unwrap()
}

fn ids(nodes: Vec<&super::types::GraphNode>) -> Vec<String> {
    nodes.into_iter().map(|x| x.id.clone()).collect()
}

fn chain_kinds(graph: &QueryGraph) -> Vec<ClauseKind> {
    graph
        .chain()
        .into_iter()
        .filter_map(|x| x.clause_kind())
        .collect()
}

fn dashed(graph: &QueryGraph) -> Vec<(String, String)> {
    graph
        .edges()
        .into_iter()
        .filter(|(_, _, edge)| edge.style == EdgeStyle::Dashed)
        .map(|(from, to, _)| (from.id.clone(), to.id.clone()))
        .collect()
}

fn files_in(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|x| x.unwrap().file_name().to_string_lossy().to_string())
        .collect()
}

fn options_in(dir: &Path, format: OutputFormat) -> VisualizeOptions {
    VisualizeOptions {
        output_filename: dir.join("graph"),
        format,
        ..Default::default()
    }
}

#[test]
fn select_literal() {
    let graph = build("SELECT 1;");
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert!(graph.table_nodes().is_empty());
    assert_eq!(ids(graph.chain()), vec![ROOT_ID, "clause_select_0"]);
}

#[test]
fn single_table_select() {
    let graph = build("SELECT name, email FROM users;");

    assert_eq!(
        ids(graph.nodes()),
        vec!["tbl_users", ROOT_ID, "clause_select_0", "clause_from_4"]
    );
    assert_eq!(chain_kinds(&graph), vec![ClauseKind::Select, ClauseKind::From]);

    let edges = graph.edges();
    assert_eq!(edges.len(), 3);
    assert_eq!((edges[0].0.id.as_str(), edges[0].1.id.as_str()), (ROOT_ID, "clause_select_0"));
    assert_eq!(edges[1].2.style, EdgeStyle::Solid);
    assert_eq!(edges[2].2.style, EdgeStyle::Dashed);
    assert_eq!(edges[2].2.label.as_deref(), Some(ACCESS_LABEL));
    assert_eq!(dashed(&graph), vec![("clause_from_4".to_string(), "tbl_users".to_string())]);

    let select = graph.node("clause_select_0").unwrap();
    assert_eq!(select.label, "SELECT\n(name, email)");
    assert_eq!(graph.node("tbl_users").unwrap().label, "TABLE\nusers");
}

#[test]
fn join_with_aliases() {
    let graph = build(
        "SELECT * FROM orders o JOIN customers c ON o.cust_id = c.id WHERE o.total > 100;",
    );

    assert_eq!(ids(graph.table_nodes()), vec!["tbl_orders", "tbl_customers"]);
    assert_eq!(
        chain_kinds(&graph),
        vec![
            ClauseKind::Select,
            ClauseKind::From,
            ClauseKind::Join(JoinDirection::Plain),
            ClauseKind::Where,
        ]
    );

    let accesses = dashed(&graph);
    assert_eq!(accesses.len(), 2);
    assert!(accesses[0].0.starts_with("clause_from_"));
    assert_eq!(accesses[0].1, "tbl_orders");
    assert!(accesses[1].0.starts_with("clause_join_"));
    assert_eq!(accesses[1].1, "tbl_customers");
}

#[test]
fn one_table_node_per_distinct_name() {
    let graph = build(
        "select * from a join b on a.id = b.id left join a on a.x = b.y join C on c.z = a.z",
    );
    assert_eq!(ids(graph.table_nodes()), vec!["tbl_a", "tbl_b", "tbl_C"]);

    // every table node exists before the root and every clause
    let root = graph.root.index();
    for (idx, node) in graph.graph.node_indices().map(|x| (x.index(), &graph.graph[x])) {
        assert_eq!(node.is_table(), idx < root, "{}", node.id);
    }
    for (_, to, edge) in graph.edges() {
        if edge.style == EdgeStyle::Dashed {
            assert!(to.is_table());
        }
    }
}

#[test]
fn chain_is_linear_and_in_source_order() {
    let graph = build(
        "SELECT a, count(*) FROM t JOIN u ON t.id = u.id WHERE a > 1 GROUP BY a HAVING count(*) > 1 ORDER BY a LIMIT 3",
    );

    let chain = graph.chain();
    assert_eq!(chain.len(), 9);
    assert_eq!(chain.len() - 1, graph.nodes().iter().filter(|x| x.clause_kind().is_some()).count());

    let positions = chain
        .iter()
        .filter_map(|x| match &x.role {
            NodeRole::Clause(segment) => Some(segment.position),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert!(positions.windows(2).all(|x| x[0] < x[1]));

    for node in graph.nodes().into_iter().filter(|x| x.clause_kind().is_some()) {
        let solid_in = graph
            .edges()
            .into_iter()
            .filter(|(_, to, edge)| to.id == node.id && edge.style == EdgeStyle::Solid)
            .count();
        let solid_out = graph
            .edges()
            .into_iter()
            .filter(|(from, _, edge)| from.id == node.id && edge.style == EdgeStyle::Solid)
            .count();
        assert_eq!(solid_in, 1, "{}", node.id);
        assert!(solid_out <= 1, "{}", node.id);
    }
}

#[test]
fn order_by_is_one_node() {
    let graph = build("SELECT a FROM t ORDER BY a");
    let order_by = graph
        .nodes()
        .into_iter()
        .filter(|x| x.clause_kind() == Some(ClauseKind::OrderBy))
        .count();
    assert_eq!(order_by, 1);
    assert_eq!(graph.node_count(), 5);
}

#[test]
fn left_join_shares_join_style() {
    let graph = build("SELECT * FROM a LEFT JOIN b ON a.id = b.id JOIN c ON c.id = a.id");
    let joins = graph
        .nodes()
        .into_iter()
        .filter(|x| matches!(x.clause_kind(), Some(ClauseKind::Join(_))))
        .collect::<Vec<_>>();

    assert_eq!(joins.len(), 2);
    assert!(joins[0].label.starts_with("LEFT JOIN\n"));
    assert!(joins[1].label.starts_with("JOIN\n"));
    assert_eq!(joins[0].style, joins[1].style);
    assert_eq!(joins[1].style, style_for(ClauseKind::Join(JoinDirection::Plain)));
    assert_ne!(joins[0].id, joins[1].id);
}

#[test]
fn empty_detail_gives_bare_label() {
    let graph = build("SELECT * FROM t WHERE");
    let node = graph
        .nodes()
        .into_iter()
        .find(|x| x.clause_kind() == Some(ClauseKind::Where))
        .unwrap();
    assert_eq!(node.label, "WHERE");
}

#[test]
fn labels_respect_the_detail_budget() {
    let graph = build(
        "SELECT first_name, last_name, street, city, postcode, country, phone FROM people",
    );
    let select = graph.node("clause_select_0").unwrap();
    let detail = select.label.trim_start_matches("SELECT\n(").trim_end_matches(')');
    assert!(detail.chars().count() <= 50 + "...".len());
    assert!(detail.ends_with("..."));
}

#[test]
fn table_names_follow_discovery_order() {
    let graph = build("SELECT * FROM orders o JOIN public.customers c ON o.cid = c.id");
    assert_eq!(graph.table_names(), vec!["orders", "customers"]);
}

#[test]
fn column_named_like_a_table_is_linked() {
    // Tables are told apart from columns by position only: an identifier in
    // the JOIN detail that matches a known table gets an access edge.
    let graph = build("SELECT * FROM orders JOIN archive ON orders");
    assert_eq!(ids(graph.table_nodes()), vec!["tbl_orders", "tbl_archive"]);

    let from_join = dashed(&graph)
        .into_iter()
        .filter(|(from, _)| from.starts_with("clause_join_"))
        .map(|(_, to)| to)
        .collect::<Vec<_>>();
    assert_eq!(from_join, vec!["tbl_archive", "tbl_orders"]);
}

#[test]
fn unknown_names_in_join_detail_are_skipped() {
    let graph = build("SELECT * FROM orders JOIN customers ON active");
    assert_eq!(dashed(&graph).len(), 2);
}

#[test]
fn building_is_deterministic() {
    let sql = "SELECT o.id, c.name FROM orders o INNER JOIN customers c ON o.cid = c.id ORDER BY o.id";
    let first = build(sql);
    let second = build(sql);

    assert_eq!(to_json(&first), to_json(&second));
    assert_eq!(ids(first.nodes()), ids(second.nodes()));
}

#[test]
fn whitespace_only_input_is_rejected() {
    let dir = tempdir().unwrap();
    let options = options_in(dir.path(), OutputFormat::Json);

    let err = visualize_with("  \n\t ", &options, &JsonRenderer).unwrap_err();
    assert!(matches!(err, VisualizeError::InputEmpty));
    assert!(files_in(dir.path()).is_empty());
}

#[test]
fn unparseable_input_degrades_to_root_only() {
    let graph = build("SELECT 'never closed");
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.chain()[0].id, ROOT_ID);

    let dir = tempdir().unwrap();
    let options = options_in(dir.path(), OutputFormat::Json);
    let path = visualize_with(";;", &options, &JsonRenderer).unwrap();

    let payload: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(payload["nodes"].as_array().unwrap().len(), 1);
    assert_eq!(payload["edges"].as_array().unwrap().len(), 0);
}

#[test]
fn json_payload_shape() {
    let graph = build("SELECT name FROM users");
    let payload = to_json(&graph);

    assert_eq!(payload["global"]["direction"], "TB");
    assert_eq!(payload["global"]["title"], "SQL Query: SELECT name FROM users");
    assert_eq!(payload["nodes"][0]["id"], "tbl_users");
    assert_eq!(payload["nodes"][0]["shape"], "box3d");
    assert_eq!(payload["nodes"][1]["fill_color"], "gray80");
    assert_eq!(payload["edges"][0]["style"], "solid");
    assert!(payload["edges"][0].get("label").is_none());
    assert_eq!(payload["edges"][2]["style"], "dashed");
    assert_eq!(payload["edges"][2]["label"], ACCESS_LABEL);
}

#[test]
fn dot_source_carries_styles() {
    let source = to_dot_source(&build("SELECT name FROM users WHERE id = \"x\""));

    assert!(source.contains("digraph"));
    assert!(source.contains("\"tbl_users\""));
    assert!(source.contains("\"box3d\""));
    assert!(source.contains("\"dashed\""));
    assert!(source.contains("\"accesses\""));
    assert!(source.contains("\"parallelogram\""));
    assert!(source.contains("rankdir"));
    assert!(source.contains("\\\"x\\\""));
}

#[test]
fn dot_and_json_formats_write_files() {
    let dir = tempdir().unwrap();

    let dot = visualize_with(
        "SELECT 1",
        &options_in(dir.path(), OutputFormat::Dot),
        &DotSourceRenderer,
    )
    .unwrap();
    assert_eq!(dot, dir.path().join("graph.dot"));
    assert!(fs::read_to_string(&dot).unwrap().contains("clause_select_0"));

    let json = visualize_with(
        "SELECT 1",
        &options_in(dir.path(), OutputFormat::Json),
        &JsonRenderer,
    )
    .unwrap();
    assert_eq!(json, dir.path().join("graph.json"));

    let mut files = files_in(dir.path());
    files.sort();
    assert_eq!(files, vec!["graph.dot", "graph.json"]);
}

#[test]
fn output_is_overwritten() {
    let dir = tempdir().unwrap();
    let options = options_in(dir.path(), OutputFormat::Json);
    fs::write(dir.path().join("graph.json"), "stale").unwrap();

    let path = visualize_with("SELECT 1", &options, &JsonRenderer).unwrap();
    assert!(fs::read_to_string(path).unwrap().contains("clause_select_0"));
    assert_eq!(files_in(dir.path()).len(), 1);
}

#[test]
fn missing_engine_leaves_no_file() {
    let dir = tempdir().unwrap();
    let empty_path = tempdir().unwrap();
    let options = options_in(dir.path(), OutputFormat::Png);
    let renderer = GraphvizRenderer::new(ImageFormat::Png).with_search_path(empty_path.path());

    assert!(renderer.locate_engine().is_none());
    let err = visualize_with("SELECT name FROM users", &options, &renderer).unwrap_err();
    assert!(matches!(err, VisualizeError::RendererUnavailable { .. }));
    assert!(err.to_string().contains("https://graphviz.org/download/"));
    assert!(files_in(dir.path()).is_empty());
}

#[test]
fn renders_png_when_graphviz_is_installed() {
    let renderer = GraphvizRenderer::new(ImageFormat::Png);
    if renderer.locate_engine().is_none() {
        return;
    }

    let dir = tempdir().unwrap();
    let options = options_in(dir.path(), OutputFormat::Png);
    let path = visualize_with("SELECT name FROM users", &options, &renderer).unwrap();

    assert_eq!(path, dir.path().join("graph.png"));
    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..4], b"\x89PNG");
    assert_eq!(files_in(dir.path()), vec!["graph.png"]);
}
