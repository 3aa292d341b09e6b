use std::{
    env,
    ffi::OsString,
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use graphviz_rust::{
    cmd::{CommandArg, Format},
    dot_structures::{
        Attribute, Edge, EdgeTy, Graph, GraphAttributes, Id, Node, NodeId, Stmt, Vertex,
    },
    exec, print,
    printer::PrinterContext,
};
use serde_json::json;
use tracing::debug;

use crate::config::OutputFormat;

use super::{
    builder::QueryGraph,
    error::VisualizeError,
    types::{EdgeStyle, GraphNode, NodeRole},
};

pub const ENGINE: &str = "dot";

fn quoted(text: &str) -> Id {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    Id::Escaped(format!("\"{}\"", escaped))
}

fn attr(key: &str, value: &str) -> Attribute {
    Attribute(Id::Plain(key.to_string()), quoted(value))
}

fn node_id(id: &str) -> NodeId {
    NodeId(quoted(id), None)
}

fn node_stmt(node: &GraphNode) -> Stmt {
    let mut attributes = vec![
        attr("label", &node.label),
        attr("shape", node.style.shape),
        attr("style", "filled"),
        attr("fillcolor", node.style.fill_color),
    ];
    match node.role {
        NodeRole::Root => attributes.push(attr("fontname", "Arial Black")),
        NodeRole::Table(_) => attributes.push(attr("fontname", "Arial")),
        NodeRole::Clause(_) => {}
    }

    Stmt::Node(Node {
        id: node_id(&node.id),
        attributes,
    })
}

/// Lays the query graph out as a graphviz digraph, top to bottom, titled
/// with the statement.
pub fn to_dot(graph: &QueryGraph) -> Graph {
    let mut stmts = vec![
        Stmt::Attribute(attr("rankdir", "TB")),
        Stmt::Attribute(attr("label", &graph.title)),
        Stmt::Attribute(attr("labelloc", "t")),
        Stmt::Attribute(attr("fontsize", "20")),
        Stmt::Attribute(attr("charset", "utf-8")),
        Stmt::GAttribute(GraphAttributes::Node(vec![attr("fontname", "Arial")])),
        Stmt::GAttribute(GraphAttributes::Edge(vec![attr("fontname", "Arial")])),
    ];

    stmts.extend(graph.nodes().into_iter().map(node_stmt));

    for (from, to, edge) in graph.edges() {
        let mut attributes = Vec::new();
        if edge.style == EdgeStyle::Dashed {
            attributes.push(attr("style", "dashed"));
            attributes.push(attr("color", "gray50"));
            attributes.push(attr("arrowhead", "odot"));
        }
        if let Some(label) = &edge.label {
            attributes.push(attr("label", label));
        }

        stmts.push(Stmt::Edge(Edge {
            ty: EdgeTy::Pair(Vertex::N(node_id(&from.id)), Vertex::N(node_id(&to.id))),
            attributes,
        }));
    }

    Graph::DiGraph {
        id: Id::Plain("sql_query".to_string()),
        strict: false,
        stmts,
    }
}

pub fn to_dot_source(graph: &QueryGraph) -> String {
    print(to_dot(graph), &mut PrinterContext::default())
}

/// The renderer-neutral description of the graph: nodes with their style,
/// edges with their style, and the global layout settings.
pub fn to_json(graph: &QueryGraph) -> serde_json::Value {
    let nodes = graph
        .nodes()
        .into_iter()
        .map(|node| {
            json!({
                "id": node.id,
                "label": node.label,
                "shape": node.style.shape,
                "fill_color": node.style.fill_color,
            })
        })
        .collect::<Vec<_>>();

    let edges = graph
        .edges()
        .into_iter()
        .map(|(from, to, edge)| {
            let mut value = json!({
                "from": from.id,
                "to": to.id,
                "style": edge.style.as_str(),
            });
            if let Some(label) = &edge.label {
                value["label"] = json!(label);
            }
            value
        })
        .collect::<Vec<_>>();

    json!({
        "nodes": nodes,
        "edges": edges,
        "global": {
            "direction": "TB",
            "title": graph.title,
        },
    })
}

pub trait Renderer {
    fn render(&self, graph: &QueryGraph, target: &Path) -> Result<(), VisualizeError>;
}

/// Writes into a temporary file beside `target` and moves it over `target`
/// only when `write` succeeds. The temporary file is removed otherwise.
fn write_staged<F>(target: &Path, write: F) -> Result<(), VisualizeError>
where
    F: FnOnce(&Path) -> Result<(), VisualizeError>,
{
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let staged = tempfile::Builder::new()
        .prefix(".sqlviz-")
        .tempfile_in(dir)?;
    write(staged.path())?;
    staged.persist(target).map_err(|x| VisualizeError::Io(x.error))?;

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

/// Runs the graphviz `dot` engine.
pub struct GraphvizRenderer {
    format: ImageFormat,
    search_path: Option<OsString>,
}

impl GraphvizRenderer {
    pub fn new(format: ImageFormat) -> Self {
        GraphvizRenderer {
            format,
            search_path: None,
        }
    }

    /// Looks for the engine in `search_path` instead of `PATH`. Only the
    /// lookup is redirected: `exec` still starts `dot` from the process
    /// `PATH`, so this can make the engine unavailable but never swaps it.
    #[cfg(test)]
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn locate_engine(&self) -> Option<PathBuf> {
        let search_path = self.search_path.clone().or_else(|| env::var_os("PATH"))?;
        let executable = format!("{}{}", ENGINE, env::consts::EXE_SUFFIX);

        env::split_paths(&search_path)
            .map(|dir| dir.join(&executable))
            .find(|candidate| candidate.is_file())
    }
}

/// Maps an `exec` failure. `NotFound` means the `dot` binary is missing.
fn engine_error(error: io::Error) -> VisualizeError {
    match error.kind() {
        ErrorKind::NotFound => VisualizeError::RendererUnavailable {
            engine: ENGINE.to_string(),
        },
        _ => VisualizeError::RenderFailure(error.to_string()),
    }
}

impl Renderer for GraphvizRenderer {
    fn render(&self, graph: &QueryGraph, target: &Path) -> Result<(), VisualizeError> {
        let engine = self
            .locate_engine()
            .ok_or_else(|| VisualizeError::RendererUnavailable {
                engine: ENGINE.to_string(),
            })?;
        debug!(engine = %engine.display(), "found graphviz engine");

        let format = match self.format {
            ImageFormat::Png => Format::Png,
            ImageFormat::Svg => Format::Svg,
        };

        write_staged(target, |staged| {
            exec(
                to_dot(graph),
                &mut PrinterContext::default(),
                vec![
                    CommandArg::Format(format),
                    CommandArg::Output(staged.to_string_lossy().to_string()),
                ],
            )
            .map(|_| ())
            .map_err(engine_error)
        })
    }
}

/// Writes the DOT source without running any engine.
pub struct DotSourceRenderer;

impl Renderer for DotSourceRenderer {
    fn render(&self, graph: &QueryGraph, target: &Path) -> Result<(), VisualizeError> {
        let source = to_dot_source(graph);
        write_staged(target, |staged| Ok(fs::write(staged, source)?))
    }
}

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, graph: &QueryGraph, target: &Path) -> Result<(), VisualizeError> {
        let payload = serde_json::to_string_pretty(&to_json(graph))
            .map_err(|x| VisualizeError::RenderFailure(x.to_string()))?;
        write_staged(target, |staged| Ok(fs::write(staged, payload)?))
    }
}

pub fn renderer_for(format: OutputFormat) -> Box<dyn Renderer> {
    match format {
        OutputFormat::Png => Box::new(GraphvizRenderer::new(ImageFormat::Png)),
        OutputFormat::Svg => Box::new(GraphvizRenderer::new(ImageFormat::Svg)),
        OutputFormat::Dot => Box::new(DotSourceRenderer),
        OutputFormat::Json => Box::new(JsonRenderer),
    }
}
