use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::VisualizeOptions;

use super::{
    builder::{title_for, GraphBuilder, QueryGraph},
    debug,
    error::VisualizeError,
    parsing::tokenize,
    render::{renderer_for, Renderer},
};

pub fn build_query_graph(
    query: &str,
    options: &VisualizeOptions,
) -> Result<QueryGraph, VisualizeError> {
    if query.trim().is_empty() {
        return Err(VisualizeError::InputEmpty);
    }

    let tokens = tokenize(query).unwrap_or_else(|x| {
        warn!(error = %x, "falling back to the root-only graph");
        Vec::new()
    });

    let graph = GraphBuilder::new(options.detail_width)
        .build(&tokens, title_for(query, options.title_width));
    debug::trace_graph(&graph);

    Ok(graph)
}

pub fn visualize(query: &str, options: &VisualizeOptions) -> Result<PathBuf, VisualizeError> {
    visualize_with(query, options, renderer_for(options.format).as_ref())
}

pub fn visualize_with(
    query: &str,
    options: &VisualizeOptions,
    renderer: &dyn Renderer,
) -> Result<PathBuf, VisualizeError> {
    let graph = build_query_graph(query, options)?;
    let target = options.target_path();

    renderer.render(&graph, &target)?;
    info!(
        path = %target.display(),
        clauses = graph.chain().len() - 1,
        tables = ?graph.table_names(),
        "query visualization saved"
    );

    Ok(target)
}
