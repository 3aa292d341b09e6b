use thiserror::Error;

/// Conditions reported back to the caller of [`super::visualize`].
///
/// Analysis problems never show up here: a statement the tokenizer cannot
/// make sense of still produces the root-only graph.
#[derive(Debug, Error)]
pub enum VisualizeError {
    #[error("input statement is empty")]
    InputEmpty,

    #[error(
        "graphviz '{engine}' executable not found\n\
         1. Download and install Graphviz: https://graphviz.org/download/\n\
         2. Add the Graphviz bin directory to PATH\n\
         3. Run the command again"
    )]
    RendererUnavailable { engine: String },

    #[error("rendering failed: {0}")]
    RenderFailure(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The token source could not produce a single meaningful token.
#[derive(Debug, Error, PartialEq)]
#[error("unparseable statement: {0}")]
pub struct Unparseable(pub String);
