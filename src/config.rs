use std::{ffi::OsString, path::PathBuf};

use clap::{ArgAction, Args, Parser, ValueEnum};
use derivative::Derivative;

use crate::sql::{DETAIL_BUDGET, TITLE_WIDTH};

pub const DEFAULT_OUTPUT: &str = "query_visualization";

/// Render the clause structure of a SQL query as a graph
#[derive(Parser, Debug)]
#[command(name = "sqlviz", version, long_about = None)]
pub struct Cli {
    /// SQL statement to visualize (reads --file or stdin when omitted)
    pub query: Option<String>,

    /// Read the statement from a file
    #[arg(short, long, conflicts_with = "query")]
    pub file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(flatten)]
    pub options: VisualizeOptions,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
    Dot,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
            OutputFormat::Dot => "dot",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Args, Derivative, Debug, Clone)]
#[derivative(Default)]
pub struct VisualizeOptions {
    /// Output file name, without extension
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    #[derivative(Default(value = "PathBuf::from(DEFAULT_OUTPUT)"))]
    pub output_filename: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Png)]
    pub format: OutputFormat,

    /// Maximum characters of clause detail shown in a node label
    #[arg(long, default_value_t = DETAIL_BUDGET)]
    #[derivative(Default(value = "DETAIL_BUDGET"))]
    pub detail_width: usize,

    /// Maximum characters of the statement echoed in the graph title
    #[arg(long, default_value_t = TITLE_WIDTH)]
    #[derivative(Default(value = "TITLE_WIDTH"))]
    pub title_width: usize,
}

impl VisualizeOptions {
    /// `<output_filename>.<ext>`; the extension is appended, never substituted.
    pub fn target_path(&self) -> PathBuf {
        let mut name = OsString::from(self.output_filename.as_os_str());
        name.push(".");
        name.push(self.format.extension());
        PathBuf::from(name)
    }
}
