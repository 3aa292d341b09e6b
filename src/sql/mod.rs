mod main;
mod builder;
mod clauses;
mod debug;
mod error;
mod graph;
mod parsing;
mod render;
mod sqlparser_helper;
mod styles;
mod types;

#[cfg(test)]
mod tests;

pub use clauses::DETAIL_BUDGET;
pub use main::visualize;

pub const TITLE_WIDTH: usize = 30;
