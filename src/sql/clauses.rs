use tracing::debug;

use super::types::{ClauseKind, ClauseSegment, JoinDirection, Token, TokenKind};

pub const DETAIL_BUDGET: usize = 50;
pub const ELLIPSIS: &str = "...";

fn next_significant(tokens: &[Token], from: usize) -> Option<usize> {
    tokens
        .iter()
        .skip(from)
        .position(|x| !x.is_whitespace())
        .map(|x| x + from)
}

fn join_direction(word: &str) -> Option<JoinDirection> {
    match word {
        "LEFT" => Some(JoinDirection::Left),
        "RIGHT" => Some(JoinDirection::Right),
        "INNER" => Some(JoinDirection::Inner),
        "FULL" => Some(JoinDirection::FullOuter),
        _ => None,
    }
}

// A direction word only opens a clause when JOIN follows it, optionally
// through OUTER (LEFT OUTER JOIN, FULL OUTER JOIN).
fn match_directed_join(
    tokens: &[Token],
    idx: usize,
    direction: JoinDirection,
) -> Option<(ClauseKind, usize)> {
    let mut at = next_significant(tokens, idx + 1)?;
    if direction != JoinDirection::Inner && tokens[at].normalized() == "OUTER" {
        at = next_significant(tokens, at + 1)?;
    }

    if tokens[at].normalized().contains("JOIN") {
        Some((ClauseKind::Join(direction), at))
    } else {
        None
    }
}

fn match_keyword(tokens: &[Token], idx: usize) -> Option<(ClauseKind, usize)> {
    let word = tokens[idx].normalized();

    match word.as_str() {
        "FROM" => Some((ClauseKind::From, idx)),
        "WHERE" => Some((ClauseKind::Where, idx)),
        "HAVING" => Some((ClauseKind::Having, idx)),
        "LIMIT" => Some((ClauseKind::Limit, idx)),
        "GROUP" | "ORDER" => {
            let by = next_significant(tokens, idx + 1).filter(|x| tokens[*x].normalized() == "BY")?;
            let kind = if word == "GROUP" {
                ClauseKind::GroupBy
            } else {
                ClauseKind::OrderBy
            };
            Some((kind, by))
        }
        w if w.contains("JOIN") => Some((ClauseKind::Join(JoinDirection::Plain), idx)),
        w => match_directed_join(tokens, idx, join_direction(w)?),
    }
}

/// Recognizes a clause keyword starting at `idx`. Returns the clause kind and
/// the index of the last token the (possibly compound) keyword consumed.
pub fn match_clause(tokens: &[Token], idx: usize) -> Option<(ClauseKind, usize)> {
    let token = &tokens[idx];
    match token.kind {
        TokenKind::DML if token.normalized() == "SELECT" => Some((ClauseKind::Select, idx)),
        TokenKind::Keyword => match_keyword(tokens, idx),
        _ => None,
    }
}

/// Splits a statement into its clause occurrences in source order. Tokens
/// up to the next clause keyword are the clause's detail; tokens before the
/// first clause belong to none.
pub fn segment_clauses(tokens: &[Token]) -> Vec<ClauseSegment> {
    let mut segments: Vec<ClauseSegment> = Vec::new();
    let mut idx = 0;

    while idx < tokens.len() {
        let token = &tokens[idx];
        if token.is_whitespace() {
            idx += 1;
            continue;
        }

        if let Some((kind, last)) = match_clause(tokens, idx) {
            debug!(clause = %kind, position = idx, "clause boundary");
            segments.push(ClauseSegment {
                kind,
                detail_tokens: Vec::new(),
                position: idx,
            });
            idx = last + 1;
            continue;
        }

        if let Some(segment) = segments.last_mut() {
            segment.detail_tokens.push(token.clone());
        }
        idx += 1;
    }

    segments
}

/// One-line summary of a clause's detail, at most `budget` characters
/// before the ellipsis.
pub fn summarize(tokens: &[Token], budget: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut length = 0;

    for token in tokens.iter().filter(|x| !x.is_whitespace()) {
        let text = token.text.split_whitespace().collect::<Vec<_>>().join(" ");
        let width = text.chars().count();

        if length + width > budget {
            // the separator before the marker is charged too
            if length > budget {
                parts.pop();
            }
            parts.push(ELLIPSIS.to_string());
            break;
        }
        length += width + 1;
        parts.push(text);
    }

    parts.join(" ")
}
