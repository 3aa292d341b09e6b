use tracing::debug;

use super::types::{Token, TokenKind};

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|x| x == name) {
        names.push(name.to_string());
    }
}

/// Returns the distinct real names of the identifiers in `tokens`, in the
/// order they first appear. Aliases are ignored and tokens that are not
/// identifiers or identifier lists are skipped.
pub fn extract_table_names(tokens: &[Token]) -> Vec<String> {
    let mut names = Vec::new();

    for token in tokens {
        match token.kind {
            TokenKind::Identifier => {
                if let Some(name) = &token.real_name {
                    push_unique(&mut names, name);
                }
            }
            TokenKind::IdentifierList => {
                token
                    .children
                    .iter()
                    .filter(|x| x.kind == TokenKind::Identifier)
                    .filter_map(|x| x.real_name.as_deref())
                    .for_each(|name| push_unique(&mut names, name));
            }
            _ => {}
        }
    }

    names
}

fn opens_table_reference(token: &Token) -> bool {
    token.kind == TokenKind::Keyword && {
        let word = token.normalized();
        word == "FROM" || word.contains("JOIN")
    }
}

/// Collects the identifiers that follow a FROM/JOIN keyword at `start`, up
/// to the next keyword other than AS or punctuation other than a comma.
fn table_reference_tokens(tokens: &[Token], start: usize) -> Vec<Token> {
    let mut references = Vec::new();

    for token in tokens.iter().skip(start + 1) {
        match token.kind {
            TokenKind::Identifier | TokenKind::IdentifierList => references.push(token.clone()),
            TokenKind::Keyword if !token.is_keyword("AS") => break,
            TokenKind::Punctuation if !token.is_punctuation(",") => break,
            _ => {}
        }
    }

    references
}

/// Scans a whole statement for every table named after FROM or JOIN.
/// Names come back once each, in first-seen order.
pub fn discover_tables(tokens: &[Token]) -> Vec<String> {
    let mut tables = Vec::new();

    for (idx, token) in tokens.iter().enumerate() {
        if !opens_table_reference(token) {
            continue;
        }

        let references = table_reference_tokens(tokens, idx);
        for name in extract_table_names(&references) {
            if !tables.contains(&name) {
                debug!(table = %name, keyword = %token.text, "discovered table");
                tables.push(name);
            }
        }
    }

    tables
}
