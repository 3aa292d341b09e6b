use std::collections::VecDeque;

use sqlparser::{
    dialect::GenericDialect,
    tokenizer::{Token as RawToken, Tokenizer},
};
use tracing::debug;

use super::{
    error::Unparseable,
    sqlparser_helper::{classify, is_comparison_operator},
    types::{Token, TokenKind},
};

// Tokenizes with the generic dialect and returns the grouped tokens of the
// first statement in the input.
pub fn tokenize(sql: &str) -> Result<Vec<Token>, Unparseable> {
    let dialect = GenericDialect {};

    let raw = Tokenizer::new(&dialect, sql)
        .tokenize()
        .map_err(|x| Unparseable(x.to_string()))?;

    let leaves = raw
        .iter()
        .filter(|x| !matches!(x, RawToken::EOF))
        .map(classify)
        .collect::<Vec<Token>>();

    let statement = first_statement(leaves)
        .ok_or_else(|| Unparseable("no statement found".to_string()))?;

    Ok(group(statement))
}

fn is_meaningful(statement: &[Token]) -> bool {
    statement
        .iter()
        .any(|x| !x.is_whitespace() && !x.is_punctuation(";"))
}

fn first_statement(leaves: Vec<Token>) -> Option<Vec<Token>> {
    let mut statement = Vec::new();
    let mut tokens = leaves.into_iter();

    while let Some(token) = tokens.next() {
        let terminator = token.is_punctuation(";");
        statement.push(token);

        if !terminator {
            continue;
        }
        if is_meaningful(&statement) {
            let ignored = tokens
                .filter(|x| !x.is_whitespace() && !x.is_punctuation(";"))
                .count();
            if ignored > 0 {
                debug!(ignored, "only the first statement is visualized");
            }
            return Some(statement);
        }
        statement.clear();
    }

    if is_meaningful(&statement) {
        Some(statement)
    } else {
        None
    }
}

/// Groups one nesting level of leaf tokens into composites, the way a
/// non-validating SQL lexer does: parentheses, qualified names, function
/// calls, aliases, comparisons and comma separated lists.
pub fn group(tokens: Vec<Token>) -> Vec<Token> {
    let tokens = group_parentheses(tokens);
    let tokens = group_qualified_names(tokens);
    let tokens = group_functions(tokens);
    let tokens = group_aliases(tokens);
    let tokens = group_comparisons(tokens);
    group_identifier_lists(tokens)
}

pub fn is_parenthesis(token: &Token) -> bool {
    token.kind == TokenKind::Other
        && token
            .children
            .first()
            .is_some_and(|x| x.is_punctuation("("))
}

pub fn is_function(token: &Token) -> bool {
    token.kind == TokenKind::Other
        && token.children.len() == 2
        && token.children[0].kind == TokenKind::Identifier
        && is_parenthesis(&token.children[1])
}

fn is_bare_name(token: &Token) -> bool {
    token.kind == TokenKind::Identifier && token.children.is_empty()
}

fn next_non_whitespace(queue: &VecDeque<Token>) -> Option<usize> {
    queue.iter().position(|x| !x.is_whitespace())
}

fn last_non_whitespace(out: &[Token]) -> Option<usize> {
    out.iter().rposition(|x| !x.is_whitespace())
}

fn group_parentheses(tokens: Vec<Token>) -> Vec<Token> {
    let mut levels: Vec<Vec<Token>> = vec![Vec::new()];

    for token in tokens {
        if token.is_punctuation(")") && levels.len() > 1 {
            if let Some(mut open) = levels.pop() {
                let inner = open.split_off(1);
                open.extend(group(inner));
                open.push(token);
                if let Some(level) = levels.last_mut() {
                    level.push(Token::group(TokenKind::Other, open, None));
                }
            }
            continue;
        }

        if token.is_punctuation("(") {
            levels.push(vec![token]);
        } else if let Some(level) = levels.last_mut() {
            level.push(token);
        }
    }

    // Unbalanced input: fold any open level back into its parent as-is.
    while levels.len() > 1 {
        if let Some(open) = levels.pop() {
            if let Some(level) = levels.last_mut() {
                level.extend(open);
            }
        }
    }

    levels.pop().unwrap_or_default()
}

fn group_qualified_names(tokens: Vec<Token>) -> Vec<Token> {
    let mut queue: VecDeque<Token> = tokens.into();
    let mut out = Vec::with_capacity(queue.len());

    let is_name_part = |x: &Token| is_bare_name(x) || (x.kind == TokenKind::Other && x.text == "*");

    while let Some(token) = queue.pop_front() {
        if !is_bare_name(&token) {
            out.push(token);
            continue;
        }

        let mut parts = vec![token];
        while queue.front().is_some_and(|x| x.is_punctuation("."))
            && queue.get(1).is_some_and(is_name_part)
        {
            parts.extend(queue.drain(..2));
        }

        if parts.len() == 1 {
            out.extend(parts);
        } else {
            let real_name = parts.last().and_then(|x| x.real_name.clone());
            out.push(Token::group(TokenKind::Identifier, parts, real_name));
        }
    }

    out
}

fn group_functions(tokens: Vec<Token>) -> Vec<Token> {
    let mut queue: VecDeque<Token> = tokens.into();
    let mut out = Vec::with_capacity(queue.len());

    while let Some(token) = queue.pop_front() {
        if token.kind == TokenKind::Identifier && queue.front().is_some_and(is_parenthesis) {
            if let Some(arguments) = queue.pop_front() {
                out.push(Token::group(TokenKind::Other, vec![token, arguments], None));
                continue;
            }
        }
        out.push(token);
    }

    out
}

fn group_aliases(tokens: Vec<Token>) -> Vec<Token> {
    let mut queue: VecDeque<Token> = tokens.into();
    let mut out = Vec::with_capacity(queue.len());

    while let Some(token) = queue.pop_front() {
        let aliasable =
            token.kind == TokenKind::Identifier || is_function(&token) || is_parenthesis(&token);
        if !aliasable {
            out.push(token);
            continue;
        }

        let Some(next) = next_non_whitespace(&queue) else {
            out.push(token);
            continue;
        };

        let alias_end = if queue[next].is_keyword("AS") {
            queue
                .iter()
                .skip(next + 1)
                .position(|x| !x.is_whitespace())
                .map(|x| x + next + 1)
                .filter(|x| is_bare_name(&queue[*x]))
        } else if next > 0 && is_bare_name(&queue[next]) {
            Some(next)
        } else {
            None
        };

        match alias_end {
            Some(end) => {
                let real_name = if token.kind == TokenKind::Identifier {
                    token.real_name.clone()
                } else {
                    None
                };
                let mut children = vec![token];
                children.extend(queue.drain(..=end));
                out.push(Token::group(TokenKind::Identifier, children, real_name));
            }
            None => out.push(token),
        }
    }

    out
}

fn is_operand(token: &Token) -> bool {
    match token.kind {
        TokenKind::Identifier => true,
        TokenKind::Other => !is_comparison_operator(token),
        _ => false,
    }
}

fn group_comparisons(tokens: Vec<Token>) -> Vec<Token> {
    let mut queue: VecDeque<Token> = tokens.into();
    let mut out: Vec<Token> = Vec::with_capacity(queue.len());

    while let Some(token) = queue.pop_front() {
        if is_comparison_operator(&token) {
            let left = last_non_whitespace(&out).filter(|x| is_operand(&out[*x]));
            let right = next_non_whitespace(&queue).filter(|x| is_operand(&queue[*x]));

            if let (Some(left), Some(right)) = (left, right) {
                let mut children = out.split_off(left);
                children.push(token);
                children.extend(queue.drain(..=right));
                out.push(Token::group(TokenKind::Other, children, None));
                continue;
            }
        }
        out.push(token);
    }

    out
}

fn is_list_item(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Identifier | TokenKind::Other)
        && !is_comparison_operator(token)
}

fn group_identifier_lists(tokens: Vec<Token>) -> Vec<Token> {
    let mut queue: VecDeque<Token> = tokens.into();
    let mut out: Vec<Token> = Vec::with_capacity(queue.len());

    while let Some(token) = queue.pop_front() {
        if token.is_punctuation(",") {
            let left = last_non_whitespace(&out).filter(|x| {
                is_list_item(&out[*x]) || out[*x].kind == TokenKind::IdentifierList
            });
            let right = next_non_whitespace(&queue).filter(|x| is_list_item(&queue[*x]));

            if let (Some(left), Some(right)) = (left, right) {
                let mut tail = out.split_off(left);
                let mut children = if tail[0].kind == TokenKind::IdentifierList {
                    let list = tail.remove(0);
                    let mut members = list.children;
                    members.extend(tail);
                    members
                } else {
                    tail
                };
                children.push(token);
                children.extend(queue.drain(..=right));
                out.push(Token::group(TokenKind::IdentifierList, children, None));
                continue;
            }
        }
        out.push(token);
    }

    out
}
