use phf::phf_set;
use sqlparser::tokenizer::{Token as RawToken, Word};

use super::types::{Token, TokenKind};

/// Statement verbs. Only SELECT opens a clause; the others are carried as
/// tokens so a `DELETE FROM t` still shows its FROM clause.
static DML_VERBS: phf::Set<&'static str> = phf_set! {
    "SELECT", "INSERT", "UPDATE", "DELETE", "MERGE", "REPLACE", "UPSERT",
};

// Words that shape a statement. Anything not listed here is treated as a
// name even when sqlparser knows it as a keyword (NAME, USER, DATE, ...).
static RESERVED_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "FROM", "WHERE", "GROUP", "BY", "HAVING", "ORDER", "LIMIT", "OFFSET",
    "JOIN", "LEFT", "RIGHT", "INNER", "OUTER", "FULL", "CROSS", "NATURAL",
    "ON", "USING", "AS", "AND", "OR", "NOT", "IN", "IS", "NULL", "LIKE",
    "ILIKE", "BETWEEN", "EXISTS", "DISTINCT", "ALL", "ANY", "SOME", "UNION",
    "INTERSECT", "EXCEPT", "CASE", "WHEN", "THEN", "ELSE", "END", "ASC",
    "DESC", "NULLS", "INTO", "VALUES", "SET", "WITH", "RECURSIVE", "TRUE",
    "FALSE", "FETCH", "ROWS", "ONLY", "TOP", "WINDOW", "OVER", "PARTITION",
    "RETURNING", "QUALIFY", "LATERAL",
};

static COMPARISON_OPERATORS: phf::Set<&'static str> = phf_set! {
    "=", "==", "<>", "!=", "<", ">", "<=", ">=", "<=>",
};

pub fn classify(raw: &RawToken) -> Token {
    match raw {
        RawToken::Whitespace(ws) => Token::leaf(TokenKind::Whitespace, ws.to_string()),
        RawToken::Word(word) => classify_word(word),
        RawToken::Comma
        | RawToken::SemiColon
        | RawToken::LParen
        | RawToken::RParen
        | RawToken::Period => Token::leaf(TokenKind::Punctuation, raw.to_string()),
        other => Token::leaf(TokenKind::Other, other.to_string()),
    }
}

fn classify_word(word: &Word) -> Token {
    if word.quote_style.is_none() {
        let upper = word.value.to_uppercase();
        if DML_VERBS.contains(upper.as_str()) {
            return Token::leaf(TokenKind::DML, word.value.clone());
        }
        if RESERVED_KEYWORDS.contains(upper.as_str()) {
            return Token::leaf(TokenKind::Keyword, word.value.clone());
        }
    }

    Token::identifier(word.to_string(), Some(word.value.clone()))
}

pub fn is_comparison_operator(token: &Token) -> bool {
    token.kind == TokenKind::Other
        && token.children.is_empty()
        && COMPARISON_OPERATORS.contains(token.text.as_str())
}
