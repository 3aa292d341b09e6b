use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    DML,
    Keyword,
    Identifier,
    IdentifierList,
    Punctuation,
    Whitespace,
    Other,
}

/// A lexical token of one statement. Composite tokens (identifiers with
/// qualifiers or aliases, identifier lists, parentheses, comparisons) own
/// their parts in `children`; `text` is always the full source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub children: Vec<Token>,
    pub real_name: Option<String>,
}

impl Token {
    pub fn leaf(kind: TokenKind, text: impl Into<String>) -> Token {
        Token {
            kind,
            text: text.into(),
            children: Vec::new(),
            real_name: None,
        }
    }

    pub fn identifier(text: impl Into<String>, real_name: Option<String>) -> Token {
        Token {
            kind: TokenKind::Identifier,
            text: text.into(),
            children: Vec::new(),
            real_name,
        }
    }

    pub fn group(kind: TokenKind, children: Vec<Token>, real_name: Option<String>) -> Token {
        let text = children.iter().map(|x| x.text.as_str()).collect::<String>();
        Token {
            kind,
            text,
            children,
            real_name,
        }
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text.eq_ignore_ascii_case(word)
    }

    pub fn is_punctuation(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == punct
    }

    /// Upper-cased text, used for every keyword comparison.
    pub fn normalized(&self) -> String {
        self.text.to_uppercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinDirection {
    Plain,
    Left,
    Right,
    Inner,
    FullOuter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    Select,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    Join(JoinDirection),
}

impl ClauseKind {
    pub fn name(&self) -> &'static str {
        match self {
            ClauseKind::Select => "SELECT",
            ClauseKind::From => "FROM",
            ClauseKind::Where => "WHERE",
            ClauseKind::GroupBy => "GROUP BY",
            ClauseKind::Having => "HAVING",
            ClauseKind::OrderBy => "ORDER BY",
            ClauseKind::Limit => "LIMIT",
            ClauseKind::Join(JoinDirection::Plain) => "JOIN",
            ClauseKind::Join(JoinDirection::Left) => "LEFT JOIN",
            ClauseKind::Join(JoinDirection::Right) => "RIGHT JOIN",
            ClauseKind::Join(JoinDirection::Inner) => "INNER JOIN",
            ClauseKind::Join(JoinDirection::FullOuter) => "FULL OUTER JOIN",
        }
    }

    /// The same clause with any join direction removed.
    pub fn base(&self) -> ClauseKind {
        match self {
            ClauseKind::Join(_) => ClauseKind::Join(JoinDirection::Plain),
            other => *other,
        }
    }

    /// Clauses whose detail names the tables being read.
    pub fn accesses_tables(&self) -> bool {
        matches!(self, ClauseKind::From | ClauseKind::Join(_))
    }

    pub fn slug(&self) -> String {
        self.name().replace(' ', "_").to_lowercase()
    }
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClauseSegment {
    pub kind: ClauseKind,
    pub detail_tokens: Vec<Token>,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleAttrs {
    pub shape: &'static str,
    pub fill_color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeRole {
    Root,
    Clause(ClauseSegment),
    Table(TableRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub style: StyleAttrs,
    pub role: NodeRole,
}

impl GraphNode {
    pub fn is_table(&self) -> bool {
        matches!(self.role, NodeRole::Table(_))
    }

    #[cfg(test)]
    pub fn clause_kind(&self) -> Option<ClauseKind> {
        match &self.role {
            NodeRole::Clause(segment) => Some(segment.kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStyle {
    Solid,
    Dashed,
}

impl EdgeStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeStyle::Solid => "solid",
            EdgeStyle::Dashed => "dashed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub style: EdgeStyle,
    pub label: Option<String>,
}
