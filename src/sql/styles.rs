use phf::phf_map;

use super::types::{ClauseKind, StyleAttrs};

pub const DEFAULT_STYLE_KEY: &str = "DEFAULT";

static CLAUSE_STYLES: phf::Map<&'static str, StyleAttrs> = phf_map! {
    "SELECT" => StyleAttrs { shape: "ellipse", fill_color: "lightgreen" },
    "FROM" => StyleAttrs { shape: "ellipse", fill_color: "skyblue" },
    "WHERE" => StyleAttrs { shape: "parallelogram", fill_color: "lightcoral" },
    "JOIN" => StyleAttrs { shape: "cds", fill_color: "lightyellow" },
    "LEFT JOIN" => StyleAttrs { shape: "cds", fill_color: "lightyellow" },
    "RIGHT JOIN" => StyleAttrs { shape: "cds", fill_color: "lightyellow" },
    "INNER JOIN" => StyleAttrs { shape: "cds", fill_color: "lightyellow" },
    "FULL OUTER JOIN" => StyleAttrs { shape: "cds", fill_color: "moccasin" },
    "GROUP BY" => StyleAttrs { shape: "octagon", fill_color: "lightpink" },
    "HAVING" => StyleAttrs { shape: "octagon", fill_color: "lightsalmon" },
    "ORDER BY" => StyleAttrs { shape: "septagon", fill_color: "lightgoldenrodyellow" },
    "LIMIT" => StyleAttrs { shape: "trapezium", fill_color: "lightcyan" },
    "DEFAULT" => StyleAttrs { shape: "ellipse", fill_color: "lightgrey" },
};

pub const ROOT_STYLE: StyleAttrs = StyleAttrs {
    shape: "doubleoctagon",
    fill_color: "gray80",
};

pub const TABLE_STYLE: StyleAttrs = StyleAttrs {
    shape: "box3d",
    fill_color: "lightblue",
};

pub const DEFAULT_STYLE: StyleAttrs = StyleAttrs {
    shape: "ellipse",
    fill_color: "lightgrey",
};

/// Looks a style up by name in the clause table.
pub fn style_for_name(name: &str) -> Option<StyleAttrs> {
    CLAUSE_STYLES.get(name).copied()
}

/// Exact kind first, then the kind without its join direction, then DEFAULT.
pub fn style_for(kind: ClauseKind) -> StyleAttrs {
    style_for_name(kind.name())
        .or_else(|| style_for_name(kind.base().name()))
        .or_else(|| style_for_name(DEFAULT_STYLE_KEY))
        .unwrap_or(DEFAULT_STYLE)
}
