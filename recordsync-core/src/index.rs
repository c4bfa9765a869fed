//! Parsing and rendering of `CREATE INDEX` statements.
//!
//! Collections store their indexes as raw statements. Before an index is created the
//! statement is parsed into a [`ParsedIndex`], retargeted at the collection table and
//! rendered again for the active [`Dialect`], so no user supplied SQL reaches the backend
//! verbatim.

use std::sync::LazyLock;

use regex::Regex;

use crate::dialect::Dialect;

static INDEX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)^\s*create\s+(unique\s+)?\s*index\s*(if\s+not\s+exists\s+)?(\S*)\s+on\s+(\S*)\s*\((.*?)\)\s*(?:where\s+(.*))?$",
    )
    .expect("index regex must compile")
});

static INDEX_COLUMN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(.+?)(?:\s+collate\s+(\w+))?(?:\s+(asc|desc))?$")
        .expect("index column regex must compile")
});

const TRIM_CHARS: &[char] = &['`', '"', '\'', '[', ']', '\r', '\n', '\t', '\x0c', '\x0b', ' '];

/// Sort direction of an indexed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// One column (or expression) of an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumn {
    pub name: String,
    pub collate: Option<String>,
    pub sort: Option<SortOrder>,
}

impl IndexColumn {
    /// Function calls and anything containing whitespace is rendered verbatim.
    pub fn is_expression(&self) -> bool {
        self.name.contains('(') || self.name.contains(char::is_whitespace)
    }
}

/// Structured form of a `CREATE INDEX` statement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedIndex {
    pub unique: bool,
    /// `IF NOT EXISTS` was present.
    pub optional: bool,
    pub schema_name: Option<String>,
    pub index_name: String,
    pub table_name: String,
    pub columns: Vec<IndexColumn>,
    pub where_clause: Option<String>,
}

impl ParsedIndex {
    /// Parses a raw index statement.
    ///
    /// Parsing never fails: anything that cannot be understood yields an index for which
    /// [`ParsedIndex::is_valid`] is `false`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().trim_end_matches(';');

        let Some(caps) = INDEX_REGEX.captures(raw) else {
            return Self::default();
        };

        let capture = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or_default();

        let mut index = Self {
            unique: !capture(1).trim().is_empty(),
            optional: !capture(2).trim().is_empty(),
            table_name: capture(4).trim_matches(TRIM_CHARS).to_owned(),
            ..Default::default()
        };

        let name_parts = split_top_level(capture(3), '.');
        match name_parts.as_slice() {
            [schema, name] => {
                index.schema_name = Some(schema.trim_matches(TRIM_CHARS).to_owned())
                    .filter(|s| !s.is_empty());
                index.index_name = name.trim_matches(TRIM_CHARS).to_owned();
            }
            [name, ..] => index.index_name = name.trim_matches(TRIM_CHARS).to_owned(),
            [] => {}
        }

        for raw_column in split_top_level(capture(5), ',') {
            let Some(col) = INDEX_COLUMN_REGEX.captures(raw_column.trim()) else {
                continue;
            };

            let name = col
                .get(1)
                .map(|m| m.as_str().trim_matches(TRIM_CHARS))
                .unwrap_or_default();
            if name.is_empty() {
                continue;
            }

            let sort = col.get(3).map(|m| {
                if m.as_str().eq_ignore_ascii_case("desc") {
                    SortOrder::Desc
                } else {
                    SortOrder::Asc
                }
            });

            index.columns.push(IndexColumn {
                name: name.to_owned(),
                collate: col.get(2).map(|m| m.as_str().to_owned()),
                sort,
            });
        }

        index.where_clause = Some(capture(6).trim().to_owned()).filter(|w| !w.is_empty());

        index
    }

    pub fn is_valid(&self) -> bool {
        !self.index_name.is_empty() && !self.table_name.is_empty() && !self.columns.is_empty()
    }

    /// Renders the indexed columns, e.g. `("title" COLLATE nocase, "created" DESC)`.
    pub fn expression(&self, dialect: Dialect) -> String {
        let columns = self
            .columns
            .iter()
            .map(|col| {
                let mut rendered = if col.is_expression() {
                    col.name.trim().to_owned()
                } else {
                    dialect.quote(col.name.trim())
                };

                if let Some(collate) = &col.collate {
                    rendered.push_str(" COLLATE ");
                    rendered.push_str(collate);
                }

                match col.sort {
                    Some(SortOrder::Asc) => rendered.push_str(" ASC"),
                    Some(SortOrder::Desc) => rendered.push_str(" DESC"),
                    None => {}
                }

                rendered
            })
            .collect::<Vec<_>>();

        format!("({})", columns.join(", "))
    }

    /// Renders the statement for `dialect`, or `None` for an invalid index.
    pub fn build(&self, dialect: Dialect) -> Option<String> {
        if !self.is_valid() {
            return None;
        }

        let mut sql = String::from("CREATE ");

        if self.unique {
            sql.push_str("UNIQUE ");
        }

        sql.push_str("INDEX ");

        if self.optional && dialect.supports_optional_index() {
            sql.push_str("IF NOT EXISTS ");
        }

        // MySQL has no schema qualified index names
        if let (Some(schema), Dialect::Sqlite) = (&self.schema_name, dialect) {
            sql.push_str(&dialect.quote(schema));
            sql.push('.');
        }

        sql.push_str(&dialect.quote(&self.index_name));
        sql.push_str(" ON ");
        sql.push_str(&dialect.quote(&self.table_name));
        sql.push(' ');
        sql.push_str(&self.expression(dialect));

        if let Some(where_clause) = &self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(where_clause);
        }

        Some(sql)
    }
}

/// Splits `input` on `separator` outside of quotes and parentheses.
fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '`') => quote = Some(c),
            (None, '[') => quote = Some(']'),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, c) if c == separator && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }

    let rest = &input[start..];
    if !rest.trim().is_empty() || !parts.is_empty() {
        parts.push(rest);
    }

    parts
}
