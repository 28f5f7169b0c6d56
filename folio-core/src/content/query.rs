//! Read query options: projection, sort order and page size

use std::fmt;

/// Page size the content service applies when a read sets no limit
pub const DEFAULT_LIMIT: usize = 100;

/// Field projection.
///
/// Each entry is a dotted path (`author.name`). `*` selects every field at
/// its level, so `*.*` selects every field and every field of each relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<String>);

impl Fields {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(Into::into).collect())
    }

    /// `*`: every top-level field, relations as keys
    pub fn all() -> Self {
        Self::new(["*"])
    }

    /// `*.*`: every field, relations expanded one level
    pub fn all_nested() -> Self {
        Self::new(["*.*"])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// One sort key. Renders as `field` or `-field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub direction: Direction,
}

impl SortField {
    pub fn asc(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: Direction::Ascending }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: Direction::Descending }
    }

    /// Parse the wire form (`-publish_date`)
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.strip_prefix('-') {
            Some("") => None,
            Some(field) => Some(Self::desc(field)),
            None if raw.is_empty() => None,
            None => Some(Self::asc(raw)),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Ascending => write!(f, "{}", self.field),
            Direction::Descending => write!(f, "-{}", self.field),
        }
    }
}

/// Page size of a list read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Count(usize),
    /// No cap (`limit=-1`)
    Unlimited,
}

impl Limit {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "-1" => Some(Limit::Unlimited),
            other => other.parse().ok().map(Limit::Count),
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Count(n) => write!(f, "{}", n),
            Limit::Unlimited => f.write_str("-1"),
        }
    }
}

/// Options of a single read
///
/// # Example
///
/// ```rust,ignore
/// let query = Query::new()
///     .fields(Fields::new(["slug", "title", "author.name"]))
///     .sort(SortField::desc("publish_date"));
/// assert_eq!(query.to_pairs()[1], ("sort".into(), "-publish_date".into()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub fields: Fields,
    pub sort: Vec<SortField>,
    pub limit: Option<Limit>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    pub fn sort(mut self, field: SortField) -> Self {
        self.sort.push(field);
        self
    }

    pub fn limit(mut self, limit: Limit) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query-string pairs, in a stable order
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if !self.fields.is_empty() {
            pairs.push(("fields".to_string(), self.fields.to_string()));
        }
        if !self.sort.is_empty() {
            let sort: Vec<String> = self.sort.iter().map(ToString::to_string).collect();
            pairs.push(("sort".to_string(), sort.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }

    /// Rebuild a query from query-string pairs. Unknown keys are ignored.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut query = Query::new();
        for (key, value) in pairs {
            match key {
                "fields" | "fields[]" => {
                    query.fields.0.extend(
                        value.split(',').map(str::trim).filter(|f| !f.is_empty()).map(String::from),
                    );
                }
                "sort" | "sort[]" => {
                    query.sort.extend(value.split(',').filter_map(SortField::parse));
                }
                "limit" => query.limit = Limit::parse(value),
                _ => {}
            }
        }
        query
    }

    /// Number of items a list read returns at most
    pub fn effective_limit(&self) -> Option<usize> {
        match self.limit {
            None => Some(DEFAULT_LIMIT),
            Some(Limit::Count(n)) => Some(n),
            Some(Limit::Unlimited) => None,
        }
    }
}
