//! Query expression building and rendering
//!
//! This module provides a small algebra of query clauses that render to a
//! Lucene-style query string. Clauses are built from free text or from a
//! field keyword, then combined with AND, OR and NOT.
//!
//! # Syntax
//!
//! ```text
//! *:*                         Match everything
//! "ice cream"                 Free-text phrase
//! brand:"blah"                Field match
//! pub_date:([* TO "..."])     Field with a range lookup
//! ("a" AND "b")               Conjunction
//! ("a" OR "b")                Disjunction
//! (NOT "a")                   Negation
//! "stuff" field^3             Boosted clause
//! ```
//!
//! # Field keywords
//!
//! A field keyword is `name` or `name__lookup`, where the lookup is one of
//! `lte`, `gte`, `lt`, `gt`, `in`, `range`, `startswith` or `endswith`.
//!
//! # Examples
//!
//! ```
//! use search_query::query::{FieldQuery, Query};
//!
//! let query = Query::text("cone").negate()
//!     | (Query::text("cream") & Query::field(FieldQuery::parse("brand", "ice").unwrap()));
//! assert_eq!(query.render(), r#"((NOT "cone") OR ("cream" AND brand:"ice"))"#);
//! ```

pub mod error;
pub mod field;
pub mod lookup;
pub mod user_input;
pub mod value;

pub use error::ParsingError;
pub use field::FieldQuery;
pub use lookup::Lookup;
pub use user_input::DefaultOperator;
pub use value::Value;

use std::cell::OnceCell;
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};
use tracing::trace;

/// Rendering of a query that matches every document
pub const MATCH_ALL: &str = "*:*";

/// Boolean combinator joining two queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    fn separator(self) -> &'static str {
        match self {
            Operator::And => " AND ",
            Operator::Or => " OR ",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::And => "AND",
            Operator::Or => "OR",
        })
    }
}

/// Weight annotation appended as `field^factor`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boost {
    pub field: String,
    pub factor: u32,
}

#[derive(Debug, Clone)]
pub enum QueryKind {
    /// Renders as nothing; the identity element for AND and OR
    Empty,
    /// Renders as `*:*`
    MatchAll,
    /// Free text matched against the default search field
    Text(Value),
    Field(FieldQuery),
    Not(Box<Query>),
    Composite {
        op: Operator,
        left: Box<Query>,
        right: Box<Query>,
    },
}

/// A composable query clause.
///
/// Combining queries consumes the operands and returns a new node. Negated
/// and combined nodes remember their rendering after the first call.
#[derive(Debug, Clone)]
pub struct Query {
    kind: QueryKind,
    boost: Option<Boost>,
    rendered: OnceCell<String>,
}

impl Query {
    fn from_kind(kind: QueryKind) -> Self {
        Self {
            kind,
            boost: None,
            rendered: OnceCell::new(),
        }
    }

    /// A query matching every document
    pub fn all() -> Self {
        Self::from_kind(QueryKind::MatchAll)
    }

    /// A query that renders as nothing, used to start a chain
    pub fn empty() -> Self {
        Self::from_kind(QueryKind::Empty)
    }

    /// Free-text query. An empty string matches everything.
    pub fn text(value: impl Into<Value>) -> Self {
        Self::from_kind(QueryKind::Text(value.into()))
    }

    pub fn field(field: FieldQuery) -> Self {
        Self::from_kind(QueryKind::Field(field))
    }

    /// Field query from a `name` or `name__lookup` keyword
    pub fn parse_field(keyword: &str, value: impl Into<Value>) -> Result<Self, ParsingError> {
        FieldQuery::parse(keyword, value).map(Self::field)
    }

    /// Build a query from keyword-style arguments.
    ///
    /// Accepts free text or a single field, never both; with neither the
    /// query matches everything.
    pub fn from_args(
        text: Option<Value>,
        fields: Vec<(String, Value)>,
    ) -> Result<Self, ParsingError> {
        match field::validate_args(text.as_ref(), fields)? {
            Some(field) => Ok(Self::field(field)),
            None => Ok(match text {
                Some(text) => Self::text(text),
                None => Self::all(),
            }),
        }
    }

    pub fn with_boost(mut self, field: impl Into<String>, factor: u32) -> Self {
        self.boost = Some(Boost {
            field: field.into(),
            factor,
        });
        self.rendered = OnceCell::new();
        self
    }

    pub fn kind(&self) -> &QueryKind {
        &self.kind
    }

    pub fn boost(&self) -> Option<&Boost> {
        self.boost.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, QueryKind::Empty)
    }

    /// `(self AND other)`; an empty operand yields the other one
    pub fn and(self, other: Query) -> Self {
        self.combine(Operator::And, other)
    }

    /// `(self OR other)`; an empty operand yields the other one
    pub fn or(self, other: Query) -> Self {
        self.combine(Operator::Or, other)
    }

    /// `(NOT self)`. Negating an empty query leaves it empty.
    pub fn negate(self) -> Self {
        if self.is_empty() {
            return self;
        }
        Self::from_kind(QueryKind::Not(Box::new(self)))
    }

    pub fn combine(self, op: Operator, other: Query) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Self::from_kind(QueryKind::Composite {
            op,
            left: Box::new(self),
            right: Box::new(other),
        })
    }

    /// Render the query string
    pub fn render(&self) -> String {
        match &self.kind {
            QueryKind::Empty => String::new(),
            QueryKind::MatchAll => MATCH_ALL.to_string(),
            QueryKind::Text(value) if value.is_absent() => MATCH_ALL.to_string(),
            QueryKind::Text(value) => self.append_boost(value::cast(value, None)),
            QueryKind::Field(field) => self.append_boost(render_field(field)),
            QueryKind::Not(_) | QueryKind::Composite { .. } => self
                .rendered
                .get_or_init(|| {
                    let rendered = self.render_compound();
                    trace!(len = rendered.len(), "memoized compound query");
                    rendered
                })
                .clone(),
        }
    }

    /// Walks the tree with an explicit stack so deep left folds (one level
    /// per word of user input) never exhaust the thread stack.
    fn render_compound(&self) -> String {
        let mut out = String::new();
        let mut pending = vec![Step::Visit(self)];

        while let Some(step) = pending.pop() {
            match step {
                Step::Emit(text) => out.push_str(text),
                Step::Close(boost) => {
                    out.push(')');
                    if let Some(boost) = boost {
                        out.push_str(&format!(" {}^{}", boost.field, boost.factor));
                    }
                }
                Step::Visit(query) => match (&query.kind, query.rendered.get()) {
                    (_, Some(memo)) => out.push_str(memo),
                    (QueryKind::Not(inner), None) => {
                        pending.push(Step::Close(query.boost.as_ref()));
                        pending.push(Step::Visit(inner));
                        pending.push(Step::Emit("(NOT "));
                    }
                    (QueryKind::Composite { op, left, right }, None) => {
                        pending.push(Step::Close(query.boost.as_ref()));
                        pending.push(Step::Visit(right));
                        pending.push(Step::Emit(op.separator()));
                        pending.push(Step::Visit(left));
                        pending.push(Step::Emit("("));
                    }
                    _ => out.push_str(&query.render()),
                },
            }
        }
        out
    }

    fn append_boost(&self, base: String) -> String {
        match &self.boost {
            Some(boost) => format!("{base} {}^{}", boost.field, boost.factor),
            None => base,
        }
    }
}

enum Step<'a> {
    Visit(&'a Query),
    Emit(&'static str),
    Close(Option<&'a Boost>),
}

fn render_field(field: &FieldQuery) -> String {
    let value = value::cast(&field.value, field.lookup);
    match field.lookup {
        Some(lookup) => format!("{}:({})", field.name, lookup.apply(&value)),
        None if field.value.is_list() => format!("{}:({value})", field.name),
        None => format!("{}:{value}", field.name),
    }
}

// Children are detached onto a heap stack before they go out of scope, so
// dropping a deep tree does not recurse once per level.
impl Drop for Query {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(&mut self.kind, &mut pending);
        while let Some(mut node) = pending.pop() {
            detach_children(&mut node.kind, &mut pending);
        }
    }
}

fn detach_children(kind: &mut QueryKind, pending: &mut Vec<Box<Query>>) {
    if !matches!(kind, QueryKind::Not(_) | QueryKind::Composite { .. }) {
        return;
    }
    match std::mem::replace(kind, QueryKind::Empty) {
        QueryKind::Not(inner) => pending.push(inner),
        QueryKind::Composite { left, right, .. } => {
            pending.push(left);
            pending.push(right);
        }
        _ => {}
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::all()
    }
}

impl From<FieldQuery> for Query {
    fn from(field: FieldQuery) -> Self {
        Self::field(field)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl BitAnd for Query {
    type Output = Query;

    fn bitand(self, rhs: Query) -> Query {
        self.and(rhs)
    }
}

impl BitOr for Query {
    type Output = Query;

    fn bitor(self, rhs: Query) -> Query {
        self.or(rhs)
    }
}

impl Not for Query {
    type Output = Query;

    fn not(self) -> Query {
        self.negate()
    }
}

impl BitAndAssign for Query {
    fn bitand_assign(&mut self, rhs: Query) {
        let lhs = std::mem::replace(self, Query::empty());
        *self = lhs.and(rhs);
    }
}

impl BitOrAssign for Query {
    fn bitor_assign(&mut self, rhs: Query) {
        let lhs = std::mem::replace(self, Query::empty());
        *self = lhs.or(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_all_and_empty() {
        assert_eq!(Query::all().render(), "*:*");
        assert_eq!(Query::default().render(), "*:*");
        assert_eq!(Query::empty().render(), "");
        assert_eq!(Query::text("").render(), "*:*");
    }

    #[test]
    fn test_false_is_a_real_query() {
        assert_eq!(Query::text(false).render(), "\"false\"");
        assert_eq!(Query::text(0).render(), "\"0\"");
    }

    #[test]
    fn test_negate_empty_stays_empty() {
        let query = Query::empty().negate();
        assert!(query.is_empty());
        assert_eq!(query.render(), "");
    }

    #[test]
    fn test_empty_right_operand_is_dropped() {
        let query = Query::text("ice") & Query::empty();
        assert_eq!(query.render(), "\"ice\"");
    }

    #[test]
    fn test_compound_rendering_is_memoized() {
        let query = Query::text("ice") & Query::text("cream");
        assert!(query.rendered.get().is_none());
        let first = query.render();
        assert_eq!(query.rendered.get(), Some(&first));
        assert_eq!(query.render(), first);
    }

    #[test]
    fn test_memoized_child_is_reused_inside_parent() {
        let inner = Query::text("ice") | Query::text("cream");
        let inner_text = inner.render();
        let query = inner.negate() & Query::text("cone");
        assert_eq!(query.render(), format!("((NOT {inner_text}) AND \"cone\")"));
    }

    #[test]
    fn test_boost_inside_deep_tree() {
        let query = (Query::text("a") & Query::text("b")).with_boost("f", 2).negate()
            | Query::text("c");
        assert_eq!(query.render(), "((NOT (\"a\" AND \"b\") f^2) OR \"c\")");
    }

    #[test]
    fn test_boost_on_compound() {
        let query = (Query::text("ice") | Query::text("cream")).with_boost("title", 2);
        assert_eq!(query.render(), "(\"ice\" OR \"cream\") title^2");
    }

    #[test]
    fn test_match_all_never_boosted() {
        assert_eq!(Query::all().with_boost("f", 3).render(), "*:*");
    }

    #[test]
    fn test_list_field_without_lookup_is_parenthesized() {
        let query = Query::parse_field("tags", vec!["a", "b"]).unwrap();
        assert_eq!(query.render(), "tags:(\"a\" OR \"b\")");
    }

    #[test]
    fn test_from_args() {
        assert_eq!(Query::from_args(None, Vec::new()).unwrap().render(), "*:*");
        assert_eq!(
            Query::from_args(Some("stuff".into()), Vec::new())
                .unwrap()
                .render(),
            "\"stuff\""
        );
        assert_eq!(
            Query::from_args(None, vec![("brand".into(), "blah".into())])
                .unwrap()
                .render(),
            "brand:\"blah\""
        );
    }
}
