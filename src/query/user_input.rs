use super::{Operator, Query};
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Combinator used to join the words of free-text user input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DefaultOperator {
    #[default]
    And,
    Or,
}

impl From<DefaultOperator> for Operator {
    fn from(op: DefaultOperator) -> Self {
        match op {
            DefaultOperator::And => Operator::And,
            DefaultOperator::Or => Operator::Or,
        }
    }
}

impl FromStr for DefaultOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AND" => Ok(DefaultOperator::And),
            "OR" => Ok(DefaultOperator::Or),
            _ => Err(format!("Unknown operator '{s}'. Valid operators are: AND, OR")),
        }
    }
}

impl Query {
    /// Turn raw user input into a query, one free-text clause per word.
    ///
    /// Words are joined left to right with `op`. Blank input matches
    /// everything.
    pub fn from_user_input(input: &str, op: DefaultOperator) -> Query {
        let op = Operator::from(op);
        WHITESPACE_RE
            .split(input.trim())
            .map(Query::text)
            .reduce(|acc, word| acc.combine(op, word))
            .unwrap_or_else(Query::all)
    }
}
