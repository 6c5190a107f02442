use super::error::ParsingError;
use std::fmt;
use std::str::FromStr;

/// Lookup suffixes accepted after a `__` in a field keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookup {
    /// `[* TO value]`
    Lte,
    /// `[value TO *]`
    Gte,
    /// `{* TO value}`
    Lt,
    /// `{value TO *}`
    Gt,
    /// Any of the listed values, joined with OR
    In,
    /// Two listed values, joined with TO
    Range,
    /// Value followed by a wildcard
    StartsWith,
    /// Value preceded by a wildcard
    EndsWith,
}

impl Lookup {
    pub const ALL: [Lookup; 8] = [
        Lookup::Lte,
        Lookup::Gte,
        Lookup::Lt,
        Lookup::Gt,
        Lookup::In,
        Lookup::Range,
        Lookup::StartsWith,
        Lookup::EndsWith,
    ];

    /// Keyword as written after the `__` separator
    pub fn keyword(&self) -> &'static str {
        match self {
            Lookup::Lte => "lte",
            Lookup::Gte => "gte",
            Lookup::Lt => "lt",
            Lookup::Gt => "gt",
            Lookup::In => "in",
            Lookup::Range => "range",
            Lookup::StartsWith => "startswith",
            Lookup::EndsWith => "endswith",
        }
    }

    /// Separator used when a list value is cast under this lookup
    pub fn list_separator(lookup: Option<Lookup>) -> &'static str {
        match lookup {
            Some(Lookup::Range) => " TO ",
            _ => " OR ",
        }
    }

    /// Wrap an already cast value in the range syntax of this lookup.
    ///
    /// `in` and `range` are joined by the caster, `startswith` and
    /// `endswith` are decorated there too, so they pass through untouched.
    pub fn apply(&self, value: &str) -> String {
        match self {
            Lookup::Lte => format!("[* TO {value}]"),
            Lookup::Gte => format!("[{value} TO *]"),
            Lookup::Lt => format!("{{* TO {value}}}"),
            Lookup::Gt => format!("{{{value} TO *}}"),
            Lookup::In | Lookup::Range | Lookup::StartsWith | Lookup::EndsWith => {
                value.to_string()
            }
        }
    }
}

impl FromStr for Lookup {
    type Err = ParsingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Lookup::ALL
            .into_iter()
            .find(|lookup| lookup.keyword() == s)
            .ok_or_else(|| ParsingError::InvalidLookup(s.to_string()))
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

pub(crate) fn valid_lookups() -> String {
    Lookup::ALL
        .iter()
        .map(Lookup::keyword)
        .collect::<Vec<_>>()
        .join(", ")
}
