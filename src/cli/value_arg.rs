use crate::query::Value;
use crate::query::value;
use crate::query::field::LOOKUP_SEPARATOR;
use crate::query::lookup::Lookup;
use chrono::NaiveDateTime;
use std::str::FromStr;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// `name=value` or `name__lookup=value` as typed on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldArg {
    pub keyword: String,
    pub raw_value: String,
}

impl FieldArg {
    /// Coerce the raw text. `in` and `range` take a comma-separated list.
    pub fn value(&self) -> Value {
        let lookup = self
            .keyword
            .rsplit_once(LOOKUP_SEPARATOR)
            .and_then(|(_, suffix)| suffix.parse::<Lookup>().ok());

        match lookup {
            Some(Lookup::In | Lookup::Range) => Value::List(
                self.raw_value
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(parse_value)
                    .collect(),
            ),
            _ => parse_value(&self.raw_value),
        }
    }
}

impl FromStr for FieldArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (keyword, raw_value) = s
            .split_once('=')
            .ok_or_else(|| format!("Expected 'name=value' format, got: {s}"))?;

        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(format!("Empty field name in: {s}"));
        }

        Ok(FieldArg {
            keyword: keyword.to_string(),
            raw_value: raw_value.to_string(),
        })
    }
}

/// `field^factor`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoostArg {
    pub field: String,
    pub factor: u32,
}

impl FromStr for BoostArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, factor) = s
            .rsplit_once('^')
            .ok_or_else(|| format!("Expected 'field^factor' format, got: {s}"))?;

        if field.is_empty() {
            return Err(format!("Empty boost field in: {s}"));
        }

        let factor = factor
            .parse::<u32>()
            .map_err(|e| format!("Invalid boost factor '{factor}': {e}"))?;

        Ok(BoostArg {
            field: field.to_string(),
            factor,
        })
    }
}

/// Best-effort typing of a command-line value.
///
/// Numbers stay text so the rendered query carries exactly what was typed
/// (`02134`, `1.50`). A timestamp is only typed when it renders back to the
/// same characters; otherwise it stays text too.
pub fn parse_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
            .ok()
            .filter(|ts| value::format_timestamp(ts) == raw)
            .map_or_else(|| Value::Text(raw.to_string()), Value::Timestamp),
    }
}
