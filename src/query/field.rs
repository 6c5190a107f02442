use super::error::ParsingError;
use super::lookup::Lookup;
use super::value::{Value, format_timestamp};

/// Separator between a field name and its lookup keyword
pub const LOOKUP_SEPARATOR: &str = "__";

/// A field clause: `name`, an optional lookup and the value to match
#[derive(Debug, Clone)]
pub struct FieldQuery {
    pub name: String,
    pub lookup: Option<Lookup>,
    pub value: Value,
}

impl FieldQuery {
    pub fn new(name: impl Into<String>, lookup: Option<Lookup>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            lookup,
            value: value.into(),
        }
    }

    /// Parse a `name` or `name__lookup` keyword.
    ///
    /// The keyword is split on its last `__`, so field names may contain
    /// double underscores themselves (`author__name__startswith`).
    pub fn parse(keyword: &str, value: impl Into<Value>) -> Result<Self, ParsingError> {
        let (name, lookup) = match keyword.rsplit_once(LOOKUP_SEPARATOR) {
            Some((name, suffix)) => (name, Some(suffix.parse::<Lookup>()?)),
            None => (keyword, None),
        };

        if name.is_empty() {
            return Err(ParsingError::EmptyFieldName(keyword.to_string()));
        }

        Ok(Self::new(name, lookup, value))
    }

    /// The keyword this clause was (or could have been) parsed from
    pub fn keyword(&self) -> String {
        match self.lookup {
            Some(lookup) => format!("{}{LOOKUP_SEPARATOR}{lookup}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Validate a keyword-style argument set: optional free text plus fields.
///
/// At most one of the two may be present and at most one field may be
/// given. On success the single field, if any, is returned parsed.
pub(crate) fn validate_args(
    text: Option<&Value>,
    fields: Vec<(String, Value)>,
) -> Result<Option<FieldQuery>, ParsingError> {
    if let Some(text) = text.filter(|text| !text.is_absent())
        && !fields.is_empty()
    {
        return Err(ParsingError::MixedTextAndField {
            suggestion: format!("qb('{}') & {}", raw_text(text), suggest_fields(&fields)),
        });
    }

    if fields.len() > 1 {
        return Err(ParsingError::MultipleFields {
            suggestion: suggest_fields(&fields),
        });
    }

    fields
        .into_iter()
        .next()
        .map(|(keyword, value)| FieldQuery::parse(&keyword, value))
        .transpose()
}

/// Echo fields back in call syntax: `qb(a='1') & qb(b='2')`
fn suggest_fields(fields: &[(String, Value)]) -> String {
    fields
        .iter()
        .map(|(keyword, value)| format!("qb({keyword}='{}')", raw_text(value)))
        .collect::<Vec<_>>()
        .join(" & ")
}

fn raw_text(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Timestamp(ts) => format_timestamp(ts),
        Value::Int(n) => n.to_string(),
        Value::Float(x) => x.to_string(),
        Value::Text(text) => text.clone(),
        Value::List(items) => format!(
            "[{}]",
            items.iter().map(raw_text).collect::<Vec<_>>().join(", ")
        ),
        Value::Expr(query) => query.render(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_field() {
        let field = FieldQuery::parse("brand", "blah").unwrap();
        assert_eq!(field.name, "brand");
        assert_eq!(field.lookup, None);
    }

    #[test]
    fn test_parse_field_with_lookup() {
        let field = FieldQuery::parse("pub_date__lte", 3).unwrap();
        assert_eq!(field.name, "pub_date");
        assert_eq!(field.lookup, Some(Lookup::Lte));
        assert_eq!(field.keyword(), "pub_date__lte");
    }

    #[test]
    fn test_parse_splits_on_last_separator() {
        let field = FieldQuery::parse("author__name__startswith", "li").unwrap();
        assert_eq!(field.name, "author__name");
        assert_eq!(field.lookup, Some(Lookup::StartsWith));
    }

    #[test]
    fn test_parse_rejects_unknown_lookup() {
        let err = FieldQuery::parse("pub_date__invalid", 3).unwrap_err();
        assert_eq!(err, ParsingError::InvalidLookup("invalid".to_string()));
    }

    #[test]
    fn test_parse_rejects_empty_name() {
        assert!(matches!(
            FieldQuery::parse("__lte", 3),
            Err(ParsingError::EmptyFieldName(_))
        ));
    }

    #[test]
    fn test_validate_mixed_text_and_field() {
        let text = Value::from("stuff");
        let err = validate_args(Some(&text), vec![("field".into(), "val".into())]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "You cannot use both words and fields in the same call. \
             Instead, you can do something like this: qb('stuff') & qb(field='val')"
        );
    }

    #[test]
    fn test_validate_more_than_one_field() {
        let err = validate_args(
            None,
            vec![("field1".into(), "a".into()), ("field2".into(), "b".into())],
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "You cannot use more than one field in the same call. \
             Instead, you can do something like this: qb(field1='a') & qb(field2='b')"
        );
    }

    #[test]
    fn test_validate_no_arguments() {
        assert!(validate_args(None, Vec::new()).unwrap().is_none());
    }
}
