use thiserror::Error;

/// Errors raised while constructing a query node
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsingError {
    #[error(
        "You cannot use both words and fields in the same call. Instead, you can do something like this: {suggestion}"
    )]
    MixedTextAndField { suggestion: String },

    #[error(
        "You cannot use more than one field in the same call. Instead, you can do something like this: {suggestion}"
    )]
    MultipleFields { suggestion: String },

    #[error("'{0}' is not a valid lookup argument. The valid lookups are: {valid}", valid = super::lookup::valid_lookups())]
    InvalidLookup(String),

    #[error("Empty field name in '{0}'")]
    EmptyFieldName(String),
}
