use crate::queryset::Hit;

/// Key identifying a hit across wrapping: `<_type>:<_id>`
pub fn hit_key(hit: &Hit) -> String {
    format!("{}:{}", hit.doc_type, hit.id)
}

/// Post-search hook that claims some hits and rewrites them.
///
/// A wrapper must keep `key` stable for the hits it returns from `wrap`,
/// otherwise the query set cannot put them back in their original slot.
pub trait Wrapper {
    fn matches(&self, hit: &Hit) -> bool;

    fn wrap(&self, hits: Vec<Hit>) -> Vec<Hit>;

    fn key(&self, hit: &Hit) -> String {
        hit_key(hit)
    }
}

/// Wrapper claiming every hit of one document type
pub struct TypeWrapper<F> {
    doc_type: String,
    wrap_fn: F,
}

impl<F> TypeWrapper<F>
where
    F: Fn(Vec<Hit>) -> Vec<Hit>,
{
    pub fn new(doc_type: impl Into<String>, wrap_fn: F) -> Self {
        Self {
            doc_type: doc_type.into(),
            wrap_fn,
        }
    }
}

impl<F> Wrapper for TypeWrapper<F>
where
    F: Fn(Vec<Hit>) -> Vec<Hit>,
{
    fn matches(&self, hit: &Hit) -> bool {
        hit.doc_type == self.doc_type
    }

    fn wrap(&self, hits: Vec<Hit>) -> Vec<Hit> {
        (self.wrap_fn)(hits)
    }
}
