mod entities;

pub use entities::*;

use crate::config::{ConfigError, SearchConfig};
use crate::wrappers::Wrapper;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Sends a rendered query to a search backend
pub trait SearchTransport {
    fn search(
        &self,
        url: &str,
        query: &str,
        index: &str,
        options: &SearchOptions,
    ) -> Result<SearchResults, TransportError>;
}

/// Runs queries against configured indexes and post-processes the hits
pub struct QuerySet<T> {
    config: SearchConfig,
    transport: T,
    raw_results: Option<SearchResults>,
    wrappers: Vec<Box<dyn Wrapper>>,
}

impl<T: SearchTransport> QuerySet<T> {
    pub fn new(config: SearchConfig, transport: T) -> Result<Self, ConfigError> {
        if config.is_empty() {
            return Err(ConfigError::Missing);
        }

        Ok(Self {
            config,
            transport,
            raw_results: None,
            wrappers: Vec::new(),
        })
    }

    /// Render `query` and run it against `index`.
    ///
    /// The index is checked against the configuration before anything is
    /// sent.
    pub fn search(
        &mut self,
        query: impl fmt::Display,
        index: &str,
        options: &SearchOptions,
    ) -> Result<&mut Self, QuerySetError> {
        let connection = self.config.resolve(index)?;
        let query = query.to_string();
        debug!(index, url = %connection.url, query = %query, "dispatching search");

        let results = self
            .transport
            .search(&connection.url, &query, index, options)?;
        debug!(total = results.hits.total, "search finished");

        self.raw_results = Some(results);
        Ok(self)
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn raw_results(&self) -> Option<&SearchResults> {
        self.raw_results.as_ref()
    }

    /// Total number of hits; zero before any search
    pub fn count(&self) -> u64 {
        self.raw_results
            .as_ref()
            .map_or(0, |results| results.hits.total)
    }

    /// Best score among the hits; zero before any search
    pub fn max_score(&self) -> f64 {
        self.raw_results
            .as_ref()
            .and_then(|results| results.hits.max_score)
            .unwrap_or(0.0)
    }

    pub fn wrap(&mut self, wrapper: impl Wrapper + 'static) -> &mut Self {
        self.wrappers.push(Box::new(wrapper));
        self
    }

    /// Hits in backend order, after wrapping.
    ///
    /// With no wrappers the raw hits are returned. Otherwise only hits some
    /// wrapper claimed survive; with `clean == false` the unclaimed slots
    /// are kept as `None` so positions still line up with the raw hits.
    pub fn items(&self, clean: bool) -> Result<Vec<Option<Hit>>, QuerySetError> {
        let results = self
            .raw_results
            .as_ref()
            .ok_or(QuerySetError::EmptyQuerySet)?;
        let hits = &results.hits.hits;

        if self.wrappers.is_empty() {
            return Ok(hits.iter().cloned().map(Some).collect());
        }

        let mut order: HashMap<String, usize> = HashMap::new();
        let mut claimed: Vec<Vec<Hit>> = vec![Vec::new(); self.wrappers.len()];

        for (wrapper, group) in self.wrappers.iter().zip(claimed.iter_mut()) {
            for (position, hit) in hits.iter().enumerate() {
                if wrapper.matches(hit) {
                    group.push(hit.clone());
                    order.insert(wrapper.key(hit), position);
                }
            }
        }

        let mut slots: Vec<Option<Hit>> = vec![None; hits.len()];
        for (wrapper, group) in self.wrappers.iter().zip(claimed) {
            if group.is_empty() {
                continue;
            }
            for hit in wrapper.wrap(group) {
                let key = wrapper.key(&hit);
                match order.get(&key) {
                    Some(&position) => slots[position] = Some(hit),
                    None => warn!(key = %key, "wrapped hit has no matching raw hit, dropping it"),
                }
            }
        }

        if clean {
            slots.retain(Option::is_some);
        }

        Ok(slots)
    }

    /// Wrapped hits with the unclaimed ones removed
    pub fn hits(&self) -> Result<Vec<Hit>, QuerySetError> {
        Ok(self.items(true)?.into_iter().flatten().collect())
    }
}
