//! Address-bar abstraction

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use url::Url;

/// Read and write access to the query parameters of the current location
pub trait Location {
    fn query_param(&self, name: &str) -> Option<String>;

    /// Set `name` to `value`, or remove it when `value` is `None`.
    ///
    /// Other parameters are preserved.
    fn set_query_param(&mut self, name: &str, value: Option<&str>);
}

impl Location for Url {
    fn query_param(&self, name: &str) -> Option<String> {
        self.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    fn set_query_param(&mut self, name: &str, value: Option<&str>) {
        let kept: Vec<(String, String)> = self
            .query_pairs()
            .filter(|(key, _)| key != name)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        if kept.is_empty() && value.is_none() {
            self.set_query(None);
            return;
        }

        let mut pairs = self.query_pairs_mut();
        pairs.clear();
        pairs.extend_pairs(kept);
        if let Some(value) = value {
            pairs.append_pair(name, value);
        }
    }
}

/// Location shared between the grid and its host.
impl<L: Location> Location for Arc<Mutex<L>> {
    fn query_param(&self, name: &str) -> Option<String> {
        self.lock().query_param(name)
    }

    fn set_query_param(&mut self, name: &str, value: Option<&str>) {
        self.lock().set_query_param(name, value);
    }
}

/// In-memory query parameters, for hosts without a real URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryLocation {
    params: BTreeMap<String, String>,
    /// Number of writes that changed a parameter
    writes: usize,
}

impl MemoryLocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Location for MemoryLocation {
    fn query_param(&self, name: &str) -> Option<String> {
        self.params.get(name).cloned()
    }

    fn set_query_param(&mut self, name: &str, value: Option<&str>) {
        let changed = match value {
            Some(value) => {
                let previous = self.params.insert(name.to_string(), value.to_string());
                previous.as_deref() != Some(value)
            }
            None => self.params.remove(name).is_some(),
        };
        if changed {
            self.writes += 1;
        }
    }
}
