use gridkit_core::{Filters, OrderSpec};

use super::codec::{EMPTY_TOKEN, QueryStateToken, decode};
use super::location::Location;
use crate::defaults::GridDefaults;

/// Query parameter holding the grid token unless configured otherwise
pub const DEFAULT_QUERY_PARAM: &str = "state";

/// Complete grid request state rebuilt from a URL token.
///
/// Fields the token leaves out take the configured default rather than
/// keeping whatever the grid held before.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredState {
    pub limit: usize,
    pub offset: usize,
    pub ordering: OrderSpec,
    pub filters: Filters,
}

impl RestoredState {
    pub fn from_token(token: Option<&QueryStateToken>, defaults: &GridDefaults) -> Self {
        let Some(token) = token else {
            return Self::defaults(defaults);
        };

        let ordering = match &token.sb {
            Some(column) => OrderSpec::by(column.clone(), token.sd.unwrap_or_default()),
            None => defaults.ordering.clone(),
        };

        Self {
            limit: token.l.filter(|l| *l > 0).unwrap_or(defaults.limit),
            offset: token.o.unwrap_or(0),
            ordering,
            filters: token.f.clone().unwrap_or_else(|| defaults.filters.clone()),
        }
    }

    pub fn defaults(defaults: &GridDefaults) -> Self {
        Self {
            limit: defaults.limit,
            offset: 0,
            ordering: defaults.ordering.clone(),
            filters: defaults.filters.clone(),
        }
    }
}

/// Two-way binding between grid state and one URL query parameter.
///
/// Remembers the last token written or read. A token equal to it is ignored
/// in either direction, which stops a state write from coming back as a URL
/// change and being applied again.
#[derive(Debug, Clone)]
pub struct QueryStringSync {
    param: String,
    previous: Option<String>,
}

impl QueryStringSync {
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            previous: None,
        }
    }

    pub fn param(&self) -> &str {
        &self.param
    }

    /// Last token seen in either direction
    pub fn previous(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    /// Mirror a state token into the location.
    ///
    /// The default-state token removes the parameter. Returns whether the
    /// location was written.
    pub fn push<L: Location + ?Sized>(&mut self, location: &mut L, token: &str) -> bool {
        if self.previous.as_deref() == Some(token) {
            return false;
        }
        self.previous = Some(token.to_string());

        let value = (token != EMPTY_TOKEN).then_some(token);
        location.set_query_param(&self.param, value);
        tracing::debug!(param = %self.param, token, "Wrote grid state to location");
        true
    }

    /// Read the location and rebuild grid state if the token changed.
    ///
    /// A missing parameter reads as the default-state token. A malformed
    /// token restores the defaults.
    pub fn pull<L: Location + ?Sized>(
        &mut self,
        location: &L,
        defaults: &GridDefaults,
    ) -> Option<RestoredState> {
        let token = location
            .query_param(&self.param)
            .filter(|token| !token.trim().is_empty())
            .unwrap_or_else(|| EMPTY_TOKEN.to_string());

        if self.previous.as_deref() == Some(token.as_str()) {
            return None;
        }

        let decoded = decode(&token);
        if decoded.is_none() {
            tracing::debug!(param = %self.param, "Restoring defaults for unreadable grid state");
        }
        let restored = RestoredState::from_token(decoded.as_ref(), defaults);
        self.previous = Some(token);
        Some(restored)
    }
}

impl Default for QueryStringSync {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY_PARAM)
    }
}
