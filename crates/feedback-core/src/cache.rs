//! Keyed result cache for a polled remote query.
//!
//! [`QueryCache`] is the synchronous half of a polled query: it decides when a
//! request is issued, which responses are applied, and what the view sees.
//! Every request carries a [`FetchTicket`]; a response is applied only if its
//! ticket belongs to the current key and is not older than the last applied
//! response. Changing the key is the only way in-flight work is abandoned.

use std::collections::HashSet;

use crate::errors::ApiError;

/// Automatic retries allowed for a transient failure.
pub const MAX_RETRIES: u8 = 1;

/// Identity of one outstanding request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket<K> {
    id: u64,
    key: K,
    attempt: u8,
}

impl<K> FetchTicket<K> {
    #[must_use]
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// 0 for the first try, 1 for the retry.
    #[must_use]
    pub const fn attempt(&self) -> u8 {
        self.attempt
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }
}

/// What happened when a response was handed to [`QueryCache::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<K> {
    /// Fresh data is now displayed.
    Applied,
    /// The failure is now visible; earlier data for the key is kept.
    Failed,
    /// Transient failure; issue this ticket instead of surfacing the error.
    Retry(FetchTicket<K>),
    /// The session was rejected. Nothing was stored; the owner must escalate.
    Unauthorized,
    /// The response belongs to a superseded key or an older request.
    Discarded,
}

/// Read-only snapshot of a query for rendering.
#[derive(Debug)]
pub struct QueryView<'a, T> {
    pub data: Option<&'a T>,
    /// No data held for the current key and no error to show.
    pub is_loading: bool,
    /// A request for the current key is in flight.
    pub is_fetching: bool,
    pub is_error: bool,
    pub error: Option<&'a ApiError>,
}

/// Result slot for one query, keyed by its parameters.
#[derive(Debug)]
pub struct QueryCache<K, T> {
    key: K,
    data: Option<T>,
    error: Option<ApiError>,
    next_id: u64,
    /// Tickets below this id were issued for an earlier key.
    epoch: u64,
    /// Id of the response currently displayed.
    applied: Option<u64>,
    in_flight: HashSet<u64>,
}

impl<K: Clone + PartialEq, T> QueryCache<K, T> {
    /// Create an empty cache for `key`. No request is issued yet.
    pub fn new(key: K) -> Self {
        Self {
            key,
            data: None,
            error: None,
            next_id: 0,
            epoch: 0,
            applied: None,
            in_flight: HashSet::new(),
        }
    }

    pub const fn key(&self) -> &K {
        &self.key
    }

    pub fn view(&self) -> QueryView<'_, T> {
        QueryView {
            data: self.data.as_ref(),
            is_loading: self.data.is_none() && self.error.is_none(),
            is_fetching: !self.in_flight.is_empty(),
            is_error: self.error.is_some(),
            error: self.error.as_ref(),
        }
    }

    /// Issue the first request for the current key.
    pub fn start(&mut self) -> FetchTicket<K> {
        self.issue(0)
    }

    /// Switch to a new key.
    ///
    /// Returns the ticket for the new key, or `None` when the key is unchanged.
    /// Data, errors and in-flight requests of the old key are dropped.
    pub fn set_key(&mut self, key: K) -> Option<FetchTicket<K>> {
        if key == self.key {
            return None;
        }
        self.key = key;
        self.data = None;
        self.error = None;
        self.applied = None;
        self.in_flight.clear();
        self.epoch = self.next_id;
        Some(self.issue(0))
    }

    /// Manual out-of-band refresh.
    pub fn refetch(&mut self) -> FetchTicket<K> {
        self.issue(0)
    }

    /// Scheduled refresh. Skipped while a request is already in flight.
    pub fn poll(&mut self) -> Option<FetchTicket<K>> {
        if self.in_flight.is_empty() {
            Some(self.issue(0))
        } else {
            None
        }
    }

    /// Apply the outcome of a request.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket<K>,
        result: Result<T, ApiError>,
    ) -> Completion<K> {
        if ticket.id < self.epoch || ticket.key != self.key {
            return Completion::Discarded;
        }
        self.in_flight.remove(&ticket.id);

        if self.applied.is_some_and(|applied| ticket.id < applied) {
            return Completion::Discarded;
        }

        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                self.applied = Some(ticket.id);
                Completion::Applied
            }
            Err(err) if err.is_unauthorized() => Completion::Unauthorized,
            Err(err) if err.is_transient() && ticket.attempt < MAX_RETRIES => {
                Completion::Retry(self.issue(ticket.attempt + 1))
            }
            Err(err) => {
                self.error = Some(err);
                self.applied = Some(ticket.id);
                Completion::Failed
            }
        }
    }

    fn issue(&mut self, attempt: u8) -> FetchTicket<K> {
        let id = self.next_id;
        self.next_id += 1;
        self.in_flight.insert(id);
        FetchTicket {
            id,
            key: self.key.clone(),
            attempt,
        }
    }
}
