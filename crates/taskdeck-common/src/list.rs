//! Canonical decoding for the backend's collection envelopes.
//!
//! List endpoints are inconsistent about their top-level shape: some return
//! a bare JSON array, others wrap it as `{"results": [...]}`, `{"tasks":
//! [...]}` or `{"users": [...]}`. The variation is a backend quirk to
//! defend against at the boundary, not a shape to propagate — everything
//! downstream works with a plain `Vec<T>`.

use serde::Deserialize;

/// Any of the collection shapes the backend is known to produce.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Bare(Vec<T>),
    Results { results: Vec<T> },
    Tasks { tasks: Vec<T> },
    Users { users: Vec<T> },
}

impl<T> ListPayload<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListPayload::Bare(items)
            | ListPayload::Results { results: items }
            | ListPayload::Tasks { tasks: items }
            | ListPayload::Users { users: items } => items,
        }
    }
}
