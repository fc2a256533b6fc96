use std::collections::HashMap;

use crate::parcel::{Coordinates, Destination, TravelTime};

/// Memoized lookup results for one batch run, keyed by formatted origin and
/// destination. Entries never expire within a run.
#[derive(Debug, Default)]
pub struct LookupCache {
    entries: HashMap<(String, Destination), TravelTime>,
    hits: usize,
    misses: usize,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(origin: &Coordinates, destination: Destination) -> (String, Destination) {
        (origin.cache_key(), destination)
    }

    pub fn get(&mut self, origin: &Coordinates, destination: Destination) -> Option<TravelTime> {
        let found = self.entries.get(&Self::key(origin, destination)).cloned();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    pub fn insert(&mut self, origin: &Coordinates, destination: Destination, time: TravelTime) {
        self.entries.insert(Self::key(origin, destination), time);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
