use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::warn;

use super::RiderEntry;
use crate::error::{Error, Result};

/// Ordered rider collection keyed by bib.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiderTable {
    riders: Vec<RiderEntry>,
    index: HashMap<String, usize>,
}

impl RiderTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_riders(riders: impl IntoIterator<Item = RiderEntry>) -> Self {
        let mut table = Self::new();
        for rider in riders {
            if let Err(e) = table.add(rider) {
                warn!("Skipping rider: {}", e);
            }
        }
        table
    }

    pub fn len(&self) -> usize {
        self.riders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.riders.is_empty()
    }

    pub fn contains(&self, bib: &str) -> bool {
        self.index.contains_key(bib)
    }

    pub fn position(&self, bib: &str) -> Option<usize> {
        self.index.get(bib).copied()
    }

    pub fn get(&self, bib: &str) -> Option<&RiderEntry> {
        self.position(bib).map(|i| &self.riders[i])
    }

    pub fn get_mut(&mut self, bib: &str) -> Option<&mut RiderEntry> {
        let i = self.position(bib)?;
        Some(&mut self.riders[i])
    }

    /// Append a rider; bibs are unique.
    pub fn add(&mut self, rider: RiderEntry) -> Result<()> {
        if self.index.contains_key(&rider.bib) {
            return Err(Error::DuplicateRider(rider.bib));
        }
        self.index.insert(rider.bib.clone(), self.riders.len());
        self.riders.push(rider);
        Ok(())
    }

    pub fn remove(&mut self, bib: &str) -> Option<RiderEntry> {
        let pos = self.index.remove(bib)?;
        let rider = self.riders.remove(pos);
        self.rebuild_index();
        Some(rider)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RiderEntry> {
        self.riders.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RiderEntry> {
        self.riders.iter_mut()
    }

    pub fn as_slice(&self) -> &[RiderEntry] {
        &self.riders
    }

    pub fn bibs(&self) -> Vec<String> {
        self.riders.iter().map(|r| r.bib.clone()).collect()
    }

    /// Reorder so that new position `i` holds the rider previously at `permutation[i]`.
    ///
    /// A slice that is not a permutation of `0..len` leaves the table untouched.
    pub fn reorder(&mut self, permutation: &[usize]) -> bool {
        let n = self.riders.len();
        let mut seen = vec![false; n];
        if permutation.len() != n
            || permutation
                .iter()
                .any(|&i| i >= n || std::mem::replace(&mut seen[i], true))
        {
            warn!("Ignoring invalid reorder of {} riders", n);
            return false;
        }

        let mut slots: Vec<Option<RiderEntry>> = self.riders.drain(..).map(Some).collect();
        self.riders = permutation
            .iter()
            .filter_map(|&i| slots[i].take())
            .collect();
        self.rebuild_index();
        true
    }

    /// Stable sort through `reorder`.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&RiderEntry, &RiderEntry) -> Ordering,
    {
        let mut permutation: Vec<usize> = (0..self.riders.len()).collect();
        permutation.sort_by(|&a, &b| compare(&self.riders[a], &self.riders[b]));
        self.reorder(&permutation);
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .riders
            .iter()
            .enumerate()
            .map(|(i, r)| (r.bib.clone(), i))
            .collect();
    }
}
