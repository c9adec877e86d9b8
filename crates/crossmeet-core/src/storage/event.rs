use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::RaceClock;
use crate::config::MeetConfig;
use crate::contest::{ContestDefinition, ContestRegistry, Intermediate};
use crate::error::Result;
use crate::registry::{CategoryInfo, CategoryTable};
use crate::rider::{RiderEntry, RiderTable};
use crate::state::RaceState;

/// Persisted event: riders, categories, clock, places and contest setup.
///
/// Derived fields (places per rider, bunch times, contest results) are not
/// stored; they are rebuilt by recalculation after loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventFile {
    pub title: String,
    pub config: MeetConfig,
    pub categories: BTreeMap<String, CategoryInfo>,
    pub clock: RaceClock,
    pub riders: Vec<RiderEntry>,
    pub places: String,
    pub contests: Vec<ContestDefinition>,
    pub intermediates: Vec<Intermediate>,
    pub comments: Vec<String>,
}

impl EventFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let event: Self = serde_json::from_str(&content)?;
        event.config.validate()?;
        info!(
            "Loaded event {:?} from {}: {} riders",
            event.title,
            path.display(),
            event.riders.len()
        );
        Ok(event)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        debug!("Saved event to {}", path.display());
        Ok(())
    }

    /// Split into the live race state and category registry.
    pub fn into_parts(self) -> (RaceState, CategoryTable, MeetConfig) {
        let mut state = RaceState::new(RiderTable::from_riders(self.riders), self.clock);
        state.places = self.places;
        state.contests = ContestRegistry::new(self.contests, self.intermediates);
        state.comments = self.comments;
        let categories = CategoryTable::from_map(self.categories.into_iter().collect());
        (state, categories, self.config)
    }

    /// Capture the persistent parts of a running meet.
    pub fn from_parts(
        title: &str,
        state: &RaceState,
        categories: &CategoryTable,
        config: &MeetConfig,
    ) -> Self {
        Self {
            title: title.to_string(),
            config: config.clone(),
            categories: categories.to_map().into_iter().collect(),
            clock: state.clock.clone(),
            riders: state.riders.as_slice().to_vec(),
            places: state.places.clone(),
            contests: state.contests.contests().to_vec(),
            intermediates: state.contests.intermediates().to_vec(),
            comments: state.comments.clone(),
        }
    }
}
