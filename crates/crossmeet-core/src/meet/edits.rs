//! Officiating edits: statuses, manual times, bonuses and the rider list.

use chrono::TimeDelta;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::places::validate;
use crate::rider::RiderEntry;

use super::Meet;

impl Meet {
    /// Apply a status code to several riders at once.
    ///
    /// All bibs must exist; nothing changes otherwise. Takes an undo point.
    pub fn set_status(&self, bibs: &[&str], code: &str) -> Result<usize> {
        let mut state = self.lock_state();
        if let Some(missing) = bibs.iter().find(|b| !state.riders.contains(b)) {
            return Err(Error::UnknownRider(missing.to_string()));
        }
        self.store_checkpoint(state.checkpoint());

        for bib in bibs {
            if let Some(rider) = state.riders.get_mut(bib) {
                rider.set_status(code);
            }
        }
        info!("Status {:?} applied to {} riders", code, bibs.len());
        self.mark_dirty();
        Ok(bibs.len())
    }

    /// Put withdrawn riders back in the race, clearing their status.
    ///
    /// All bibs must exist; nothing changes otherwise. Takes an undo point.
    pub fn return_to_race(&self, bibs: &[&str]) -> Result<usize> {
        let mut state = self.lock_state();
        if let Some(missing) = bibs.iter().find(|b| !state.riders.contains(b)) {
            return Err(Error::UnknownRider(missing.to_string()));
        }
        self.store_checkpoint(state.checkpoint());

        for bib in bibs {
            if let Some(rider) = state.riders.get_mut(bib) {
                rider.comment.clear();
                rider.in_race = true;
                info!("Rider {} returned to race", bib);
            }
        }
        self.mark_dirty();
        Ok(bibs.len())
    }

    /// Record a commissaires' decision. Blank text is ignored.
    pub fn add_comment(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.lock_state().comments.push(text.to_string());
        info!("Added race comment: {:?}", text);
        self.mark_dirty();
        true
    }

    /// Override or clear a rider's bunch time.
    pub fn set_manual_bunch(&self, bib: &str, bunch: Option<TimeDelta>) -> Result<()> {
        self.edit_rider(bib, |rider| rider.manual_bunch = bunch)
    }

    pub fn set_start_offset(&self, bib: &str, offset: Option<TimeDelta>) -> Result<()> {
        self.edit_rider(bib, |rider| rider.start_offset = offset)
    }

    pub fn set_bonus(&self, bib: &str, bonus: Option<TimeDelta>) -> Result<()> {
        self.edit_rider(bib, |rider| rider.bonus = bonus)
    }

    pub fn set_penalty(&self, bib: &str, penalty: Option<TimeDelta>) -> Result<()> {
        self.edit_rider(bib, |rider| rider.penalty = penalty)
    }

    fn edit_rider<F>(&self, bib: &str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut RiderEntry),
    {
        let mut state = self.lock_state();
        let rider = state
            .riders
            .get_mut(bib)
            .ok_or_else(|| Error::UnknownRider(bib.to_string()))?;
        edit(rider);
        debug!("Edited rider {}", bib);
        self.mark_dirty();
        Ok(())
    }

    pub fn add_rider(&self, rider: RiderEntry) -> Result<()> {
        let bib = rider.bib.clone();
        self.lock_state().riders.add(rider)?;
        info!("Added rider {}", bib);
        self.mark_dirty();
        Ok(())
    }

    /// Remove a rider. Takes an undo point.
    pub fn remove_rider(&self, bib: &str) -> Result<RiderEntry> {
        let mut state = self.lock_state();
        if !state.riders.contains(bib) {
            return Err(Error::UnknownRider(bib.to_string()));
        }
        self.store_checkpoint(state.checkpoint());
        let rider = state
            .riders
            .remove(bib)
            .ok_or_else(|| Error::UnknownRider(bib.to_string()))?;
        info!("Removed rider {}", bib);
        self.mark_dirty();
        Ok(rider)
    }

    /// Record places for an intermediate sprint or climb.
    ///
    /// Riders withdrawn after the intermediate may still be listed.
    pub fn set_intermediate_places(&self, id: &str, places: &str) -> Result<()> {
        let mut state = self.lock_state();
        let violations = validate(places, &state.riders, false);
        if !violations.is_empty() {
            return Err(Error::PlacesRejected { violations });
        }
        state.contests.set_intermediate_places(id, places);
        debug!("Intermediate {} places: {}", id, places);
        self.mark_dirty();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{started, tod};
    use super::*;

    use crate::contest::{ContestDefinition, ContestSource};
    use crate::rider::RiderStatus;

    #[test]
    fn test_mass_status_is_all_or_nothing() {
        let meet = started(&["1", "2", "3"]);
        let err = meet.set_status(&["1", "99"], "dnf").unwrap_err();
        assert!(matches!(err, Error::UnknownRider(ref b) if b == "99"));
        meet.tick();
        assert!(meet.snapshot().rider("1").unwrap().in_race);

        assert_eq!(meet.set_status(&["1", "2"], "DNF").unwrap(), 2);
        meet.tick();
        let snap = meet.snapshot();
        assert_eq!(snap.rider("2").unwrap().status(), Some(RiderStatus::Dnf));
        assert_eq!(snap.riders[0].bib, "3");

        assert!(meet.undo());
        meet.tick();
        assert!(meet.snapshot().rider("1").unwrap().in_race);
    }

    #[test]
    fn test_manual_bunch_and_penalty() {
        let meet = started(&["1", "2"]);
        meet.on_passing("1", tod(8, 0));
        meet.on_passing("2", tod(8, 1));
        meet.set_manual_bunch("2", Some(TimeDelta::seconds(470)))
            .unwrap();
        meet.set_penalty("1", Some(TimeDelta::seconds(20))).unwrap();
        meet.tick();

        let snap = meet.snapshot();
        assert_eq!(snap.rider("2").unwrap().bunch, Some(TimeDelta::seconds(470)));
        assert_eq!(snap.rider("1").unwrap().penalty, Some(TimeDelta::seconds(20)));
        assert!(meet.set_bonus("404", None).is_err());
    }

    #[test]
    fn test_add_and_remove_rider() {
        let meet = started(&["1"]);
        meet.add_rider(RiderEntry::new("7", "Late Entry", "ELITE"))
            .unwrap();
        assert!(matches!(
            meet.add_rider(RiderEntry::new("7", "", "")),
            Err(Error::DuplicateRider(_))
        ));

        let removed = meet.remove_rider("1").unwrap();
        assert_eq!(removed.bib, "1");
        meet.tick();
        assert_eq!(meet.snapshot().riders.len(), 1);

        assert!(meet.undo());
        meet.tick();
        assert_eq!(meet.snapshot().riders.len(), 2);
    }

    #[test]
    fn test_intermediate_places_feed_tally() {
        let meet = started(&["1", "2", "3"]);
        {
            let mut state = meet.lock_state();
            let mut sprint =
                ContestDefinition::new("lap 2 prime", ContestSource::Intermediate("s1".into()));
            sprint.tally = Some("primes".into());
            sprint.points = vec![5, 3];
            state.contests = crate::contest::ContestRegistry::new(vec![sprint], Vec::new());
        }
        assert!(meet.set_intermediate_places("s1", "3 9").is_err());
        meet.set_intermediate_places("s1", "3 1").unwrap();
        meet.tick();

        let standings = meet.standings("primes").unwrap();
        assert_eq!(standings[0].bib, "3");
        assert_eq!(standings[0].points, 5);
        assert_eq!(standings[1].points, 3);
        assert_eq!(meet.tallies(), ["primes"]);
    }

    #[test]
    fn test_return_to_race_restores_place() {
        let meet = started(&["1", "2", "3"]);
        meet.set_places("1 2 3").unwrap();
        meet.set_status(&["2"], "dnf").unwrap();
        meet.tick();
        let snap = meet.snapshot();
        assert_eq!(snap.rider("3").unwrap().place, "2");
        let ranks: Vec<_> = crate::export::result_records(&snap)
            .map(|r| (r.bib, r.rank))
            .collect();
        assert_eq!(
            ranks,
            [
                ("1".to_string(), Some(1)),
                ("3".to_string(), Some(2)),
                ("2".to_string(), None)
            ]
        );

        assert!(meet.return_to_race(&["2", "404"]).is_err());
        assert_eq!(meet.return_to_race(&["2"]).unwrap(), 1);
        meet.tick();
        let snap = meet.snapshot();
        assert!(snap.rider("2").unwrap().comment.is_empty());
        assert_eq!(snap.rider("2").unwrap().place, "2");
        assert_eq!(snap.rider("3").unwrap().place, "3");

        assert!(meet.undo());
        meet.tick();
        assert!(!meet.snapshot().rider("2").unwrap().in_race);
    }

    #[test]
    fn test_comments_kept_in_order() {
        let meet = started(&["1"]);
        assert!(!meet.add_comment("   "));
        assert!(meet.add_comment(" Bib 1 relegated for dangerous riding "));
        assert!(meet.add_comment("Lap 3 shortened by the commissaire"));
        meet.tick();
        assert_eq!(
            meet.snapshot().comments,
            [
                "Bib 1 relegated for dangerous riding",
                "Lap 3 shortened by the commissaire"
            ]
        );
        assert_eq!(meet.to_event_file().comments.len(), 2);
    }
}
