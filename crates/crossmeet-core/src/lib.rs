pub mod announce;
pub mod clock;
pub mod config;
pub mod contest;
pub mod decoder;
pub mod error;
pub mod export;
pub mod meet;
pub mod passing;
pub mod places;
pub mod recalc;
pub mod registry;
pub mod rider;
pub mod state;
pub mod storage;
pub mod time;

pub use announce::{Announcer, LogAnnouncer, NullAnnouncer};
pub use clock::{ClockState, RaceClock};
pub use config::MeetConfig;
pub use contest::{
    ContestDefinition, ContestRegistry, ContestResults, ContestSource, Intermediate,
    TallyStanding,
};
pub use decoder::DecoderEvent;
pub use error::{Error, Result};
pub use export::{ResultLine, ResultRecord, StartlistEntry};
pub use meet::Meet;
pub use passing::{PassingOutcome, PassingProcessor};
pub use places::{PlacesViolation, RankedPlaces};
pub use recalc::{RecalcOutcome, RecalculateEngine};
pub use registry::{CategoryInfo, CategoryRegistry, CategoryTable};
pub use rider::{RiderEntry, RiderStatus, RiderTable};
pub use state::{RaceSnapshot, RaceState, RaceStatus};
pub use storage::EventFile;
