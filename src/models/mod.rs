//! Domain models
//!
//! - `record`: raw and normalized biographical records
//! - `observation`: survival observations derived from records
//! - `types`: shared enums and value types

pub mod observation;
pub mod record;
pub mod types;

pub use observation::{RecordObservations, SurvivalObservation, UnknownReason};
pub use record::{BiographicalRecord, DeathContext, RawRecord, RecordField};
pub use types::{
    DatePrecision, DurationKind, EventStatus, HallOfFame, Handedness, IndexBoundary, LifeStatus,
    ResolvedDate,
};
