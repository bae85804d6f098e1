pub mod event;

pub use event::{
    instance_id, parse_iso_date, EventInstance, EventTemplate, EventType, Frequency,
    ParseEnumError, RecurrenceRule,
};
