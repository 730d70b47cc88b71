mod audit;
mod export;
mod ics;
mod range;
mod source;
mod structs;
mod transform;

pub use audit::AuditLog;
pub use export::{ExportError, ExportReport, Exporter, DEFAULT_PAUSE};
pub use crate::ics::{reader_compat, TIMEZONE};
pub use range::{DateRange, Week, WeekRange};
pub use source::{decode_payload, is_confirmed, AgendaSource, MygesCli, SourceError, CONFIRMATION_MARKER};
pub use structs::{Calendar, CalendarEvent, Category, Discipline, RawRecord, Room, Status};
pub use transform::{
    campus_address, clean_text, transform, TransformError, ADDRESS_UNKNOWN, NOT_SPECIFIED, UNKNOWN,
};
