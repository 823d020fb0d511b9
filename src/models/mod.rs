pub mod booking;
pub mod branding;
pub mod catalog;
pub mod conversation;
pub mod event;
pub mod message;

pub use booking::{BookingDraft, BookingRecord, BookingSummary, TicketFile};
pub use branding::Branding;
pub use catalog::{Exhibition, ExhibitionCatalog};
pub use conversation::{ConversationState, Step};
pub use event::ChatEvent;
pub use message::{format_time, ClockFormat, Message, Reply, Sender};
