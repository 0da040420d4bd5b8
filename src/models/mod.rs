pub mod availability;
pub mod booking;
pub mod intent;
pub mod knowledge;
pub mod patterns;

pub use availability::OpeningWindow;
pub use booking::{Appointment, AppointmentRequest, AppointmentStatus};
pub use intent::{Entity, EntityKind, Intent, IntentKind, Language, LanguageHint};
pub use knowledge::{
    Catalog, DayKey, KnowledgeBase, Location, Parking, ParkingOption, PublicTransport, Schedule,
    ServiceCategory, ServiceVariant, TransitLine,
};
pub use patterns::{IntentDefinition, IntentsFile, PatternTable};
