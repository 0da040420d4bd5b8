pub mod calendar;
pub mod datetime;
pub mod knowledge;
pub mod nlu;
pub mod scheduling;
pub mod speech;
pub mod telephony;
