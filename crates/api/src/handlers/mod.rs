pub mod dashboard;
pub mod documents;
pub mod uploads;
