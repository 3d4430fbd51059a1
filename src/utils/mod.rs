pub mod datetime;
pub mod time;
