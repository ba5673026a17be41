pub mod payload;
pub mod reading;
pub mod station;
