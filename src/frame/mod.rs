pub mod error;
pub mod humidity_frame;
