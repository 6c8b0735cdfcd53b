pub mod glacier;
pub mod log;
