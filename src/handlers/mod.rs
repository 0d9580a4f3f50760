pub mod empty;
pub mod status;
