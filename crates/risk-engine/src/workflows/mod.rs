pub mod intake;
pub mod synthetic;
pub mod underwriting;
