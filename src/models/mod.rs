pub mod appointment;
pub mod enums;
pub mod patient;
pub mod principal;

pub use appointment::*;
pub use patient::*;
pub use principal::*;
