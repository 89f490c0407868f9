pub mod enums;
pub mod doctor;
pub mod patient;
pub mod visit;

pub use enums::*;
pub use doctor::*;
pub use patient::*;
pub use visit::*;
