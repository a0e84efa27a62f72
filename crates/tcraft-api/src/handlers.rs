//! Request handlers.

pub mod credits;
pub mod generations;
pub mod health;

pub use credits::*;
pub use generations::*;
pub use health::*;
