//! Guided vehicle check-in

mod export;
mod steps;
mod submit;
mod wizard;

pub use export::*;
pub use steps::*;
pub use submit::*;
pub use wizard::*;
