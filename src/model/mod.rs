//! Rows of the shop schema and the domain types built from them

mod checkin;
mod client;
mod session;

pub use checkin::*;
pub use client::*;
pub use session::*;
