//! Data models for the team points scoreboard.
//!
//! These models match the frontend TypeScript interfaces exactly for seamless interoperability.

mod datastore;
mod entry;
mod member;
mod task;

pub use datastore::*;
pub use entry::*;
pub use member::*;
pub use task::*;
