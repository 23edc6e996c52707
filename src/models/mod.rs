//! Data models for the build planner.
//!
//! These models match the frontend TypeScript interfaces exactly for seamless
//! interoperability with the existing web client.

mod build;
mod gear;
mod user;

pub use build::*;
pub use gear::*;
pub use user::*;
