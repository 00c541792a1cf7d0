//! Specflow Roles
//!
//! This crate provides the role catalog for specflow. A role is a named
//! responsibility in the document pipeline (requirements, design, coding, ...).
//! Each role declares the upstream roles whose output it builds on.
//!
//! The catalog is an explicit value handed to the planner. There is no
//! process-wide registry: callers build [`RoleCatalog::builtin`] once, or a
//! custom table via [`RoleCatalog::from_descriptors`] for tests.

mod catalog;
mod error;
mod role;

pub use catalog::RoleCatalog;
pub use error::RoleError;
pub use role::{RoleDescriptor, RoleId};
