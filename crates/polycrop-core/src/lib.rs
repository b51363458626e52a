//! Shared types for the polycrop workspace: geometry, options, errors.

pub mod error;
pub mod geometry;
pub mod options;
