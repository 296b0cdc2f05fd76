// wikivault-common: shared types and utilities for the wikivault workspace

pub mod error;
pub mod event;
pub mod step;
pub mod types;
