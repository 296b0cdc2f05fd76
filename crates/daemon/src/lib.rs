// wikivault-daemon library entry point (embedded in the desktop shell).

pub mod auth;
pub mod config;
pub mod dialog;
pub mod git;
pub mod net;
pub mod settings;
