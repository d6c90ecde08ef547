//! kognita-setup library
//!
//! Core functionality for preparing a local KognitaCore development
//! environment: patching the shared scheme with a per-user database
//! variable and injecting the lint build phase into the project descriptor.

pub mod config;
pub mod xcode;
