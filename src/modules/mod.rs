//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the blob store for uploaded documents and the approval notifier.

pub mod notify;
pub mod storage;
