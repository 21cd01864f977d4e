//! Student profiles and their documents.
//!
//! A profile belongs to exactly one account. All changes run through the
//! approval workflow in [`workflow`]; uploaded files live in the blob store
//! and the profile only keeps their references.

pub mod documents;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod workflow;

pub use repositories::{PgProfileRepository, ProfileRepository};
pub use services::{DocumentService, ProfileService};
