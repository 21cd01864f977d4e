//! Accounts and authentication.
//!
//! Owns the identity store (accounts), password hashing, bearer token
//! issuing/verification and the staff account seeded at startup.

pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod seed;
pub mod services;

pub use repositories::{AccountRepository, PgAccountRepository};
pub use services::{AuthService, PasswordHasher, TokenService};
