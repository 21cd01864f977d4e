//! Staff review of student profiles: listing, detail and approval decisions.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::AdminService;
