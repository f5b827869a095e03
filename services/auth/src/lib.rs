//! Authentication service for the hotel booking backend
//!
//! Registers users, verifies credentials, and issues and validates the
//! signed session tokens that gate booking creation.

pub mod jwt;
pub mod manager;
pub mod models;
pub mod password;
pub mod repositories;
pub mod validation;

pub use jwt::{IssuedToken, JwtConfig, JwtService};
pub use manager::AuthManager;
pub use models::{Role, User, UserProfile};
