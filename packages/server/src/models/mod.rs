pub mod auth;
pub mod dataset;
pub mod file;
pub mod provider;
pub mod shared;
