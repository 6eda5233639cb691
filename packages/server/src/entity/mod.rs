pub mod dataset;
pub mod file;
pub mod provider;
pub mod user;
