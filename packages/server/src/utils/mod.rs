pub mod content_type;
pub mod filename;
pub mod hash;
pub mod jwt;
