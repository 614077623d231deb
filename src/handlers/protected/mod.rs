// handlers/protected/mod.rs - Admin handlers
//
// Every route here sits behind middleware::require_admin, which places an
// AuthAdmin in the request extensions.

pub mod candidates;
pub mod jobs;
