// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Job browsing, candidate applications and admin token acquisition.

pub mod auth;
pub mod candidates;
pub mod jobs;
