pub mod admin;
pub mod candidate;
pub mod job;

pub use admin::{Admin, AdminLookup, AdminPublic, NewAdmin};
pub use candidate::{Candidate, CandidateWithJobs, NewCandidate};
pub use job::{Job, JobInput, JobType};
