pub mod auth_service;
pub mod enrollment_service;
pub mod job_service;

pub use auth_service::{provision_admin, AuthError, AuthService, LoginCredentials, LoginOutcome};
pub use enrollment_service::{EnrollmentError, EnrollmentService};
pub use job_service::{JobError, JobService};
