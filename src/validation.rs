//! Field-level checks applied to request bodies before any domain logic runs.
//!
//! Request types keep every field optional so that a missing field is reported next to
//! the others instead of failing deserialization as a whole.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;

use crate::database::models::{AdminLookup, JobInput, JobType, NewCandidate};
use crate::services::LoginCredentials;

pub type FieldErrors = HashMap<String, String>;

const REQUIRED: &str = "This field is required";

#[derive(Debug, Default, Deserialize)]
pub struct JobRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default, rename = "type")]
    pub job_type: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobRef {
    pub id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub resume: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub job_id: Option<i64>,
    /// Legacy shape: `"jobs": [{"id": 1}]`; only the first entry is used.
    #[serde(default)]
    pub jobs: Option<Vec<JobRef>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Compiled once at startup and shared through the application state.
#[derive(Debug, Clone)]
pub struct Validator {
    email: Regex,
    phone: Regex,
}

impl Validator {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            email: Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")?,
            phone: Regex::new(r"^\(\d{2}\)\s\d{5}-\d{4}$")?,
        })
    }

    /// `not_before` is the instant the deadline must be later than: now for a new job,
    /// the job's creation time for an update.
    pub fn job(
        &self,
        request: JobRequest,
        not_before: DateTime<Utc>,
    ) -> Result<JobInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = text(&mut errors, "title", request.title, 3, Some(100));
        let description = text(&mut errors, "description", request.description, 10, None);
        let company = text(&mut errors, "company", request.company, 2, Some(100));
        let location = text(&mut errors, "location", request.location, 3, Some(100));
        let salary = text(&mut errors, "salary", request.salary, 1, None);
        let requirements = text(&mut errors, "requirements", request.requirements, 10, None);

        let job_type = match request.job_type.as_deref().map(str::trim) {
            None | Some("") => {
                errors.insert("type".into(), REQUIRED.into());
                None
            }
            Some(raw) => {
                let parsed = JobType::parse(raw);
                if parsed.is_none() {
                    let allowed: Vec<&str> = JobType::ALL.iter().map(|t| t.as_str()).collect();
                    errors.insert("type".into(), format!("Must be one of: {}", allowed.join(", ")));
                }
                parsed
            }
        };

        let deadline = match request.deadline.as_deref().map(str::trim) {
            None | Some("") => {
                errors.insert("deadline".into(), REQUIRED.into());
                None
            }
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(parsed) => {
                    let parsed = parsed.with_timezone(&Utc);
                    if parsed <= not_before {
                        errors.insert(
                            "deadline".into(),
                            "Deadline must be after the job's creation time".into(),
                        );
                        None
                    } else {
                        Some(parsed)
                    }
                }
                Err(_) => {
                    errors.insert("deadline".into(), "Expected an RFC 3339 timestamp".into());
                    None
                }
            },
        };

        match (title, description, company, location, salary, job_type, requirements, deadline) {
            (
                Some(title),
                Some(description),
                Some(company),
                Some(location),
                Some(salary),
                Some(job_type),
                Some(requirements),
                Some(deadline),
            ) if errors.is_empty() => Ok(JobInput {
                title,
                description,
                company,
                location,
                salary,
                job_type,
                requirements,
                deadline,
                active: request.active.unwrap_or(true),
            }),
            _ => Err(errors),
        }
    }

    /// Returns the applicant and the id of the job being applied to. The email comes back
    /// trimmed and lower-cased so it can key the one-application-per-job rule.
    pub fn candidate(&self, request: CandidateRequest) -> Result<(NewCandidate, i64), FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = text(&mut errors, "name", request.name, 3, Some(100));
        let email = match request.email.map(|e| e.trim().to_lowercase()) {
            None => {
                errors.insert("email".into(), REQUIRED.into());
                None
            }
            Some(email) if email.is_empty() => {
                errors.insert("email".into(), REQUIRED.into());
                None
            }
            Some(email) if !self.email.is_match(&email) => {
                errors.insert("email".into(), "Invalid email".into());
                None
            }
            Some(email) => Some(email),
        };
        let phone = match request.phone.map(|p| p.trim().to_string()) {
            None => {
                errors.insert("phone".into(), REQUIRED.into());
                None
            }
            Some(phone) if phone.is_empty() => {
                errors.insert("phone".into(), REQUIRED.into());
                None
            }
            Some(phone) if !self.phone.is_match(&phone) => {
                errors.insert(
                    "phone".into(),
                    "Invalid phone. Use the format (99) 99999-9999".into(),
                );
                None
            }
            Some(phone) => Some(phone),
        };
        let resume = text(&mut errors, "resume", request.resume, 10, None);
        let experience = text(&mut errors, "experience", request.experience, 10, None);
        let education = text(&mut errors, "education", request.education, 10, None);

        let job_id = request
            .job_id
            .or_else(|| request.jobs.as_ref().and_then(|jobs| jobs.first()).map(|j| j.id));
        let job_id = match job_id {
            None => {
                errors.insert("job_id".into(), REQUIRED.into());
                None
            }
            Some(id) if id <= 0 => {
                errors.insert("job_id".into(), "Must be a positive job id".into());
                None
            }
            Some(id) => Some(id),
        };

        match (name, email, phone, resume, experience, education, job_id) {
            (
                Some(name),
                Some(email),
                Some(phone),
                Some(resume),
                Some(experience),
                Some(education),
                Some(job_id),
            ) if errors.is_empty() => Ok((
                NewCandidate {
                    name,
                    email,
                    phone,
                    resume,
                    experience,
                    education,
                },
                job_id,
            )),
            _ => Err(errors),
        }
    }

    /// Exactly one of `username` / `email` must be given, so a login can only ever match
    /// a single column.
    pub fn login(&self, request: LoginRequest) -> Result<LoginCredentials, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = request.username.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
        let email = request
            .email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());

        let identifier = match (username, email) {
            (Some(username), None) => Some(AdminLookup::Username(username)),
            (None, Some(email)) => Some(AdminLookup::Email(email)),
            (Some(_), Some(_)) => {
                let message = "Provide either username or email, not both";
                errors.insert("username".into(), message.into());
                errors.insert("email".into(), message.into());
                None
            }
            (None, None) => {
                let message = "Provide a username or an email";
                errors.insert("username".into(), message.into());
                errors.insert("email".into(), message.into());
                None
            }
        };

        let password = match request.password {
            None => {
                errors.insert("password".into(), REQUIRED.into());
                None
            }
            Some(p) if p.chars().count() < 6 => {
                errors.insert("password".into(), "Value too short (minimum 6)".into());
                None
            }
            Some(p) => Some(p),
        };

        match (identifier, password) {
            (Some(identifier), Some(password)) if errors.is_empty() => Ok(LoginCredentials {
                identifier,
                password,
            }),
            _ => Err(errors),
        }
    }
}

/// Trimmed text with a character-count range; records an error and yields `None` otherwise.
fn text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    min: usize,
    max: Option<usize>,
) -> Option<String> {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    let len = value.chars().count();

    if len == 0 {
        errors.insert(field.into(), REQUIRED.into());
        return None;
    }
    if len < min {
        errors.insert(field.into(), format!("Value too short (minimum {})", min));
        return None;
    }
    if let Some(max) = max {
        if len > max {
            errors.insert(field.into(), format!("Value too long (maximum {})", max));
            return None;
        }
    }
    Some(value)
}
