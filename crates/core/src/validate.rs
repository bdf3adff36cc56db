use std::sync::OnceLock;

use regex::Regex;

use crate::error::KuaiError;

/// Job names double as pod-name prefixes, which caps them well below the
/// usual 63-character label limit.
pub const JOB_NAME_MAX_LENGTH: usize = 49;

const JOB_NAME_PATTERN: &str = "^[a-z0-9]([-.a-z0-9]*[a-z0-9])?$";

fn job_name_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(JOB_NAME_PATTERN).expect("static job name pattern"))
}

/// Checks a job name against the DNS-label-style constraint: lowercase
/// alphanumeric, interior '-' or '.', alphanumeric at both ends, at most
/// [`JOB_NAME_MAX_LENGTH`] characters.
pub fn validate_job_name(name: &str) -> Result<(), KuaiError> {
    if name.is_empty() {
        return Err(KuaiError::Validation("--name must be set".to_string()));
    }
    if name.len() > JOB_NAME_MAX_LENGTH {
        return Err(KuaiError::Validation(format!(
            "the length {} of name {} is too long, it should not exceed {}",
            name.len(),
            name,
            JOB_NAME_MAX_LENGTH
        )));
    }
    if !job_name_regex().is_match(name) {
        return Err(KuaiError::Validation(
            "the job name must consist of lower case alphanumeric characters, '-' or '.', \
             and must start and end with an alphanumeric character"
                .to_string(),
        ));
    }
    Ok(())
}
