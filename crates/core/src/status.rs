use crate::tfjob::TFJob;

/// Shown when the controller has not reported any condition yet, or when the
/// status is missing entirely.
pub const UNKNOWN_STATE: &str = "Unknown";

/// Derives the one-line display state from a job's status: conditions are
/// appended in chronological order, so the last entry's type is the current
/// state.
pub fn display_state(job: &TFJob) -> String {
    job.status
        .as_ref()
        .and_then(|status| status.conditions.last())
        .map(|condition| condition.type_.clone())
        .unwrap_or_else(|| UNKNOWN_STATE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tfjob::{JobCondition, TFJobSpec, TFJobStatus};
    use std::collections::BTreeMap;

    fn job_with_conditions(types: &[&str]) -> TFJob {
        let mut job = TFJob::new("job-a", TFJobSpec { tf_replica_specs: BTreeMap::new() });
        job.status = Some(TFJobStatus {
            conditions: types
                .iter()
                .map(|t| JobCondition {
                    type_: t.to_string(),
                    status: "True".to_string(),
                    reason: None,
                    message: None,
                    last_transition_time: None,
                })
                .collect(),
        });
        job
    }

    #[test]
    fn last_condition_wins() {
        let job = job_with_conditions(&["Created", "Running", "Succeeded"]);
        assert_eq!(display_state(&job), "Succeeded");
    }

    #[test]
    fn empty_conditions_report_unknown() {
        let job = job_with_conditions(&[]);
        assert_eq!(display_state(&job), UNKNOWN_STATE);
    }

    #[test]
    fn missing_status_reports_unknown() {
        let job = TFJob::new("job-a", TFJobSpec { tf_replica_specs: BTreeMap::new() });
        assert_eq!(display_state(&job), UNKNOWN_STATE);
    }
}
