use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::glacier::{InitiateJobOutput, JobOutput};

pub type JobOutputResponse = JobOutput<String>;

/// Recorded `initiate-job` responses, keyed by `Type` or `Type:ArchiveId`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InitiateJobLog(pub BTreeMap<String, InitiateJobOutput>);

impl InitiateJobLog {
    pub fn record(&mut self, key: String, response: InitiateJobOutput) {
        self.0.insert(key, response);
    }

    pub fn get(&self, key: &str) -> Option<&InitiateJobOutput> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobOutputRecord {
    Full(JobOutputResponse),
    Ranged(BTreeMap<String, JobOutputResponse>),
}

/// Recorded `get-job-output` responses, keyed by job id. Full-body and
/// ranged fetches of one job never share an entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GetJobOutputLog(pub BTreeMap<String, JobOutputRecord>);

impl GetJobOutputLog {
    pub fn record_full(&mut self, job_id: &str, response: JobOutputResponse) {
        self.0
            .insert(job_id.to_string(), JobOutputRecord::Full(response));
    }

    pub fn record_range(&mut self, job_id: &str, range: &str, response: JobOutputResponse) {
        let record = self
            .0
            .entry(job_id.to_string())
            .or_insert_with(|| JobOutputRecord::Ranged(BTreeMap::new()));

        if matches!(*record, JobOutputRecord::Full(_)) {
            *record = JobOutputRecord::Ranged(BTreeMap::new());
        }

        if let JobOutputRecord::Ranged(ranges) = record {
            ranges.insert(range.to_string(), response);
        }
    }

    pub fn full(&self, job_id: &str) -> Option<&JobOutputResponse> {
        match self.0.get(job_id) {
            Some(JobOutputRecord::Full(response)) => Some(response),
            _ => None,
        }
    }

    pub fn ranges(&self, job_id: &str) -> Option<&BTreeMap<String, JobOutputResponse>> {
        match self.0.get(job_id) {
            Some(JobOutputRecord::Ranged(ranges)) => Some(ranges),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything a simulator recorded for its vault. Sections appear once the
/// matching operation has been called.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CallLog {
    #[serde(rename = "initiate-job", skip_serializing_if = "Option::is_none")]
    pub initiate_job: Option<InitiateJobLog>,
    #[serde(rename = "get-job-output", skip_serializing_if = "Option::is_none")]
    pub get_job_output: Option<GetJobOutputLog>,
}

impl CallLog {
    pub fn initiate_job_mut(&mut self) -> &mut InitiateJobLog {
        self.initiate_job.get_or_insert_with(InitiateJobLog::default)
    }

    pub fn get_job_output_mut(&mut self) -> &mut GetJobOutputLog {
        self.get_job_output
            .get_or_insert_with(GetJobOutputLog::default)
    }
}
