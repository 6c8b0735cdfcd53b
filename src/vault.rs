use std::collections::BTreeMap;

use tracing::{error, info, span, Level};

use crate::{
    adapters,
    error::VaultError,
    model::{
        glacier::{JobParameters, JobType},
        log::{CallLog, JobOutputResponse},
    },
    util,
};

/// Test double for a single archival vault. Drives the underlying client
/// and records what `initiate-job` and `get-job-output` returned.
pub struct VaultSimulator {
    vault_name: String,
    client: Box<dyn adapters::GlacierClient>,
    call_log: CallLog,
    inventory_job_id: String,
}

impl VaultSimulator {
    pub fn new(
        vault_name: &str,
        client: Box<dyn adapters::GlacierClient>,
    ) -> Result<Self, VaultError> {
        let span = span!(Level::INFO, "new", context = "new");
        let _e = span.enter();
        info!(vault_name = vault_name, "called");

        if let Err(err) = client.create_vault(vault_name) {
            error!(error_message=%err, error_group="create_vault");
            return Err(err.into());
        }

        Ok(Self {
            vault_name: vault_name.to_string(),
            client,
            call_log: CallLog::default(),
            inventory_job_id: String::new(),
        })
    }

    pub fn vault_name(&self) -> &str {
        &self.vault_name
    }

    /// Id of the most recently initiated inventory job, empty until one is.
    pub fn inventory_job_id(&self) -> &str {
        &self.inventory_job_id
    }

    pub fn call_log(&self) -> &CallLog {
        &self.call_log
    }

    pub fn initiate_job(&mut self, job_parameters: &JobParameters) -> Result<String, VaultError> {
        let span = span!(Level::INFO, "initiate_job", context = "initiate_job");
        let _e = span.enter();
        info!(vault_name=%self.vault_name, job_type=%job_parameters.job_type, "called");

        self.call_log.initiate_job_mut();

        let mut response = match self.client.initiate_job(&self.vault_name, job_parameters) {
            Err(err) => {
                error!(error_message=%err, error_group="initiate_job");
                return Err(err.into());
            }
            Ok(response) => response,
        };
        response.response_metadata.strip_http_headers();

        let mapping_key = match job_parameters.job_type {
            JobType::ArchiveRetrieval => {
                let archive_id = job_parameters
                    .archive_id
                    .as_deref()
                    .ok_or(VaultError::MissingField("ArchiveId"))?;
                format!("{}:{}", job_parameters.job_type, archive_id)
            }
            job_type => {
                if job_type.is_inventory() {
                    self.inventory_job_id = response.job_id.clone();
                }
                job_type.to_string()
            }
        };

        let job_id = response.job_id.clone();
        info!(job_id=%job_id, mapping_key=%mapping_key, "recorded");
        self.call_log.initiate_job_mut().record(mapping_key, response);

        Ok(job_id)
    }

    /// Not recorded in the call log.
    pub fn upload_archive(&self, body: &str, archive_description: &str) -> Result<String, VaultError> {
        let span = span!(Level::INFO, "upload_archive", context = "upload_archive");
        let _e = span.enter();
        info!(vault_name=%self.vault_name, size=body.len(), "called");

        let response = match self.client.upload_archive(
            &self.vault_name,
            body.as_bytes().to_vec(),
            archive_description,
        ) {
            Err(err) => {
                error!(error_message=%err, error_group="upload_archive");
                return Err(err.into());
            }
            Ok(response) => response,
        };

        Ok(response.archive_id)
    }

    /// Fetches a job's output. An empty `range` fetches the whole body, and the
    /// current inventory job's body is rendered as CSV. A `bytes=<start>-<end>`
    /// range keeps only that inclusive slice of the body.
    pub fn get_job_output(
        &mut self,
        job_id: &str,
        range: &str,
    ) -> Result<JobOutputResponse, VaultError> {
        let span = span!(Level::INFO, "get_job_output", context = "get_job_output");
        let _e = span.enter();
        info!(vault_name=%self.vault_name, job_id=job_id, range=range, "called");

        let byte_range = if range.is_empty() {
            None
        } else {
            Some(util::range::ByteRange::parse(range)?)
        };

        self.call_log.get_job_output_mut();

        let mut response = match self.client.get_job_output(
            &self.vault_name,
            job_id,
            byte_range.map(|_| range),
        ) {
            Err(err) => {
                error!(error_message=%err, error_group="get_job_output");
                return Err(err.into());
            }
            Ok(response) => response,
        };
        response.response_metadata.strip_http_headers();

        match byte_range {
            None => {
                let mut response = response.map_body(String::from_utf8)?;
                if !self.inventory_job_id.is_empty() && job_id == self.inventory_job_id {
                    response.body = util::inventory::json_inventory_to_csv(&response.body)?;
                }

                self.call_log
                    .get_job_output_mut()
                    .record_full(job_id, response.clone());
                Ok(response)
            }
            Some(byte_range) => {
                let response =
                    response.map_body(|body| String::from_utf8(byte_range.slice(&body).to_vec()))?;

                self.call_log
                    .get_job_output_mut()
                    .record_range(job_id, range, response.clone());
                Ok(response)
            }
        }
    }

    /// Snapshot of everything recorded so far, keyed by vault name.
    pub fn mock_data(&self) -> BTreeMap<String, CallLog> {
        BTreeMap::from([(self.vault_name.clone(), self.call_log.clone())])
    }
}
