use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, MutexGuard},
};

use serde_json::json;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{
    adapters,
    model::glacier::{
        CreateVaultOutput, GlacierError, InitiateJobOutput, JobOutput, JobParameters, JobType,
        ResponseMetadata, UploadArchiveOutput, ERR_INVALID_PARAMETER, ERR_MISSING_PARAMETER,
        ERR_RESOURCE_NOT_FOUND,
    },
    util,
};

pub const DEFAULT_ACCOUNT_ID: &str = "123456789012";
pub const DEFAULT_REGION: &str = "us-east-1";

const INVENTORY_CONTENT_TYPE: &str = "application/json";
const ARCHIVE_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Clone, Debug)]
struct MockArchive {
    id: String,
    description: String,
    creation_date: String,
    size: usize,
    tree_hash: String,
    body: Vec<u8>,
}

#[derive(Clone, Debug)]
struct MockJob {
    output: Vec<u8>,
    content_type: &'static str,
    checksum: Option<String>,
    archive_description: Option<String>,
}

#[derive(Debug, Default)]
struct MockVault {
    archives: Vec<MockArchive>,
    jobs: HashMap<String, MockJob>,
}

/// In-memory archival service. Jobs complete immediately and their output
/// is captured when they are initiated.
#[derive(Debug)]
pub struct MockGlacierClient {
    account_id: String,
    region: String,
    vaults: Mutex<HashMap<String, MockVault>>,
}

impl Default for MockGlacierClient {
    fn default() -> Self {
        Self::new(DEFAULT_ACCOUNT_ID, DEFAULT_REGION)
    }
}

impl MockGlacierClient {
    pub fn new(account_id: &str, region: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            region: region.to_string(),
            vaults: Mutex::new(HashMap::new()),
        }
    }

    fn lock_vaults(&self) -> Result<MutexGuard<'_, HashMap<String, MockVault>>, GlacierError> {
        self.vaults.lock().map_err(|err| GlacierError {
            code: None,
            message: format!("failed to acquire `vaults` guard, {}", err),
        })
    }

    fn vault_location(&self, vault_name: &str) -> String {
        format!("/{}/vaults/{}", self.account_id, vault_name)
    }

    fn vault_arn(&self, vault_name: &str) -> String {
        format!(
            "arn:aws:glacier:{}:{}:vaults/{}",
            self.region, self.account_id, vault_name
        )
    }

    fn metadata(&self, http_status_code: u16, content_type: &str) -> ResponseMetadata {
        let request_id = Uuid::new_v4().simple().to_string();
        let mut metadata = ResponseMetadata::new(&request_id, http_status_code);
        metadata.http_headers = Some(BTreeMap::from([
            ("content-type".to_string(), content_type.to_string()),
            ("date".to_string(), now().unwrap_or_default()),
            ("x-amzn-requestid".to_string(), request_id),
        ]));

        metadata
    }

    fn inventory_output(&self, vault_name: &str, vault: &MockVault) -> Result<Vec<u8>, GlacierError> {
        let archive_list: Vec<_> = vault
            .archives
            .iter()
            .map(|archive| {
                json!({
                    "ArchiveId": archive.id,
                    "ArchiveDescription": archive.description,
                    "CreationDate": archive.creation_date,
                    "Size": archive.size,
                    "SHA256TreeHash": archive.tree_hash,
                })
            })
            .collect();

        let inventory = json!({
            "VaultARN": self.vault_arn(vault_name),
            "InventoryDate": now()?,
            "ArchiveList": archive_list,
        });

        serde_json::to_vec(&inventory).map_err(|err| GlacierError {
            code: None,
            message: format!("failed to encode inventory of: {}, {}", vault_name, err),
        })
    }
}

fn now() -> Result<String, GlacierError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| GlacierError {
            code: None,
            message: format!("failed to format timestamp, {}", err),
        })
}

fn vault_not_found(vault_name: &str) -> GlacierError {
    GlacierError::new(
        ERR_RESOURCE_NOT_FOUND,
        format!("Vault not found for ARN: {}", vault_name),
    )
}

impl adapters::GlacierClient for MockGlacierClient {
    fn create_vault(&self, vault_name: &str) -> Result<CreateVaultOutput, GlacierError> {
        debug!(vault_name = vault_name, "mock create_vault");

        if vault_name.is_empty() {
            return Err(GlacierError::new(
                ERR_INVALID_PARAMETER,
                "vault name must not be empty",
            ));
        }

        self.lock_vaults()?
            .entry(vault_name.to_string())
            .or_default();

        Ok(CreateVaultOutput {
            response_metadata: self.metadata(201, INVENTORY_CONTENT_TYPE),
            location: Some(self.vault_location(vault_name)),
        })
    }

    fn initiate_job(
        &self,
        vault_name: &str,
        job_parameters: &JobParameters,
    ) -> Result<InitiateJobOutput, GlacierError> {
        debug!(vault_name = vault_name, job_type = %job_parameters.job_type, "mock initiate_job");

        let mut vaults = self.lock_vaults()?;
        let vault = vaults
            .get_mut(vault_name)
            .ok_or_else(|| vault_not_found(vault_name))?;

        let job = match job_parameters.job_type {
            JobType::InventoryRetrieval => MockJob {
                output: self.inventory_output(vault_name, vault)?,
                content_type: INVENTORY_CONTENT_TYPE,
                checksum: None,
                archive_description: None,
            },
            JobType::ArchiveRetrieval => {
                let archive_id = job_parameters.archive_id.as_deref().ok_or_else(|| {
                    GlacierError::new(
                        ERR_MISSING_PARAMETER,
                        "archive-retrieval jobs require an ArchiveId",
                    )
                })?;

                let archive = vault
                    .archives
                    .iter()
                    .find(|archive| archive.id == archive_id)
                    .ok_or_else(|| {
                        GlacierError::new(
                            ERR_RESOURCE_NOT_FOUND,
                            format!("Archive not found: {}", archive_id),
                        )
                    })?;

                MockJob {
                    output: archive.body.clone(),
                    content_type: ARCHIVE_CONTENT_TYPE,
                    checksum: Some(archive.tree_hash.clone()),
                    archive_description: Some(archive.description.clone()),
                }
            }
            JobType::Select => {
                return Err(GlacierError::new(
                    ERR_INVALID_PARAMETER,
                    "select jobs are not supported",
                ));
            }
        };

        let job_id = Uuid::new_v4().simple().to_string();
        vault.jobs.insert(job_id.clone(), job);

        Ok(InitiateJobOutput {
            response_metadata: self.metadata(202, INVENTORY_CONTENT_TYPE),
            location: Some(format!("{}/jobs/{}", self.vault_location(vault_name), job_id)),
            job_id,
            job_output_path: None,
        })
    }

    fn upload_archive(
        &self,
        vault_name: &str,
        body: Vec<u8>,
        archive_description: &str,
    ) -> Result<UploadArchiveOutput, GlacierError> {
        debug!(vault_name = vault_name, size = body.len(), "mock upload_archive");

        let mut vaults = self.lock_vaults()?;
        let vault = vaults
            .get_mut(vault_name)
            .ok_or_else(|| vault_not_found(vault_name))?;

        let archive = MockArchive {
            id: Uuid::new_v4().simple().to_string(),
            description: archive_description.to_string(),
            creation_date: now()?,
            size: body.len(),
            tree_hash: util::treehash::tree_hash(&body),
            body,
        };

        let output = UploadArchiveOutput {
            response_metadata: self.metadata(201, INVENTORY_CONTENT_TYPE),
            location: Some(format!(
                "{}/archives/{}",
                self.vault_location(vault_name),
                archive.id
            )),
            checksum: Some(archive.tree_hash.clone()),
            archive_id: archive.id.clone(),
        };
        vault.archives.push(archive);

        Ok(output)
    }

    fn get_job_output(
        &self,
        vault_name: &str,
        job_id: &str,
        range: Option<&str>,
    ) -> Result<JobOutput<Vec<u8>>, GlacierError> {
        debug!(vault_name = vault_name, job_id = job_id, range = ?range, "mock get_job_output");

        let vaults = self.lock_vaults()?;
        let vault = vaults
            .get(vault_name)
            .ok_or_else(|| vault_not_found(vault_name))?;
        let job = vault.jobs.get(job_id).ok_or_else(|| {
            GlacierError::new(
                ERR_RESOURCE_NOT_FOUND,
                format!("Job not found: {}", job_id),
            )
        })?;

        Ok(JobOutput {
            response_metadata: self.metadata(200, job.content_type),
            body: job.output.clone(),
            checksum: job.checksum.clone(),
            status: 200,
            content_range: None,
            accept_ranges: Some("bytes".to_string()),
            content_type: Some(job.content_type.to_string()),
            archive_description: job.archive_description.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::GlacierClient;

    #[test]
    fn test_create_vault_is_idempotent() {
        let client = MockGlacierClient::default();

        let first = client.create_vault("v1").unwrap();
        client.create_vault("v1").unwrap();

        assert_eq!(first.location.as_deref(), Some("/123456789012/vaults/v1"));
        assert_eq!(client.lock_vaults().unwrap().len(), 1);
        assert!(client.create_vault("").is_err());
    }

    #[test]
    fn test_unknown_vault() {
        let client = MockGlacierClient::default();

        let err = client
            .upload_archive("missing", b"data".to_vec(), "d")
            .unwrap_err();
        assert!(err.is_not_found());

        let err = client
            .initiate_job("missing", &JobParameters::inventory())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_archive_retrieval_round_trip() {
        let client = MockGlacierClient::default();
        client.create_vault("v1").unwrap();

        let upload = client
            .upload_archive("v1", b"hello world".to_vec(), "test")
            .unwrap();
        assert!(!upload.archive_id.is_empty());

        let job = client
            .initiate_job("v1", &JobParameters::archive_retrieval(&upload.archive_id))
            .unwrap();
        assert_eq!(job.response_metadata.http_status_code, 202);

        let output = client.get_job_output("v1", &job.job_id, None).unwrap();
        assert_eq!(output.body, b"hello world");
        assert_eq!(output.archive_description.as_deref(), Some("test"));
        assert_eq!(output.checksum, upload.checksum);
        assert!(output.response_metadata.http_headers.is_some());
    }

    #[test]
    fn test_range_is_ignored() {
        let client = MockGlacierClient::default();
        client.create_vault("v1").unwrap();
        let upload = client
            .upload_archive("v1", b"hello world".to_vec(), "test")
            .unwrap();
        let job = client
            .initiate_job("v1", &JobParameters::archive_retrieval(&upload.archive_id))
            .unwrap();

        let output = client
            .get_job_output("v1", &job.job_id, Some("bytes=0-4"))
            .unwrap();
        assert_eq!(output.body, b"hello world");
    }

    #[test]
    fn test_archive_retrieval_errors() {
        let client = MockGlacierClient::default();
        client.create_vault("v1").unwrap();

        let err = client
            .initiate_job("v1", &JobParameters::new(JobType::ArchiveRetrieval))
            .unwrap_err();
        assert_eq!(err.code.as_deref(), Some(ERR_MISSING_PARAMETER));

        let err = client
            .initiate_job("v1", &JobParameters::archive_retrieval("nope"))
            .unwrap_err();
        assert!(err.is_not_found());

        let err = client
            .initiate_job("v1", &JobParameters::new(JobType::Select))
            .unwrap_err();
        assert_eq!(err.code.as_deref(), Some(ERR_INVALID_PARAMETER));

        assert!(client.get_job_output("v1", "nope", None).unwrap_err().is_not_found());
    }

    #[test]
    fn test_inventory_snapshot() {
        let client = MockGlacierClient::default();
        client.create_vault("v1").unwrap();
        client.upload_archive("v1", b"a".to_vec(), "first").unwrap();
        client.upload_archive("v1", b"bb".to_vec(), "second").unwrap();

        let job = client
            .initiate_job("v1", &JobParameters::inventory())
            .unwrap();
        client.upload_archive("v1", b"ccc".to_vec(), "late").unwrap();

        let output = client.get_job_output("v1", &job.job_id, None).unwrap();
        let inventory: serde_json::Value = serde_json::from_slice(&output.body).unwrap();

        assert_eq!(
            inventory["VaultARN"],
            "arn:aws:glacier:us-east-1:123456789012:vaults/v1"
        );
        let archives = inventory["ArchiveList"].as_array().unwrap();
        assert_eq!(archives.len(), 2);
        assert_eq!(archives[0]["ArchiveDescription"], "first");
        assert_eq!(archives[1]["Size"], 2);
    }
}
