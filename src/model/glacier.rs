use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

pub const ERR_RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";
pub const ERR_INVALID_PARAMETER: &str = "InvalidParameterValueException";
pub const ERR_MISSING_PARAMETER: &str = "MissingParameterValueException";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    ArchiveRetrieval,
    InventoryRetrieval,
    Select,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::ArchiveRetrieval => "archive-retrieval",
            JobType::InventoryRetrieval => "inventory-retrieval",
            JobType::Select => "select",
        }
    }

    pub fn is_inventory(&self) -> bool {
        matches!(self, JobType::InventoryRetrieval)
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of an `initiate-job` request, in the service's wire casing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobParameters {
    #[serde(rename = "Type")]
    pub job_type: JobType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "SNSTopic", default, skip_serializing_if = "Option::is_none")]
    pub sns_topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_byte_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

impl JobParameters {
    pub fn new(job_type: JobType) -> Self {
        Self {
            job_type,
            archive_id: None,
            description: None,
            format: None,
            sns_topic: None,
            retrieval_byte_range: None,
            tier: None,
        }
    }

    pub fn inventory() -> Self {
        Self::new(JobType::InventoryRetrieval)
    }

    pub fn archive_retrieval(archive_id: &str) -> Self {
        Self::new(JobType::ArchiveRetrieval).with_archive_id(archive_id)
    }

    pub fn with_archive_id(mut self, archive_id: &str) -> Self {
        self.archive_id = Some(archive_id.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn with_tier(mut self, tier: &str) -> Self {
        self.tier = Some(tier.to_string());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseMetadata {
    pub request_id: String,
    #[serde(rename = "HTTPStatusCode")]
    pub http_status_code: u16,
    #[serde(rename = "HTTPHeaders", skip_serializing_if = "Option::is_none")]
    pub http_headers: Option<BTreeMap<String, String>>,
    pub retry_attempts: u32,
}

impl ResponseMetadata {
    pub fn new(request_id: &str, http_status_code: u16) -> Self {
        Self {
            request_id: request_id.to_string(),
            http_status_code,
            http_headers: None,
            retry_attempts: 0,
        }
    }

    /// Drops the per-request transport headers, leaving only stable fields.
    pub fn strip_http_headers(&mut self) {
        self.http_headers = None;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVaultOutput {
    #[serde(rename = "ResponseMetadata")]
    pub response_metadata: ResponseMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateJobOutput {
    #[serde(rename = "ResponseMetadata")]
    pub response_metadata: ResponseMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_output_path: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadArchiveOutput {
    #[serde(rename = "ResponseMetadata")]
    pub response_metadata: ResponseMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    pub archive_id: String,
}

/// Output of `get-job-output`. `B` is the raw byte body as returned by the
/// client, or the decoded text once the simulator has processed it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOutput<B> {
    #[serde(rename = "ResponseMetadata")]
    pub response_metadata: ResponseMetadata,
    pub body: B,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_ranges: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_description: Option<String>,
}

impl<B> JobOutput<B> {
    pub fn map_body<C, E>(self, f: impl FnOnce(B) -> Result<C, E>) -> Result<JobOutput<C>, E> {
        Ok(JobOutput {
            response_metadata: self.response_metadata,
            body: f(self.body)?,
            checksum: self.checksum,
            status: self.status,
            content_range: self.content_range,
            accept_ranges: self.accept_ranges,
            content_type: self.content_type,
            archive_description: self.archive_description,
        })
    }
}

/// Failure reported by the underlying storage client, passed through as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlacierError {
    pub code: Option<String>,
    pub message: String,
}

impl GlacierError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.to_string()),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code.as_deref() == Some(ERR_RESOURCE_NOT_FOUND)
    }
}

impl fmt::Display for GlacierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for GlacierError {}
