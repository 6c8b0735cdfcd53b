use aws_sdk_glacier::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::RequestId,
    primitives::ByteStream,
    types,
};
use tokio::runtime::Runtime;
use tracing::debug;

use crate::{
    adapters,
    model::glacier::{
        CreateVaultOutput, GlacierError, InitiateJobOutput, JobOutput, JobParameters,
        ResponseMetadata, UploadArchiveOutput,
    },
};

/// The current account, as understood by the service.
const ACCOUNT_ID: &str = "-";

/// Blocking adapter over the async AWS SDK client.
pub struct GlacierSdkClient {
    client: aws_sdk_glacier::Client,
    runtime: Runtime,
}

impl GlacierSdkClient {
    pub fn new(client: aws_sdk_glacier::Client, runtime: Runtime) -> Self {
        Self { client, runtime }
    }

    /// Loads credentials and region from the environment. `endpoint_url`
    /// points the client at a local emulator instead of the real service.
    pub fn from_env(endpoint_url: Option<&str>) -> Result<Self, GlacierError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| GlacierError {
                code: None,
                message: format!("failed to build runtime, {}", err),
            })?;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(url) = endpoint_url {
            loader = loader.endpoint_url(url);
        }
        let config = runtime.block_on(loader.load());

        Ok(Self::new(aws_sdk_glacier::Client::new(&config), runtime))
    }
}

fn sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> GlacierError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug + 'static,
{
    GlacierError {
        code: err.code().map(str::to_string),
        message: match err.message() {
            Some(message) => message.to_string(),
            None => format!("failed to {}, {}", operation, DisplayErrorContext(&err)),
        },
    }
}

// Only `GetJobOutputOutput` exposes the HTTP status. The other outputs get
// the fixed success code the service documents for the operation.
fn metadata(request_id: Option<&str>, http_status_code: u16) -> ResponseMetadata {
    ResponseMetadata::new(request_id.unwrap_or_default(), http_status_code)
}

fn missing(operation: &str, field: &str) -> GlacierError {
    GlacierError {
        code: None,
        message: format!("{} response is missing `{}`", operation, field),
    }
}

fn to_sdk_parameters(params: &JobParameters) -> types::JobParameters {
    types::JobParameters::builder()
        .r#type(params.job_type.as_str())
        .set_archive_id(params.archive_id.clone())
        .set_description(params.description.clone())
        .set_format(params.format.clone())
        .set_sns_topic(params.sns_topic.clone())
        .set_retrieval_byte_range(params.retrieval_byte_range.clone())
        .set_tier(params.tier.clone())
        .build()
}

impl adapters::GlacierClient for GlacierSdkClient {
    fn create_vault(&self, vault_name: &str) -> Result<CreateVaultOutput, GlacierError> {
        debug!(vault_name = vault_name, "sdk create_vault");

        let req = self
            .client
            .create_vault()
            .account_id(ACCOUNT_ID)
            .vault_name(vault_name);

        let out = self
            .runtime
            .block_on(req.send())
            .map_err(|err| sdk_error("create_vault", err))?;

        Ok(CreateVaultOutput {
            response_metadata: metadata(out.request_id(), 201),
            location: out.location().map(str::to_string),
        })
    }

    fn initiate_job(
        &self,
        vault_name: &str,
        job_parameters: &JobParameters,
    ) -> Result<InitiateJobOutput, GlacierError> {
        debug!(vault_name = vault_name, job_type = %job_parameters.job_type, "sdk initiate_job");

        let req = self
            .client
            .initiate_job()
            .account_id(ACCOUNT_ID)
            .vault_name(vault_name)
            .job_parameters(to_sdk_parameters(job_parameters));

        let out = self
            .runtime
            .block_on(req.send())
            .map_err(|err| sdk_error("initiate_job", err))?;

        Ok(InitiateJobOutput {
            response_metadata: metadata(out.request_id(), 202),
            location: out.location().map(str::to_string),
            job_id: out
                .job_id()
                .ok_or_else(|| missing("initiate_job", "jobId"))?
                .to_string(),
            job_output_path: out.job_output_path().map(str::to_string),
        })
    }

    fn upload_archive(
        &self,
        vault_name: &str,
        body: Vec<u8>,
        archive_description: &str,
    ) -> Result<UploadArchiveOutput, GlacierError> {
        debug!(vault_name = vault_name, size = body.len(), "sdk upload_archive");

        let req = self
            .client
            .upload_archive()
            .account_id(ACCOUNT_ID)
            .vault_name(vault_name)
            .archive_description(archive_description)
            .body(ByteStream::from(body));

        let out = self
            .runtime
            .block_on(req.send())
            .map_err(|err| sdk_error("upload_archive", err))?;

        Ok(UploadArchiveOutput {
            response_metadata: metadata(out.request_id(), 201),
            location: out.location().map(str::to_string),
            checksum: out.checksum().map(str::to_string),
            archive_id: out
                .archive_id()
                .ok_or_else(|| missing("upload_archive", "archiveId"))?
                .to_string(),
        })
    }

    fn get_job_output(
        &self,
        vault_name: &str,
        job_id: &str,
        range: Option<&str>,
    ) -> Result<JobOutput<Vec<u8>>, GlacierError> {
        debug!(vault_name = vault_name, job_id = job_id, range = ?range, "sdk get_job_output");

        let req = self
            .client
            .get_job_output()
            .account_id(ACCOUNT_ID)
            .vault_name(vault_name)
            .job_id(job_id)
            .set_range(range.map(str::to_string));

        self.runtime.block_on(async move {
            let out = req
                .send()
                .await
                .map_err(|err| sdk_error("get_job_output", err))?;

            let status = u16::try_from(out.status()).unwrap_or(200);
            let mut output = JobOutput {
                response_metadata: metadata(out.request_id(), status),
                body: Vec::new(),
                checksum: out.checksum().map(str::to_string),
                status,
                content_range: out.content_range().map(str::to_string),
                accept_ranges: out.accept_ranges().map(str::to_string),
                content_type: out.content_type().map(str::to_string),
                archive_description: out.archive_description().map(str::to_string),
            };

            let bytes = out.body.collect().await.map_err(|err| GlacierError {
                code: None,
                message: format!("failed to collect body: {}, {}", job_id, err),
            })?;
            output.body = bytes.into_bytes().to_vec();

            Ok(output)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::glacier::{JobType, ERR_RESOURCE_NOT_FOUND};
    use aws_sdk_glacier::operation::{
        get_job_output::GetJobOutputError, initiate_job::InitiateJobError,
    };
    use aws_smithy_runtime_api::{client::orchestrator::HttpResponse, http::StatusCode};
    use aws_smithy_types::{body::SdkBody, error::ErrorMetadata};

    fn raw_response(status: u16) -> HttpResponse {
        HttpResponse::new(StatusCode::try_from(status).unwrap(), SdkBody::empty())
    }

    #[test]
    fn test_service_error_keeps_code_and_message() {
        let err = SdkError::service_error(
            InitiateJobError::generic(
                ErrorMetadata::builder()
                    .code(ERR_RESOURCE_NOT_FOUND)
                    .message("Vault not found for ARN: v1")
                    .build(),
            ),
            raw_response(404),
        );

        let err = sdk_error("initiate_job", err);
        assert_eq!(
            err,
            GlacierError {
                code: Some(ERR_RESOURCE_NOT_FOUND.to_string()),
                message: "Vault not found for ARN: v1".to_string(),
            }
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn test_service_error_without_message() {
        let err = SdkError::service_error(
            InitiateJobError::generic(ErrorMetadata::builder().code("ThrottlingException").build()),
            raw_response(400),
        );

        let err = sdk_error("initiate_job", err);
        assert_eq!(err.code.as_deref(), Some("ThrottlingException"));
        assert!(
            err.message.starts_with("failed to initiate_job, "),
            "unexpected message: {}",
            err.message
        );
    }

    #[test]
    fn test_transport_error_has_no_code() {
        let err: SdkError<GetJobOutputError, HttpResponse> = SdkError::timeout_error("timed out");

        let err = sdk_error("get_job_output", err);
        assert_eq!(err.code, None);
        assert!(err.message.starts_with("failed to get_job_output, "));
    }

    #[test]
    fn test_to_sdk_parameters() {
        let mut params = JobParameters::archive_retrieval("archive-1")
            .with_description("restore")
            .with_format("JSON")
            .with_tier("Bulk");
        params.sns_topic = Some("arn:aws:sns:us-east-1:123456789012:topic".to_string());
        params.retrieval_byte_range = Some("0-1048575".to_string());

        let sdk = to_sdk_parameters(&params);
        assert_eq!(sdk.r#type(), Some("archive-retrieval"));
        assert_eq!(sdk.archive_id(), Some("archive-1"));
        assert_eq!(sdk.description(), Some("restore"));
        assert_eq!(sdk.format(), Some("JSON"));
        assert_eq!(sdk.tier(), Some("Bulk"));
        assert_eq!(
            sdk.sns_topic(),
            Some("arn:aws:sns:us-east-1:123456789012:topic")
        );
        assert_eq!(sdk.retrieval_byte_range(), Some("0-1048575"));
    }

    #[test]
    fn test_to_sdk_parameters_leaves_unset_fields_empty() {
        let cases = vec![
            (JobParameters::inventory(), "inventory-retrieval"),
            (JobParameters::new(JobType::Select), "select"),
        ];

        for (params, expected) in cases {
            let sdk = to_sdk_parameters(&params);
            assert_eq!(sdk.r#type(), Some(expected), "failed type for case: {}", expected);
            assert_eq!(sdk.archive_id(), None, "failed archive_id for case: {}", expected);
            assert_eq!(sdk.sns_topic(), None, "failed sns_topic for case: {}", expected);
            assert_eq!(
                sdk.retrieval_byte_range(),
                None,
                "failed retrieval_byte_range for case: {}",
                expected
            );
        }
    }
}
