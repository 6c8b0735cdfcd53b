use crate::model;

pub mod glacier;
pub mod mock;

/// The cloud archival-storage operations a vault simulator drives.
pub trait GlacierClient {
    fn create_vault(
        &self,
        vault_name: &str,
    ) -> Result<model::glacier::CreateVaultOutput, model::glacier::GlacierError>;

    fn initiate_job(
        &self,
        vault_name: &str,
        job_parameters: &model::glacier::JobParameters,
    ) -> Result<model::glacier::InitiateJobOutput, model::glacier::GlacierError>;

    fn upload_archive(
        &self,
        vault_name: &str,
        body: Vec<u8>,
        archive_description: &str,
    ) -> Result<model::glacier::UploadArchiveOutput, model::glacier::GlacierError>;

    fn get_job_output(
        &self,
        vault_name: &str,
        job_id: &str,
        range: Option<&str>,
    ) -> Result<model::glacier::JobOutput<Vec<u8>>, model::glacier::GlacierError>;
}
