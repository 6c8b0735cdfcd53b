pub mod adapters;
pub mod error;
pub mod logging;
pub mod model;
pub mod util;
pub mod vault;

pub use adapters::{glacier::GlacierSdkClient, mock::MockGlacierClient, GlacierClient};
pub use error::VaultError;
pub use logging::LoggingConfig;
pub use model::{
    glacier::{GlacierError, JobParameters, JobType},
    log::{CallLog, JobOutputResponse},
};
pub use vault::VaultSimulator;
