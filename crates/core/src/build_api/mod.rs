//! Remote build metadata.
//!
//! The `BuildSource` trait answers one question per target: which successful
//! build has the highest build number? `CloudBuildClient` answers it over the
//! cloud build REST API.

mod cloud_build;
mod error;
mod traits;
mod types;

pub use cloud_build::CloudBuildClient;
pub use error::BuildApiError;
pub use traits::BuildSource;
pub use types::BuildDefinition;
