//! Stager module for fetching and unpacking build artifacts.
//!
//! Staging downloads a build's archive into the download directory, extracts
//! it so the target's content directory holds exactly that build's files, and
//! deletes the archive afterwards.
//!
//! # Guarantees
//!
//! - The final archive name only appears once the download is complete
//! - The previous content directory is replaced, never merged
//! - A corrupt archive leaves the previous content in place
//! - Failed attempts remove their partial files so the next pass can retry

mod archive_stager;
mod config;
mod error;
mod traits;

pub use archive_stager::{install_archive, ArchiveStager};
pub use config::StagerConfig;
pub use error::StagingError;
pub use traits::{StageOutcome, Stager};
