//! Publisher module for running the external publishing tool.
//!
//! For every publish a script is generated from the target's template,
//! the tool is run with the destination credentials and the generated
//! script name, and the script is removed again whatever the result.

mod error;
mod script;
mod script_publisher;
mod traits;
mod types;

pub use error::PublishError;
pub use script::{render_script, script_name_for};
pub use script_publisher::ScriptPublisher;
pub use traits::Publisher;
pub use types::PublishOutcome;
