//! Testing utilities and mock implementations.
//!
//! Every external collaborator of the orchestrator has a mock here, so full
//! sync passes can be tested without a build service, a publishing tool, or
//! a webhook.
//!
//! # Example
//!
//! ```rust,ignore
//! use buildsync_core::testing::{fixtures, MockBuildSource, StaticTargets};
//!
//! let targets = StaticTargets::new(vec![fixtures::watch_target("game-win64", "win64")]);
//! let builds = MockBuildSource::new();
//! builds.set_latest("win64", fixtures::build(42)).await;
//! ```

mod mock_build_source;
mod mock_notifier;
mod mock_publisher;
mod mock_stager;
mod mock_state_store;
mod static_targets;

pub use mock_build_source::MockBuildSource;
pub use mock_notifier::{MockNotifier, SentNotification};
pub use mock_publisher::{MockPublisher, RecordedPublish};
pub use mock_stager::{MockStager, RecordedStage};
pub use mock_state_store::MockStateStore;
pub use static_targets::StaticTargets;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::PathBuf;

    use crate::build_api::BuildDefinition;
    use crate::target::{PublishDestination, SourceLocator, WatchTarget};

    /// A watch target for project "game" publishing to app 480.
    pub fn watch_target(name: &str, build_target: &str) -> WatchTarget {
        WatchTarget {
            name: name.to_string(),
            source: SourceLocator {
                org_id: "acme".to_string(),
                project: "game".to_string(),
                build_target: build_target.to_string(),
                api_key: "api-key".to_string(),
            },
            destination: PublishDestination {
                username: "builder".to_string(),
                password: "secret".to_string(),
                app_id: "480".to_string(),
                branch: None,
                content_dir: PathBuf::from("content").join(build_target),
                executable_path: PathBuf::from("content").join(build_target).join("Game.exe"),
                script_template: "app_build_template.vdf".to_string(),
                use_drm: false,
                display_name: "Acme Game".to_string(),
            },
            notification: None,
        }
    }

    /// A successful build of `build_target` on the main branch.
    pub fn build_for(build_target: &str, build_number: u64) -> BuildDefinition {
        BuildDefinition {
            build_number,
            file_name: format!("{}_game_{}_main.zip", build_number, build_target),
            download_url: format!(
                "https://cdn.example.com/game/{}/{}.zip",
                build_target, build_number
            ),
            commit_id: format!("commit{}", build_number),
            commit_message: format!("Build {}", build_number),
            scm_branch: "main".to_string(),
        }
    }

    /// A successful win64 build.
    pub fn build(build_number: u64) -> BuildDefinition {
        build_for("win64", build_number)
    }
}
