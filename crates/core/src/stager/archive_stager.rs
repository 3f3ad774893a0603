//! HTTP download + zip extraction stager.

use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};
use zip::ZipArchive;

use super::config::StagerConfig;
use super::error::StagingError;
use super::traits::{StageOutcome, Stager};
use crate::build_api::BuildDefinition;

/// Downloads build archives over HTTP and extracts them with `zip`.
pub struct ArchiveStager {
    client: Client,
    config: StagerConfig,
}

impl ArchiveStager {
    /// Creates a new stager with the given configuration.
    pub fn new(config: StagerConfig) -> Result<Self, StagingError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| StagingError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Location of the downloaded archive for `build`.
    pub fn archive_path(&self, build: &BuildDefinition) -> PathBuf {
        self.config.download_dir.join(archive_file_name(build))
    }

    fn partial_path(&self, build: &BuildDefinition) -> PathBuf {
        self.config
            .download_dir
            .join(format!("{}.part", archive_file_name(build)))
    }

    /// Streams `url` into `dest`. Returns the number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, StagingError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StagingError::Download {
                url: url.to_string(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(StagingError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let file = File::create(dest)
            .await
            .map_err(|e| StagingError::io(dest, e))?;
        let mut writer = BufWriter::with_capacity(self.config.buffer_size, file);

        let mut total_bytes = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| StagingError::Download {
                url: url.to_string(),
                source: e,
            })?
        {
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| StagingError::io(dest, e))?;
            total_bytes += chunk.len() as u64;
        }

        writer.flush().await.map_err(|e| StagingError::io(dest, e))?;

        Ok(total_bytes)
    }

    async fn remove_file_quietly(path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }
}

/// File name of the archive inside the download directory. Branch names
/// may contain path separators, which must not create subdirectories.
fn archive_file_name(build: &BuildDefinition) -> String {
    build.file_name.replace(['/', '\\'], "_")
}

/// Sibling directory used while extracting, e.g. `content/win64.incoming`.
fn incoming_dir(content_dir: &Path) -> Result<PathBuf, StagingError> {
    let name = content_dir
        .file_name()
        .ok_or_else(|| StagingError::InvalidContentDir {
            path: content_dir.to_path_buf(),
        })?;
    let mut incoming = name.to_os_string();
    incoming.push(".incoming");
    Ok(content_dir.with_file_name(incoming))
}

/// Extracts `archive` so that `content_dir` ends up holding exactly its
/// entries.
///
/// Extraction happens next to the content directory first; the previous
/// content is only removed once the new tree is complete, so a corrupt
/// archive leaves the old content untouched.
pub fn install_archive(archive: &Path, content_dir: &Path) -> Result<usize, StagingError> {
    let incoming = incoming_dir(content_dir)?;
    if incoming.exists() {
        std::fs::remove_dir_all(&incoming).map_err(|e| StagingError::io(&incoming, e))?;
    }

    let file = std::fs::File::open(archive).map_err(|e| StagingError::io(archive, e))?;
    let mut zip = ZipArchive::new(file).map_err(|e| StagingError::Archive {
        path: archive.to_path_buf(),
        source: e,
    })?;
    let entries = zip.len();

    std::fs::create_dir_all(&incoming).map_err(|e| StagingError::io(&incoming, e))?;
    if let Err(e) = zip.extract(&incoming) {
        let _ = std::fs::remove_dir_all(&incoming);
        return Err(StagingError::Archive {
            path: archive.to_path_buf(),
            source: e,
        });
    }

    if content_dir.exists() {
        debug!("Deleting existing content {}", content_dir.display());
        if let Err(e) = std::fs::remove_dir_all(content_dir) {
            let _ = std::fs::remove_dir_all(&incoming);
            return Err(StagingError::io(content_dir, e));
        }
    }

    std::fs::rename(&incoming, content_dir).map_err(|e| StagingError::io(content_dir, e))?;

    Ok(entries)
}

#[async_trait]
impl Stager for ArchiveStager {
    fn name(&self) -> &str {
        "archive"
    }

    async fn stage(
        &self,
        build: &BuildDefinition,
        content_dir: &Path,
    ) -> Result<StageOutcome, StagingError> {
        let archive_path = self.archive_path(build);
        let present = fs::try_exists(&archive_path)
            .await
            .map_err(|e| StagingError::io(&archive_path, e))?;
        if present {
            info!("{} already present at {}", build, archive_path.display());
            return Ok(StageOutcome::AlreadyStaged { archive_path });
        }

        fs::create_dir_all(&self.config.download_dir)
            .await
            .map_err(|e| StagingError::io(&self.config.download_dir, e))?;

        // Only a complete download gets the final name.
        let partial_path = self.partial_path(build);
        let start = Instant::now();
        info!("Downloading {}", build);
        let bytes = match self.download(&build.download_url, &partial_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                Self::remove_file_quietly(&partial_path).await;
                return Err(e);
            }
        };
        fs::rename(&partial_path, &archive_path)
            .await
            .map_err(|e| StagingError::io(&archive_path, e))?;
        info!(
            bytes,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Downloaded {}",
            build
        );

        let archive = archive_path.clone();
        let target_dir = content_dir.to_path_buf();
        let extracted =
            tokio::task::spawn_blocking(move || install_archive(&archive, &target_dir)).await;

        // The download directory is not a cache.
        Self::remove_file_quietly(&archive_path).await;

        let entries = extracted.map_err(|e| StagingError::Task(e.to_string()))??;
        info!(
            entries,
            "Unpacked {} into {}",
            build,
            content_dir.display()
        );

        Ok(StageOutcome::Staged {
            content_dir: content_dir.to_path_buf(),
            entries,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, files: &[(&str, &str)]) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    /// Serves `bytes` at `/builds/42.zip` and returns the base URL.
    async fn serve_archive(bytes: Vec<u8>) -> String {
        let app = Router::new().route(
            "/builds/42.zip",
            get(move || {
                let bytes = bytes.clone();
                async move { bytes }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn list_files(dir: &Path) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack = vec![dir.to_path_buf()];
        while let Some(current) = stack.pop() {
            for entry in std::fs::read_dir(&current).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    stack.push(path);
                } else {
                    let rel = path.strip_prefix(dir).unwrap();
                    out.push(rel.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        out.sort();
        out
    }

    fn build(file_name: &str, url: &str) -> BuildDefinition {
        BuildDefinition {
            build_number: 42,
            file_name: file_name.to_string(),
            download_url: url.to_string(),
            commit_id: "abc123".to_string(),
            commit_message: "msg".to_string(),
            scm_branch: "main".to_string(),
        }
    }

    #[test]
    fn test_install_replaces_previous_content() {
        let temp = TempDir::new().unwrap();
        let content = temp.path().join("content");

        let first = temp.path().join("first.zip");
        write_zip(
            &first,
            &[("Game.exe", "v1"), ("data/level1.dat", "l1"), ("old.txt", "stale")],
        );
        assert_eq!(install_archive(&first, &content).unwrap(), 3);

        let second = temp.path().join("second.zip");
        write_zip(&second, &[("Game.exe", "v2"), ("data/level1.dat", "l1b")]);
        install_archive(&second, &content).unwrap();

        assert_eq!(list_files(&content), vec!["Game.exe", "data/level1.dat"]);
        assert_eq!(
            std::fs::read_to_string(content.join("Game.exe")).unwrap(),
            "v2"
        );
        assert!(!temp.path().join("content.incoming").exists());
    }

    #[test]
    fn test_install_same_archive_twice_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let content = temp.path().join("content");
        let archive = temp.path().join("build.zip");
        write_zip(&archive, &[("Game.exe", "bin"), ("readme.txt", "hi")]);

        install_archive(&archive, &content).unwrap();
        std::fs::write(content.join("leftover.log"), "written by the game").unwrap();
        install_archive(&archive, &content).unwrap();

        assert_eq!(list_files(&content), vec!["Game.exe", "readme.txt"]);
    }

    #[test]
    fn test_corrupt_archive_keeps_old_content() {
        let temp = TempDir::new().unwrap();
        let content = temp.path().join("content");
        std::fs::create_dir_all(&content).unwrap();
        std::fs::write(content.join("Game.exe"), "previous").unwrap();

        let archive = temp.path().join("broken.zip");
        std::fs::write(&archive, b"this is not a zip file").unwrap();

        let err = install_archive(&archive, &content).unwrap_err();
        assert!(matches!(err, StagingError::Archive { .. }));
        assert_eq!(
            std::fs::read_to_string(content.join("Game.exe")).unwrap(),
            "previous"
        );
    }

    #[tokio::test]
    async fn test_existing_archive_reports_already_staged() {
        let temp = TempDir::new().unwrap();
        let downloads = temp.path().join("downloads");
        std::fs::create_dir_all(&downloads).unwrap();
        std::fs::write(downloads.join("42_game_win64_main.zip"), b"zip").unwrap();

        let stager = ArchiveStager::new(StagerConfig::new(&downloads)).unwrap();
        let outcome = stager
            .stage(
                &build("42_game_win64_main.zip", "http://127.0.0.1:1/never.zip"),
                &temp.path().join("content"),
            )
            .await
            .unwrap();

        assert!(!outcome.is_staged());
        assert!(!temp.path().join("content").exists());
    }

    #[tokio::test]
    async fn test_failed_download_leaves_no_files() {
        let temp = TempDir::new().unwrap();
        let downloads = temp.path().join("downloads");
        let stager = ArchiveStager::new(StagerConfig::new(&downloads).with_connect_timeout(2))
            .unwrap();
        let build = build("43_game_win64_main.zip", "http://127.0.0.1:1/43.zip");

        let err = stager
            .stage(&build, &temp.path().join("content"))
            .await
            .unwrap_err();
        assert!(matches!(err, StagingError::Download { .. }));
        assert!(!stager.archive_path(&build).exists());
        assert!(!downloads.join("43_game_win64_main.zip.part").exists());
    }

    #[tokio::test]
    async fn test_stage_downloads_and_extracts() {
        let temp = TempDir::new().unwrap();
        let downloads = temp.path().join("downloads");
        let content = temp.path().join("content");
        let base = serve_archive(zip_bytes(&[("Game.exe", "v42"), ("data/a.dat", "a")])).await;

        let stager = ArchiveStager::new(StagerConfig::new(&downloads)).unwrap();
        let outcome = stager
            .stage(
                &build("42_game_win64_main.zip", &format!("{}/builds/42.zip", base)),
                &content,
            )
            .await
            .unwrap();

        match outcome {
            StageOutcome::Staged { entries, bytes, .. } => {
                assert_eq!(entries, 2);
                assert!(bytes > 0);
            }
            other => panic!("expected Staged, got {:?}", other),
        }
        assert_eq!(list_files(&content), vec!["Game.exe", "data/a.dat"]);
        // neither the archive nor a partial download is kept
        assert_eq!(std::fs::read_dir(&downloads).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_branch_with_slash_stays_in_download_dir() {
        let temp = TempDir::new().unwrap();
        let downloads = temp.path().join("downloads");
        let content = temp.path().join("content");
        let base = serve_archive(zip_bytes(&[("Game.exe", "login")])).await;

        let stager = ArchiveStager::new(StagerConfig::new(&downloads)).unwrap();
        let mut build = build(
            "42_game_win64_feature/login.zip",
            &format!("{}/builds/42.zip", base),
        );
        build.scm_branch = "feature/login".to_string();

        assert_eq!(
            stager.archive_path(&build),
            downloads.join("42_game_win64_feature_login.zip")
        );
        assert_eq!(
            stager.partial_path(&build),
            downloads.join("42_game_win64_feature_login.zip.part")
        );

        let outcome = stager.stage(&build, &content).await.unwrap();
        assert!(outcome.is_staged());
        assert_eq!(
            std::fs::read_to_string(content.join("Game.exe")).unwrap(),
            "login"
        );
        assert_eq!(std::fs::read_dir(&downloads).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_artifact_is_http_status_error() {
        let temp = TempDir::new().unwrap();
        let downloads = temp.path().join("downloads");
        let base = serve_archive(zip_bytes(&[("Game.exe", "x")])).await;

        let stager = ArchiveStager::new(StagerConfig::new(&downloads)).unwrap();
        let build = build("43_game_win64_main.zip", &format!("{}/builds/43.zip", base));
        let err = stager
            .stage(&build, &temp.path().join("content"))
            .await
            .unwrap_err();

        assert!(matches!(err, StagingError::HttpStatus { status: 404, .. }));
        assert!(!downloads.join("43_game_win64_main.zip.part").exists());
    }

    #[tokio::test]
    async fn test_unreadable_download_dir_is_reported() {
        let temp = TempDir::new().unwrap();
        // a regular file where the download directory should be
        let downloads = temp.path().join("downloads");
        std::fs::write(&downloads, b"not a directory").unwrap();

        let stager = ArchiveStager::new(StagerConfig::new(&downloads)).unwrap();
        let build = build("42_game_win64_main.zip", "http://127.0.0.1:1/42.zip");
        let err = stager
            .stage(&build, &temp.path().join("content"))
            .await
            .unwrap_err();

        match err {
            StagingError::Io { path, .. } => assert_eq!(path, stager.archive_path(&build)),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_incoming_dir_is_sibling() {
        assert_eq!(
            incoming_dir(Path::new("/srv/content/win64")).unwrap(),
            PathBuf::from("/srv/content/win64.incoming")
        );
        assert!(incoming_dir(Path::new("/")).is_err());
    }
}
