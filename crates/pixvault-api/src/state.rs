//! Application state shared by all handlers.

use std::sync::Arc;

use pixvault_core::Config;
use pixvault_db::ImageRepository;
use pixvault_processing::UploadPipeline;
use pixvault_storage::FileSystem;

/// Everything a handler needs: configuration, the image repository, the
/// filesystem capability (for serving files), and the upload pipeline.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub repo: Arc<dyn ImageRepository>,
    pub fs: Arc<dyn FileSystem>,
    pub pipeline: UploadPipeline,
}

impl AppState {
    /// Wire the upload pipeline against the configured directories. Both the
    /// repository and the filesystem are injected so tests can run fully
    /// in memory.
    pub fn new(config: Config, repo: Arc<dyn ImageRepository>, fs: Arc<dyn FileSystem>) -> Self {
        // Error rendering keys off the injected config, never ambient env.
        crate::error::set_production_mode(config.is_production());
        let pipeline = UploadPipeline::new(
            fs.clone(),
            repo.clone(),
            config.base_images_path.clone(),
            config.base_thumbnails_path.clone(),
        );
        AppState {
            config,
            repo,
            fs,
            pipeline,
        }
    }
}
