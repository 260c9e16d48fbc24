//! Commerce Configuration

use std::path::PathBuf;

use platform::upload::UploadPolicy;

#[derive(Debug, Clone)]
pub struct CommerceConfig {
    pub upload: UploadPolicy,
    /// Directory product images are written to
    pub upload_dir: PathBuf,
    /// URL prefix the upload directory is served under
    pub public_prefix: String,
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            upload: UploadPolicy::default(),
            upload_dir: PathBuf::from("./uploads"),
            public_prefix: "/uploads".to_string(),
        }
    }
}
