use thiserror::Error;

use crate::disk::DiskError;
use crate::manifest::ManifestError;

/// Per-item upload failures, carrying the destination path so the run
/// report can say which file was lost and at which step.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("creating folders for {path}: {source}")]
    Folder {
        path: String,
        #[source]
        source: DiskError,
    },
    #[error("transferring {path}: {source}")]
    Transfer {
        path: String,
        #[source]
        source: DiskError,
    },
    #[error("recording {path} in the manifest: {source}")]
    Manifest {
        path: String,
        #[source]
        source: ManifestError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_path() {
        let e = UploadError::Transfer {
            path: "backup/10.jpg".into(),
            source: DiskError::Api {
                status: 507,
                path: "backup/10.jpg".into(),
                description: "insufficient storage".into(),
            },
        };
        let msg = e.to_string();
        assert!(msg.contains("backup/10.jpg"));
        assert!(msg.contains("transferring"));
    }
}
