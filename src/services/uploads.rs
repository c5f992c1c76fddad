use std::path::PathBuf;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Image extensions accepted by the upload sink
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Default upload bound: 16 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Errors that can occur when storing an upload
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file selected")]
    EmptyFilename,

    #[error("Invalid file type")]
    InvalidExtension,

    #[error("File exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// File sink for uploaded profile photos and plan images
pub struct UploadStore {
    dir: PathBuf,
    public_prefix: String,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, public_prefix: &str, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    /// Store an upload and return its public reference path
    ///
    /// Every call gets its own file; an existing file is never overwritten.
    pub async fn save(&self, original_filename: &str, bytes: &[u8]) -> Result<String, UploadError> {
        if original_filename.trim().is_empty() {
            return Err(UploadError::EmptyFilename);
        }
        if !is_allowed_file(original_filename) {
            return Err(UploadError::InvalidExtension);
        }
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge { limit: self.max_bytes });
        }

        let sanitized = sanitize_filename(original_filename);
        if sanitized.is_empty() || !is_allowed_file(&sanitized) {
            return Err(UploadError::InvalidExtension);
        }

        let filename = format!(
            "{}_{}_{}",
            chrono::Utc::now().format("%Y%m%d_%H%M%S"),
            uuid::Uuid::new_v4().simple(),
            sanitized
        );

        tokio::fs::create_dir_all(&self.dir).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.dir.join(&filename))
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        tracing::info!("Stored upload {} ({} bytes)", filename, bytes.len());

        Ok(format!("{}/{}", self.public_prefix, filename))
    }
}

/// Check the extension against the allow-list (case-insensitive)
pub fn is_allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Reduce a client filename to a safe basename
///
/// Path components are dropped, whitespace becomes `_`, and only ASCII
/// alphanumerics, `.`, `-` and `_` survive. Leading dots are stripped.
pub fn sanitize_filename(filename: &str) -> String {
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = basename
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    cleaned.trim_start_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        assert!(is_allowed_file("photo.png"));
        assert!(is_allowed_file("photo.JPEG"));
        assert!(is_allowed_file("a.b.gif"));
        assert!(!is_allowed_file("photo.bmp"));
        assert!(!is_allowed_file("png"));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("my photo.png"), "my_photo.png");
        assert_eq!(sanitize_filename("../../etc/passwd.png"), "passwd.png");
        assert_eq!(sanitize_filename("C:\\Users\\me\\pic.jpg"), "pic.jpg");
        assert_eq!(sanitize_filename("..hidden.gif"), "hidden.gif");
    }

    #[tokio::test]
    async fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path(), "/static/uploads/", DEFAULT_MAX_UPLOAD_BYTES);

        let path = store.save("beach day.jpg", b"jpegbytes").await.unwrap();
        assert!(path.starts_with("/static/uploads/"));
        assert!(path.ends_with("_beach_day.jpg"));

        let filename = path.rsplit('/').next().unwrap();
        let written = std::fs::read(dir.path().join(filename)).unwrap();
        assert_eq!(written, b"jpegbytes");
    }

    #[tokio::test]
    async fn test_same_filename_gets_distinct_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path(), "/static/uploads", DEFAULT_MAX_UPLOAD_BYTES);

        let first = store.save("photo.png", b"alice").await.unwrap();
        let second = store.save("photo.png", b"bob").await.unwrap();
        assert_ne!(first, second);

        let read = |path: &str| std::fs::read(dir.path().join(path.rsplit('/').next().unwrap())).unwrap();
        assert_eq!(read(&first), b"alice");
        assert_eq!(read(&second), b"bob");
    }

    #[tokio::test]
    async fn test_save_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path(), "/static/uploads", 4);

        assert!(matches!(store.save("", b"x").await, Err(UploadError::EmptyFilename)));
        assert!(matches!(store.save("notes.txt", b"x").await, Err(UploadError::InvalidExtension)));
        assert!(matches!(store.save("big.png", b"12345").await, Err(UploadError::TooLarge { limit: 4 })));
    }
}
