use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use sha2::{Digest, Sha256};
use shared::SupportedFormat;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid file type: {0}")]
    InvalidFormat(String),
}

/// Local directory holding uploaded leaf images.
#[derive(Clone, Debug)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn calculate_image_hash(image_data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(image_data);
        hex::encode(hasher.finalize())
    }

    /// Lower-cased extension after the last dot, if it is an accepted upload type.
    pub fn extract_file_extension(file_name: &str) -> Result<String, UploadError> {
        file_name
            .rsplit_once('.')
            .and_then(|(_, ext)| SupportedFormat::from_extension(ext))
            .map(|format| format.to_string())
            .ok_or_else(|| UploadError::InvalidFormat(file_name.to_string()))
    }

    pub fn allowed_file(file_name: &str) -> bool {
        Self::extract_file_extension(file_name).is_ok()
    }

    /// `plant_<YYYYmmdd_HHMMSS>_<8 hex chars>.<ext>`
    pub fn unique_filename(file_name: &str) -> Result<String, UploadError> {
        let extension = Self::extract_file_extension(file_name)?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let unique_id = Uuid::new_v4().simple().to_string();
        Ok(format!(
            "plant_{}_{}.{}",
            timestamp,
            &unique_id[..8],
            extension
        ))
    }

    /// Writes the upload under a fresh unique name and returns that name with
    /// the full path. Blocking; call from `web::block`.
    pub fn save(&self, image_data: &[u8], file_name: &str) -> Result<(String, PathBuf), UploadError> {
        let stored_name = Self::unique_filename(file_name)?;
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&stored_name);
        fs::write(&path, image_data)?;
        log::info!(
            "Stored upload {} as {} ({} bytes, sha256 {})",
            file_name,
            path.display(),
            image_data.len(),
            Self::calculate_image_hash(image_data)
        );
        Ok((stored_name, path))
    }

    /// Deletes a stored upload. A file that is already gone is not an error.
    pub fn remove(&self, stored_name: &str) -> Result<(), UploadError> {
        match fs::remove_file(self.dir.join(stored_name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_extensions() {
        assert!(UploadStore::allowed_file("leaf.PNG"));
        assert!(UploadStore::allowed_file("archive.tar.jpeg"));
        assert!(UploadStore::allowed_file("a.gif"));
        assert!(!UploadStore::allowed_file("leaf"));
        assert!(!UploadStore::allowed_file("leaf.webp"));
        assert!(!UploadStore::allowed_file("jpg"));
    }

    #[test]
    fn unique_names_keep_extension() {
        let name = UploadStore::unique_filename("My Leaf.JPG").unwrap();
        assert!(name.starts_with("plant_"));
        assert!(name.ends_with(".jpg"));
        // plant_ + 15 timestamp chars + _ + 8 id chars + .jpg
        assert_eq!(name.len(), 6 + 15 + 1 + 8 + 4);
        assert_ne!(name, UploadStore::unique_filename("My Leaf.JPG").unwrap());
    }

    #[test]
    fn hash_is_hex_sha256() {
        assert_eq!(
            UploadStore::calculate_image_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn save_creates_directory() {
        let dir = std::env::temp_dir().join(format!("uploads-{}", Uuid::new_v4()));
        let store = UploadStore::new(&dir);
        let (name, path) = store.save(b"bytes", "leaf.png").unwrap();
        assert_eq!(path, dir.join(&name));
        assert_eq!(fs::read(&path).unwrap(), b"bytes");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn remove_deletes_stored_upload() {
        let dir = std::env::temp_dir().join(format!("uploads-{}", Uuid::new_v4()));
        let store = UploadStore::new(&dir);
        let (name, path) = store.save(b"bytes", "leaf.png").unwrap();
        store.remove(&name).unwrap();
        assert!(!path.exists());
        store.remove(&name).unwrap();
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn save_rejects_unknown_extension() {
        let store = UploadStore::new(std::env::temp_dir());
        assert!(matches!(
            store.save(b"bytes", "leaf.bmp"),
            Err(UploadError::InvalidFormat(_))
        ));
    }
}
