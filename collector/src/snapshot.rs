use rcc_core::{CoreError, PostDocument};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes one JSON file per post document into a flat directory.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Overwrites any earlier snapshot of the same post.
    pub fn write(&self, document: &PostDocument) -> Result<PathBuf, CoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(document.snapshot_file_name());
        let contents = serde_json::to_vec(document)?;
        fs::write(&path, contents)?;
        debug!("Wrote snapshot {}", path.display());
        Ok(path)
    }

    pub fn read(path: &Path) -> Result<PostDocument, CoreError> {
        let contents = fs::read(path)?;
        Ok(serde_json::from_slice(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcc_core::CommentRecord;

    #[test]
    fn test_write_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("nested"));
        let document = PostDocument {
            subreddit: "worldnews".to_string(),
            post_id: "q1w2e3".to_string(),
            post_age: 3,
            comments: vec![CommentRecord::new("hello", 4, 2.0)],
        };

        let path = writer.write(&document).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "worldnews_q1w2e3_comments.json"
        );
        assert_eq!(SnapshotWriter::read(&path).unwrap(), document);

        let raw: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["comments"][0], serde_json::json!(["hello", 4, 2.0]));
    }
}
