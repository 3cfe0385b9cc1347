//! Snapshot manifest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Metadata describing one snapshot. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Project-relative, `/`-separated paths, sorted.
    #[serde(deserialize_with = "sorted_files")]
    pub files: Vec<String>,
    pub file_count: usize,
    /// Sum of the on-disk sizes of `files` at capture time.
    pub total_size: u64,
}

/// Manifests written by other tools may list files in any order.
fn sorted_files<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let mut files = Vec::<String>::deserialize(deserializer)?;
    files.sort();
    Ok(files)
}

impl Manifest {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        timestamp: DateTime<Utc>,
        mut files: Vec<String>,
        total_size: u64,
    ) -> Self {
        files.sort();
        Self {
            name: name.into(),
            description,
            timestamp,
            file_count: files.len(),
            files,
            total_size,
        }
    }

    /// Whether the snapshot captured `path`.
    pub fn contains_file(&self, path: &str) -> bool {
        self.files
            .binary_search_by(|f| f.as_str().cmp(path))
            .is_ok()
    }

    /// Description for display, with a placeholder for unnamed snapshots.
    pub fn display_description(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("Manual checkpoint")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> Manifest {
        Manifest::new(
            "test_2024-01-01T00-00-00",
            Some("Test".to_string()),
            Utc::now(),
            vec!["src/b.js".into(), "a.js".into(), "src/a.js".into()],
            42,
        )
    }

    #[test]
    fn test_files_sorted_and_counted() {
        let m = manifest();
        assert_eq!(m.files, vec!["a.js", "src/a.js", "src/b.js"]);
        assert_eq!(m.file_count, 3);
        assert!(m.contains_file("src/a.js"));
        assert!(!m.contains_file("src"));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(manifest()).unwrap();
        assert_eq!(json["fileCount"], 3);
        assert_eq!(json["totalSize"], 42);
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_display_description() {
        let mut m = manifest();
        assert_eq!(m.display_description(), "Test");
        m.description = None;
        assert_eq!(m.display_description(), "Manual checkpoint");
    }

    #[test]
    fn test_missing_description_parses() {
        let json = r#"{"name":"x","timestamp":"2024-01-01T00:00:00.000Z","files":[],"fileCount":0,"totalSize":0}"#;
        let m: Manifest = serde_json::from_str(json).unwrap();
        assert!(m.description.is_none());
    }

    #[test]
    fn test_unsorted_files_are_sorted_on_load() {
        let json = r#"{"name":"x","timestamp":"2024-01-01T00:00:00.000Z","files":["z.js","src/b.js","a.js","src/a.js"],"fileCount":4,"totalSize":0}"#;
        let m: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(m.files, vec!["a.js", "src/a.js", "src/b.js", "z.js"]);
        assert!(m.contains_file("z.js"));
        assert!(m.contains_file("a.js"));
        assert!(m.contains_file("src/b.js"));
    }
}
