//! Temporary project trees for checkpoint tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Directory excluded from [`BuiltTestProject::tree`].
const CHECKPOINT_DIR: &str = ".checkpoints";

/// A temporary project with a configurable file structure.
///
/// The directory is removed when the built project is dropped.
///
/// # Example
///
/// ```rust
/// use rewind_test_utils::fixtures::TestProject;
///
/// let project = TestProject::new()
///     .with_file("src/index.js", "export {}")
///     .with_dir("assets")
///     .build();
///
/// assert!(project.file_exists("src/index.js"));
/// ```
pub struct TestProject {
    temp_dir: TempDir,
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: Vec<PathBuf>,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            files: BTreeMap::new(),
            dirs: Vec::new(),
        }
    }

    /// Add a file. Parent directories are created automatically.
    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        self.files
            .insert(path.as_ref().to_path_buf(), contents.into().into_bytes());
        self
    }

    /// Add a file with arbitrary bytes.
    pub fn with_binary_file(mut self, path: impl AsRef<Path>, contents: &[u8]) -> Self {
        self.files
            .insert(path.as_ref().to_path_buf(), contents.to_vec());
        self
    }

    /// Add an empty directory.
    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.dirs.push(path.as_ref().to_path_buf());
        self
    }

    pub fn with_gitignore(self, contents: &str) -> Self {
        self.with_file(".gitignore", contents)
    }

    /// Write `.checkpoints/config.json` verbatim.
    pub fn with_checkpoint_config(self, json: &str) -> Self {
        self.with_file(Path::new(CHECKPOINT_DIR).join("config.json"), json)
    }

    /// A small web project: sources, a dependency directory, logs and
    /// environment files.
    pub fn with_web_project(self) -> Self {
        self.with_file("app.js", content::APP_JS)
            .with_file("package.json", content::PACKAGE_JSON)
            .with_file("src/components/Button.js", content::BUTTON_JS)
            .with_file("src/utils/helper.js", "export const helper = () => {};\n")
            .with_file("node_modules/react/index.js", "module.exports = {};\n")
            .with_file("debug.log", "debug output\n")
            .with_file(".env", "SECRET=1\n")
            .with_file(".env.example", "SECRET=\n")
            .with_gitignore(content::WEB_GITIGNORE)
    }

    /// Create everything on disk.
    pub fn build(self) -> BuiltTestProject {
        let root = self.temp_dir.path();

        for dir in &self.dirs {
            let full_path = root.join(dir);
            fs::create_dir_all(&full_path).unwrap_or_else(|e| {
                panic!("Failed to create directory {}: {}", full_path.display(), e)
            });
        }

        for (path, contents) in &self.files {
            let full_path = root.join(path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent).unwrap_or_else(|e| {
                    panic!(
                        "Failed to create parent directory for {}: {}",
                        full_path.display(),
                        e
                    )
                });
            }
            fs::write(&full_path, contents)
                .unwrap_or_else(|e| panic!("Failed to write file {}: {}", full_path.display(), e));
        }

        BuiltTestProject {
            temp_dir: self.temp_dir,
        }
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// A test project created on disk.
pub struct BuiltTestProject {
    temp_dir: TempDir,
}

impl BuiltTestProject {
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn checkpoint_dir(&self) -> PathBuf {
        self.path().join(CHECKPOINT_DIR)
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> String {
        let full_path = self.path().join(path.as_ref());
        fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {}", full_path.display(), e))
    }

    pub fn file_exists(&self, path: impl AsRef<Path>) -> bool {
        self.path().join(path.as_ref()).exists()
    }

    /// Write a file, creating parent directories.
    pub fn write_file(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) {
        let full_path = self.path().join(path.as_ref());
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).ok();
        }
        fs::write(&full_path, contents.as_ref())
            .unwrap_or_else(|e| panic!("Failed to write file {}: {}", full_path.display(), e));
    }

    pub fn delete_file(&self, path: impl AsRef<Path>) {
        let full_path = self.path().join(path.as_ref());
        fs::remove_file(&full_path)
            .unwrap_or_else(|e| panic!("Failed to delete file {}: {}", full_path.display(), e));
    }

    pub fn create_dir(&self, path: impl AsRef<Path>) {
        let full_path = self.path().join(path.as_ref());
        fs::create_dir_all(&full_path)
            .unwrap_or_else(|e| panic!("Failed to create directory {}: {}", full_path.display(), e));
    }

    /// Every regular file outside the checkpoint directory, as sorted
    /// `/`-separated relative paths.
    pub fn tree(&self) -> Vec<String> {
        let root = self.path();
        let mut files: Vec<String> = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| e.depth() != 1 || e.file_name() != CHECKPOINT_DIR)
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let relative = e.path().strip_prefix(root).ok()?;
                let parts: Vec<_> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                Some(parts.join("/"))
            })
            .collect();
        files.sort();
        files
    }

    /// Names of snapshot directories on disk, sorted.
    pub fn snapshot_dirs(&self) -> Vec<String> {
        let dir = self.checkpoint_dir().join("snapshots");
        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Common test file contents.
pub mod content {
    pub const APP_JS: &str = "const app = require('./src/utils/helper');\nconsole.log('app');\n";

    pub const BUTTON_JS: &str = "export const Button = () => '<button />';\n";

    pub const PACKAGE_JSON: &str = r#"{
  "name": "test-project",
  "version": "1.0.0"
}
"#;

    pub const WEB_GITIGNORE: &str = "node_modules/\n*.log\n.env*\n!.env.example\n";
}
