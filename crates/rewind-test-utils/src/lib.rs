//! Test fixtures and assertions for rewind.
//!
//! - **Fixtures**: temporary project trees with files, ignore rules and
//!   checkpoint configuration
//! - **Assertions**: file and tree assertions with readable failure output
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use rewind_test_utils::fixtures::TestProject;
//!
//! #[tokio::test]
//! async fn test_snapshot() {
//!     let project = TestProject::new()
//!         .with_file("app.js", "console.log('hi')")
//!         .with_gitignore("node_modules/\n")
//!         .build();
//!
//!     assert_eq!(project.tree(), vec![".gitignore", "app.js"]);
//! }
//! ```

pub mod assertions;
pub mod fixtures;

pub use fixtures::{BuiltTestProject, TestProject};
