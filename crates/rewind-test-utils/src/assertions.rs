//! Assertion helpers with readable failure output.

use std::path::Path;

/// Assert that a file's content equals `expected` exactly, showing a line
/// diff on failure.
pub fn assert_file_equals(path: &Path, expected: &str) {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));

    if content != expected {
        panic!(
            "File {} content does not match expected.\nDiff:\n{}",
            path.display(),
            line_diff(expected, &content)
        );
    }
}

/// Assert that a file contains `expected`.
pub fn assert_file_contains(path: &Path, expected: &str) {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));

    assert!(
        content.contains(expected),
        "File {} does not contain expected text.\nExpected to find: {}\nActual content:\n{}",
        path.display(),
        expected,
        content
    );
}

/// Assert that nothing exists at `path`.
pub fn assert_absent(path: &Path) {
    assert!(
        std::fs::symlink_metadata(path).is_err(),
        "Expected {} to be absent",
        path.display()
    );
}

/// Assert two path lists are equal, showing a diff on failure.
pub fn assert_tree_equals(actual: &[String], expected: &[&str]) {
    let actual = actual.join("\n");
    let expected = expected.join("\n");
    assert_strings_equal(&actual, &expected);
}

/// Assert that two strings are equal, with a diff on failure.
pub fn assert_strings_equal(actual: &str, expected: &str) {
    if actual != expected {
        panic!("Strings are not equal.\nDiff:\n{}", line_diff(expected, actual));
    }
}

fn line_diff(expected: &str, actual: &str) -> String {
    let diff = similar::TextDiff::from_lines(expected, actual);
    let mut output = String::new();

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            similar::ChangeTag::Delete => "-",
            similar::ChangeTag::Insert => "+",
            similar::ChangeTag::Equal => " ",
        };
        output.push_str(sign);
        output.push_str(change.as_str().unwrap_or_default());
        if change.missing_newline() {
            output.push('\n');
        }
    }

    output
}

/// Assert that a result is Ok and extract the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err and extract the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => e,
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_assert_file_equals() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.txt");
        fs::write(&path, "Hello, world!").unwrap();

        assert_file_equals(&path, "Hello, world!");
        assert_file_contains(&path, "world");
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn test_assert_file_equals_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.txt");
        fs::write(&path, "one\n").unwrap();

        assert_file_equals(&path, "two\n");
    }

    #[test]
    fn test_assert_absent() {
        let dir = TempDir::new().unwrap();
        assert_absent(&dir.path().join("missing"));
    }

    #[test]
    fn test_line_diff_marks_changes() {
        let diff = line_diff("a\nb\n", "a\nc\n");
        assert_eq!(diff, " a\n-b\n+c\n");
    }

    #[test]
    fn test_assert_tree_equals() {
        assert_tree_equals(&["a.js".to_string(), "src/b.js".to_string()], &["a.js", "src/b.js"]);
    }

    #[test]
    fn test_assert_ok_and_err_macros() {
        let ok: Result<i32, &str> = Ok(42);
        assert_eq!(assert_ok!(ok), 42);

        let err: Result<i32, &str> = Err("boom");
        assert_eq!(assert_err!(err), "boom");
    }
}
