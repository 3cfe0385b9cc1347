//! Gitignore-style rule matching.
//!
//! Rules come from three sources, always composed in this order:
//!
//! 1. the project's `.gitignore`
//! 2. `additionalIgnores` from the checkpoint configuration
//! 3. a built-in rule excluding the checkpoint directory itself
//!
//! Evaluation follows gitignore precedence: the last matching rule wins, a
//! leading `!` re-includes, and a trailing `/` restricts a rule to
//! directories. A matched directory excludes everything beneath it unless the
//! descendant itself matches a later negation.

use crate::CheckpointResult;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where an ignore rule was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSource {
    /// The project's root ignore file.
    IgnoreFile,
    /// `additionalIgnores` in the checkpoint configuration.
    Config,
    /// Always-on rule protecting the checkpoint directory.
    Builtin,
}

/// A single parsed ignore rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRule {
    /// Pattern without the `!` prefix and trailing `/`.
    pub pattern: String,
    /// `!pattern`: re-include paths matched by earlier rules.
    pub is_negation: bool,
    /// `pattern/`: only match directories (and so everything below them).
    pub is_directory_only: bool,
    /// Position in the composed rule list.
    pub source_order: usize,
    pub source: RuleSource,
}

impl IgnoreRule {
    /// Parse one ignore-file line.
    ///
    /// Returns `None` for blank, whitespace-only and comment lines. Leading
    /// whitespace is part of the pattern; trailing whitespace is not, unless
    /// escaped as `\ `.
    pub fn parse(line: &str, source_order: usize, source: RuleSource) -> Option<Self> {
        let line = trim_trailing(line);
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (is_negation, rest) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        let (is_directory_only, pattern) = match rest.strip_suffix('/') {
            Some(pattern) if !pattern.is_empty() => (true, pattern),
            _ => (false, rest),
        };
        if pattern.is_empty() {
            return None;
        }

        Some(Self {
            pattern: pattern.to_string(),
            is_negation,
            is_directory_only,
            source_order,
            source,
        })
    }

    /// Render the rule back into gitignore syntax.
    pub fn to_line(&self) -> String {
        let mut line = String::with_capacity(self.pattern.len() + 2);
        if self.is_negation {
            line.push('!');
        }
        line.push_str(&self.pattern);
        if self.is_directory_only {
            line.push('/');
        }
        line
    }
}

fn trim_trailing(line: &str) -> &str {
    let trimmed = line.trim_end();
    let escaped_space = trimmed.ends_with('\\') && line[trimmed.len()..].starts_with(' ');
    if escaped_space {
        &line[..trimmed.len() + 1]
    } else {
        trimmed
    }
}

/// Parse every rule in `content`, numbering them from `start_order`.
pub fn parse_rules(content: &str, source: RuleSource, start_order: usize) -> Vec<IgnoreRule> {
    content
        .lines()
        .filter_map(|line| IgnoreRule::parse(line, 0, source))
        .enumerate()
        .map(|(i, mut rule)| {
            rule.source_order = start_order + i;
            rule
        })
        .collect()
}

/// Compose the rule list from the ignore file, config rules and the built-in
/// checkpoint directory exclusion.
pub fn compose_rules(
    ignore_file: Option<&str>,
    additional: &[String],
    checkpoint_dir_name: &str,
) -> Vec<IgnoreRule> {
    let mut rules = ignore_file
        .map(|content| parse_rules(content, RuleSource::IgnoreFile, 0))
        .unwrap_or_default();

    for line in additional {
        if let Some(rule) = IgnoreRule::parse(line, rules.len(), RuleSource::Config) {
            rules.push(rule);
        }
    }

    rules.push(IgnoreRule {
        pattern: checkpoint_dir_name.to_string(),
        is_negation: false,
        is_directory_only: true,
        source_order: rules.len(),
        source: RuleSource::Builtin,
    });

    rules
}

/// A compiled, immutable rule set rooted at the project directory.
#[derive(Debug)]
pub struct IgnoreMatcher {
    root: PathBuf,
    rules: Vec<IgnoreRule>,
    gitignore: Gitignore,
    /// Root-level checkpoint directory; excluded whatever the other rules say.
    checkpoint_dir: Option<String>,
}

impl IgnoreMatcher {
    /// Compile rules in source order.
    ///
    /// Rules whose glob does not compile are dropped with a warning.
    pub fn compile(root: &Path, rules: Vec<IgnoreRule>) -> CheckpointResult<Self> {
        let mut builder = GitignoreBuilder::new(root);
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            match builder.add_line(None, &rule.to_line()) {
                Ok(_) => compiled.push(rule),
                Err(e) => warn!("Skipping invalid ignore rule {:?}: {}", rule.pattern, e),
            }
        }
        let gitignore = builder.build()?;
        let rules = compiled;
        let checkpoint_dir = rules
            .iter()
            .find(|rule| rule.source == RuleSource::Builtin)
            .map(|rule| rule.pattern.clone());

        debug!(root = %root.display(), rules = rules.len(), "Compiled ignore rules");

        Ok(Self {
            root: root.to_path_buf(),
            rules,
            gitignore,
            checkpoint_dir,
        })
    }

    /// The project root the rules are anchored at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The ordered rule list.
    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    /// Decide whether a project-relative, `/`-separated path is excluded.
    ///
    /// The project root itself (empty path) is never ignored. The checkpoint
    /// directory and everything in it always are.
    pub fn is_ignored(&self, relative: &str, is_dir: bool) -> bool {
        let relative = relative.trim_start_matches("./").trim_matches('/');
        if relative.is_empty() {
            return false;
        }
        if let Some(dir) = &self.checkpoint_dir {
            let inside = relative
                .strip_prefix(dir.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));
            if inside {
                return true;
            }
        }

        self.gitignore
            .matched_path_or_any_parents(Path::new(relative), is_dir)
            .is_ignore()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(gitignore: &str, additional: &[&str]) -> IgnoreMatcher {
        let additional: Vec<String> = additional.iter().map(|s| s.to_string()).collect();
        let rules = compose_rules(Some(gitignore), &additional, ".checkpoints");
        IgnoreMatcher::compile(Path::new("/project"), rules).unwrap()
    }

    #[test]
    fn test_parse_skips_blank_and_comments() {
        let rules = parse_rules("# comment\n\n   \n*.log\n", RuleSource::IgnoreFile, 0);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].pattern, "*.log");
        assert_eq!(rules[0].source_order, 0);
    }

    #[test]
    fn test_parse_negation_and_directory() {
        let rule = IgnoreRule::parse("!build/", 3, RuleSource::Config).unwrap();
        assert!(rule.is_negation);
        assert!(rule.is_directory_only);
        assert_eq!(rule.pattern, "build");
        assert_eq!(rule.to_line(), "!build/");
    }

    #[test]
    fn test_parse_bare_markers_are_blank() {
        assert!(IgnoreRule::parse("!", 0, RuleSource::IgnoreFile).is_none());
        assert!(IgnoreRule::parse("  \t ", 0, RuleSource::IgnoreFile).is_none());
    }

    #[test]
    fn test_parse_whitespace_handling() {
        let rule = IgnoreRule::parse("  leading.txt", 0, RuleSource::IgnoreFile).unwrap();
        assert_eq!(rule.pattern, "  leading.txt");

        let rule = IgnoreRule::parse("build/  \t", 0, RuleSource::IgnoreFile).unwrap();
        assert_eq!(rule.pattern, "build");
        assert!(rule.is_directory_only);

        let rule = IgnoreRule::parse("trailing\\ ", 0, RuleSource::IgnoreFile).unwrap();
        assert_eq!(rule.pattern, "trailing\\ ");

        let rule = IgnoreRule::parse("trailing\\    ", 0, RuleSource::IgnoreFile).unwrap();
        assert_eq!(rule.pattern, "trailing\\ ");
    }

    #[test]
    fn test_escaped_trailing_space_matches() {
        let m = matcher("name\\ \n", &[]);
        assert!(m.is_ignored("name ", false));
        assert!(!m.is_ignored("name", false));
    }

    #[test]
    fn test_compose_order() {
        let rules = compose_rules(Some("*.log\n"), &["*.tmp".to_string()], ".checkpoints");
        let sources: Vec<_> = rules.iter().map(|r| r.source).collect();
        assert_eq!(
            sources,
            vec![RuleSource::IgnoreFile, RuleSource::Config, RuleSource::Builtin]
        );
        let orders: Vec<_> = rules.iter().map(|r| r.source_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_negation_reincludes() {
        let m = matcher("*.env\n!.env.example\n*.log\n!important.log\n", &[]);
        assert!(m.is_ignored(".env", false));
        assert!(!m.is_ignored(".env.example", false));
        assert!(m.is_ignored("debug.log", false));
        assert!(!m.is_ignored("important.log", false));
    }

    #[test]
    fn test_wildcard_prefix_negation() {
        let m = matcher(".env*\n!.env.example\n", &[]);
        assert!(m.is_ignored(".env", false));
        assert!(m.is_ignored(".env.local", false));
        assert!(!m.is_ignored(".env.example", false));
    }

    #[test]
    fn test_directory_only_propagates() {
        let m = matcher("node_modules/\n", &[]);
        assert!(m.is_ignored("node_modules", true));
        assert!(m.is_ignored("node_modules/package.json", false));
        assert!(m.is_ignored("packages/app/node_modules/lib/index.js", false));
        // A plain file with the same name is not a directory
        assert!(!m.is_ignored("node_modules", false));
    }

    #[test]
    fn test_nested_patterns() {
        let m = matcher(
            "build\nsrc/**/*.tmp\ndocs/private\n**/temp\nvendor/**/cache\n",
            &[],
        );
        assert!(m.is_ignored("build", true));
        assert!(m.is_ignored("build/output.js", false));
        assert!(m.is_ignored("src/components/test.tmp", false));
        assert!(!m.is_ignored("src/components/component.js", false));
        assert!(m.is_ignored("docs/private/secret.md", false));
        assert!(!m.is_ignored("docs/public/readme.md", false));
        assert!(!m.is_ignored("other/docs/private", true));
        assert!(m.is_ignored("deep/nested/temp", true));
        assert!(m.is_ignored("vendor/lib/cache", true));
    }

    #[test]
    fn test_slashless_pattern_matches_any_depth() {
        let m = matcher("*.swp\n*~\n.DS_Store\n", &[]);
        assert!(m.is_ignored("file.swp", false));
        assert!(m.is_ignored("a/b/file.swp", false));
        assert!(m.is_ignored("backup~", false));
        assert!(m.is_ignored("nested/.DS_Store", false));
        assert!(!m.is_ignored("style.css", false));
    }

    #[test]
    fn test_config_rules_apply() {
        let m = matcher("*.log\n", &["*.tmp", "cache/", "secret.txt"]);
        assert!(m.is_ignored("debug.log", false));
        assert!(m.is_ignored("temp.tmp", false));
        assert!(m.is_ignored("cache", true));
        assert!(m.is_ignored("secret.txt", false));
        assert!(!m.is_ignored("app.js", false));
    }

    #[test]
    fn test_checkpoint_dir_always_ignored() {
        let m = matcher("", &[]);
        assert!(m.is_ignored(".checkpoints", true));
        assert!(m.is_ignored(".checkpoints/config.json", false));
        assert!(!m.is_ignored("app.js", false));
    }

    #[test]
    fn test_checkpoint_dir_cannot_be_reincluded() {
        let m = matcher("!.checkpoints/\n", &["!.checkpoints"]);
        assert!(m.is_ignored(".checkpoints", true));

        let m = matcher(
            "!.checkpoints/config.json\n",
            &["!.checkpoints/snapshots/", "!.checkpoints/**"],
        );
        assert!(m.is_ignored(".checkpoints", true));
        assert!(m.is_ignored(".checkpoints/config.json", false));
        assert!(m.is_ignored(".checkpoints/snapshots", true));
        assert!(m.is_ignored(".checkpoints/snapshots/a/manifest.json", false));
        assert!(!m.is_ignored(".checkpoints-notes.md", false));
    }

    #[test]
    fn test_root_is_never_ignored() {
        let m = matcher("*\n", &[]);
        assert!(!m.is_ignored("", true));
        assert!(m.is_ignored("anything.txt", false));
    }

    #[test]
    fn test_invalid_rule_is_skipped() {
        let m = matcher("[unclosed\n*.log\n", &[]);
        assert_eq!(m.rules().len(), 2);
        assert!(m.is_ignored("debug.log", false));
    }

    #[test]
    fn test_special_characters() {
        let m = matcher("*.log\n", &[]);
        assert!(!m.is_ignored("file with spaces.js", false));
        assert!(!m.is_ignored("file.with.dots.js", false));
        assert!(m.is_ignored("special (file).log", false));
    }
}
