//! Checkpoint name generation.

use crate::Config;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// UTC timestamp suffix appended to every checkpoint name.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// Maximum length of a name derived from a description.
pub const DESCRIPTION_SLUG_LEN: usize = 30;

const TIMESTAMP_PLACEHOLDER: &str = "{timestamp}";
const FALLBACK_PREFIX: &str = "checkpoint";

static NAME_CHARS: OnceLock<Regex> = OnceLock::new();
static DESCRIPTION_CHARS: OnceLock<Regex> = OnceLock::new();

fn name_chars() -> &'static Regex {
    NAME_CHARS.get_or_init(|| {
        Regex::new(r"[^A-Za-z0-9_-]").expect("Invalid regex pattern - this is a compile-time constant")
    })
}

fn description_chars() -> &'static Regex {
    DESCRIPTION_CHARS.get_or_init(|| {
        Regex::new(r"[^a-z0-9]+").expect("Invalid regex pattern - this is a compile-time constant")
    })
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
pub fn slugify_name(name: &str) -> String {
    name_chars().replace_all(name, "_").into_owned()
}

/// Turn a free-form description into a short name.
///
/// Lower-cases, collapses non-alphanumeric runs into one `_`, trims edge
/// underscores and truncates to [`DESCRIPTION_SLUG_LEN`] characters.
pub fn slugify_description(description: &str) -> String {
    let lower = description.to_lowercase();
    let slug = description_chars().replace_all(&lower, "_");
    let slug = slug.trim_matches('_');
    // Only ASCII remains, so byte truncation is char-safe.
    slug[..slug.len().min(DESCRIPTION_SLUG_LEN)].to_string()
}

/// The name prefix a template renders to, without the timestamp.
pub fn template_prefix(template: &str) -> String {
    let prefix = match template.find(TIMESTAMP_PLACEHOLDER) {
        Some(pos) => &template[..pos],
        None => template,
    };
    let prefix = slugify_name(prefix.trim_end_matches(['_', '-']));
    if prefix.is_empty() {
        FALLBACK_PREFIX.to_string()
    } else {
        prefix
    }
}

/// Format the timestamp suffix.
pub fn timestamp_suffix(now: DateTime<Utc>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// Build a checkpoint name.
///
/// An explicit name wins; otherwise the description is used when
/// `auto_name` is enabled, falling back to the configured template.
pub fn checkpoint_name(
    name: Option<&str>,
    description: Option<&str>,
    config: &Config,
    now: DateTime<Utc>,
) -> String {
    let explicit = name.map(str::trim).filter(|n| !n.is_empty());

    let base = match explicit {
        Some(name) => slugify_name(name),
        None => description
            .filter(|_| config.auto_name)
            .map(slugify_description)
            .filter(|slug| !slug.is_empty())
            .unwrap_or_else(|| template_prefix(&config.name_template)),
    };

    format!("{}_{}", base, timestamp_suffix(now))
}

/// Disambiguate a name that collided with an existing checkpoint.
pub fn with_counter(name: &str, attempt: u32) -> String {
    if attempt <= 1 {
        name.to_string()
    } else {
        format!("{}_{}", name, attempt)
    }
}
