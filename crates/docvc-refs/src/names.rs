//! Branch name validation following git-style conventions.
//!
//! A valid branch name is non-empty, contains no whitespace or any of
//! `~ ^ : ? * [ \`, contains neither `..` nor `@{`, does not end with `.lock`,
//! and is made of non-empty `/`-separated components that do not start or end
//! with `.`.

use crate::error::{RefError, RefResult};

const FORBIDDEN_CHARS: &[char] = &['~', '^', ':', '?', '*', '[', '\\'];

const FORBIDDEN_SEQUENCES: &[&str] = &["..", "@{"];

/// Validate a branch name.
///
/// ```
/// use docvc_refs::validate_branch_name;
///
/// assert!(validate_branch_name("master").is_ok());
/// assert!(validate_branch_name("feature/merge").is_ok());
/// assert!(validate_branch_name("").is_err());
/// assert!(validate_branch_name("bad..name").is_err());
/// ```
pub fn validate_branch_name(name: &str) -> RefResult<()> {
    let invalid = |reason: String| {
        Err(RefError::InvalidBranchName {
            name: name.to_owned(),
            reason,
        })
    };

    if name.is_empty() {
        return invalid("branch name must not be empty".into());
    }
    if let Some(ch) = name
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || FORBIDDEN_CHARS.contains(c))
    {
        return invalid(format!("contains forbidden character {ch:?}"));
    }
    if let Some(seq) = FORBIDDEN_SEQUENCES.iter().find(|seq| name.contains(**seq)) {
        return invalid(format!("must not contain {seq:?}"));
    }
    if name.ends_with(".lock") {
        return invalid("must not end with \".lock\"".into());
    }
    for component in name.split('/') {
        if component.is_empty() {
            return invalid("components between '/' must not be empty".into());
        }
        if component.starts_with('.') || component.ends_with('.') {
            return invalid(format!("component {component:?} must not start or end with '.'"));
        }
    }

    Ok(())
}
