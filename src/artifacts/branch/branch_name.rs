use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use crate::errors::RepositoryError;
use anyhow::Context;
use std::path::PathBuf;

pub const REF_PREFIX: &str = "refs/heads/";

/// A validated branch name, possibly containing `/`-separated groups
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: impl Into<String>) -> anyhow::Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(RepositoryError::validation("Branch name cannot be empty.").into());
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"))?;

        if re.is_match(&name) {
            Err(RepositoryError::validation(format!("Invalid branch name: {}", name)).into())
        } else {
            Ok(Self(name))
        }
    }

    /// Parse the target of a `ref: refs/heads/<name>` symbolic reference
    pub fn try_parse_ref_path(ref_path: &str) -> anyhow::Result<Self> {
        let name = ref_path.strip_prefix(REF_PREFIX).with_context(|| {
            format!("symbolic ref must start with '{}', got '{}'", REF_PREFIX, ref_path)
        })?;

        Self::try_parse(name)
    }

    pub fn to_ref_path(&self) -> String {
        format!("{}{}", REF_PREFIX, self.0)
    }

    /// Location of the branch file relative to the heads directory
    pub fn to_path(&self) -> PathBuf {
        self.0.split('/').collect()
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
