//! Repository reference resolution.
//!
//! Parses a user-supplied reference string into `(owner, name, branch)`.
//! Pure string parsing — no network access.
//!
//! Accepted shapes:
//! - `owner/name` (bare, no scheme)
//! - `https://github.com/owner/name`
//! - `https://github.com/owner/name/tree/branch`

/// Branch used when the reference does not specify one.
pub const DEFAULT_BRANCH: &str = "main";

/// A resolved repository reference. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
    pub branch: String,
}

/// Error returned for reference strings that cannot be resolved.
#[derive(Debug)]
pub struct InvalidReference(pub String);

impl std::fmt::Display for InvalidReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid repository reference: {}", self.0)
    }
}

impl std::error::Error for InvalidReference {}

impl RepoRef {
    /// Parse a reference string into a [`RepoRef`].
    ///
    /// Bare references split on `/` and need at least two segments.
    /// URL references (anything carrying a `://` scheme) need at least
    /// two path segments; a third segment equal to `tree` followed by a
    /// fourth selects the branch.
    pub fn parse(reference: &str) -> Result<Self, InvalidReference> {
        if !reference.contains("://") {
            let parts: Vec<&str> = reference.split('/').collect();
            if parts.len() < 2 || parts[0].is_empty() || parts[1].is_empty() {
                return Err(InvalidReference(reference.to_string()));
            }
            return Ok(Self {
                owner: parts[0].to_string(),
                name: parts[1].to_string(),
                branch: DEFAULT_BRANCH.to_string(),
            });
        }

        // Strip the scheme and host, keep the path.
        let path = reference
            .splitn(2, "://")
            .nth(1)
            .and_then(|rest| rest.split_once('/').map(|(_, p)| p))
            .unwrap_or("");

        let parts: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        if parts.len() < 2 {
            return Err(InvalidReference(reference.to_string()));
        }

        let branch = if parts.len() >= 4 && parts[2] == "tree" {
            parts[3].to_string()
        } else {
            DEFAULT_BRANCH.to_string()
        };

        Ok(Self {
            owner: parts[0].to_string(),
            name: parts[1].to_string(),
            branch,
        })
    }

    /// Cache/index identity for this reference: `owner/name/branch`.
    ///
    /// Two references with the same triple are the same repository state.
    pub fn key(&self) -> String {
        format!("{}/{}/{}", self.owner, self.name, self.branch)
    }

    /// Deterministic archive filename: `owner-name-branch.zip`.
    pub fn archive_filename(&self) -> String {
        format!("{}-{}-{}.zip", self.owner, self.name, self.branch)
    }

    /// Archive download URL under the given host,
    /// e.g. `https://github.com/owner/name/archive/refs/heads/main.zip`.
    pub fn archive_url(&self, host: &str) -> String {
        format!(
            "{}/{}/{}/archive/refs/heads/{}.zip",
            host.trim_end_matches('/'),
            self.owner,
            self.name,
            self.branch
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_reference_defaults_to_main() {
        let r = RepoRef::parse("jlowin/fastmcp").unwrap();
        assert_eq!(r.owner, "jlowin");
        assert_eq!(r.name, "fastmcp");
        assert_eq!(r.branch, "main");
    }

    #[test]
    fn bare_owner_starting_with_http_resolves() {
        // An owner name sharing a prefix with a URL scheme is still a
        // bare reference; only a real scheme selects URL parsing.
        let r = RepoRef::parse("httpx/httpcore").unwrap();
        assert_eq!(r.owner, "httpx");
        assert_eq!(r.name, "httpcore");
        assert_eq!(r.branch, "main");
    }

    #[test]
    fn url_without_branch_defaults_to_main() {
        let r = RepoRef::parse("https://github.com/jlowin/fastmcp").unwrap();
        assert_eq!(r.owner, "jlowin");
        assert_eq!(r.name, "fastmcp");
        assert_eq!(r.branch, "main");
    }

    #[test]
    fn url_with_tree_selects_branch() {
        let r = RepoRef::parse("https://github.com/owner/repo/tree/dev").unwrap();
        assert_eq!(r.branch, "dev");
    }

    #[test]
    fn url_with_trailing_slash() {
        let r = RepoRef::parse("https://github.com/owner/repo/").unwrap();
        assert_eq!(r.owner, "owner");
        assert_eq!(r.name, "repo");
        assert_eq!(r.branch, "main");
    }

    #[test]
    fn tree_without_branch_segment_defaults_to_main() {
        let r = RepoRef::parse("https://github.com/owner/repo/tree").unwrap();
        assert_eq!(r.branch, "main");
    }

    #[test]
    fn extra_path_segments_without_tree_are_ignored() {
        let r = RepoRef::parse("https://github.com/owner/repo/blob/main").unwrap();
        assert_eq!(r.branch, "main");
    }

    #[test]
    fn single_segment_is_invalid() {
        assert!(RepoRef::parse("owner").is_err());
    }

    #[test]
    fn bare_host_url_is_invalid() {
        assert!(RepoRef::parse("https://github.com/").is_err());
        assert!(RepoRef::parse("https://github.com/onlyowner").is_err());
    }

    #[test]
    fn empty_string_is_invalid() {
        assert!(RepoRef::parse("").is_err());
    }

    #[test]
    fn key_is_owner_name_branch() {
        let r = RepoRef::parse("owner/repo").unwrap();
        assert_eq!(r.key(), "owner/repo/main");
    }

    #[test]
    fn archive_url_follows_github_layout() {
        let r = RepoRef::parse("owner/repo").unwrap();
        assert_eq!(
            r.archive_url("https://github.com"),
            "https://github.com/owner/repo/archive/refs/heads/main.zip"
        );
    }

    #[test]
    fn archive_filename_is_deterministic() {
        let r = RepoRef::parse("https://github.com/owner/repo/tree/dev").unwrap();
        assert_eq!(r.archive_filename(), "owner-repo-dev.zip");
    }
}
