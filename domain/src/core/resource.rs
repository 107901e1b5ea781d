//! Resource-kind inference from upstream request URLs.
//!
//! Error messages read better when they name what was being fetched
//! ("The requested pull request was not found") instead of a bare status.
//! The kind is derived purely from the URL shape and never influences
//! retry or control flow.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// The kind of upstream resource a request URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Repository,
    PullRequest,
    Issue,
    File,
    Commit,
    Branch,
    Workspace,
    User,
    /// Fallback when no known path shape matches.
    Resource,
}

impl ResourceKind {
    /// Human-readable label used inside error details.
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Repository => "repository",
            ResourceKind::PullRequest => "pull request",
            ResourceKind::Issue => "issue",
            ResourceKind::File => "file",
            ResourceKind::Commit => "commit",
            ResourceKind::Branch => "branch",
            ResourceKind::Workspace => "workspace",
            ResourceKind::User => "user",
            ResourceKind::Resource => "resource",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered path shapes; the first match wins.
static RESOURCE_PATTERNS: LazyLock<Vec<(Regex, ResourceKind)>> = LazyLock::new(|| {
    const REPO: &str = r"/repositories/[^/]+/[^/]+";
    [
        (format!(r"{REPO}/?$"), ResourceKind::Repository),
        (format!(r"{REPO}/pullrequests(/|$)"), ResourceKind::PullRequest),
        (format!(r"{REPO}/issues(/|$)"), ResourceKind::Issue),
        (format!(r"{REPO}/src(/|$)"), ResourceKind::File),
        (format!(r"{REPO}/(commit|commits)(/|$)"), ResourceKind::Commit),
        (format!(r"{REPO}/refs/branches(/|$)"), ResourceKind::Branch),
        (r"/workspaces/[^/]+/?$".to_string(), ResourceKind::Workspace),
        (r"/(user|users)(/|$)".to_string(), ResourceKind::User),
    ]
    .into_iter()
    .map(|(pattern, kind)| {
        (
            Regex::new(&pattern).expect("resource pattern is a valid regex"),
            kind,
        )
    })
    .collect()
});

/// Infer the resource kind addressed by `url`.
///
/// Query string and fragment are ignored. Returns [`ResourceKind::Resource`]
/// when nothing matches.
pub fn infer_resource_kind(url: &str) -> ResourceKind {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    RESOURCE_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(path))
        .map(|(_, kind)| *kind)
        .unwrap_or(ResourceKind::Resource)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://api.bitbucket.org/2.0";

    #[test]
    fn test_repository_root() {
        assert_eq!(
            infer_resource_kind(&format!("{BASE}/repositories/acme/widgets")),
            ResourceKind::Repository
        );
        assert_eq!(
            infer_resource_kind(&format!("{BASE}/repositories/acme/widgets/")),
            ResourceKind::Repository
        );
    }

    #[test]
    fn test_repository_sub_paths() {
        let cases = [
            ("pullrequests/12", ResourceKind::PullRequest),
            ("pullrequests/12/comments", ResourceKind::PullRequest),
            ("pullrequests", ResourceKind::PullRequest),
            ("issues/3", ResourceKind::Issue),
            ("src/main/README.md", ResourceKind::File),
            ("commit/abc123", ResourceKind::Commit),
            ("commits/main", ResourceKind::Commit),
            ("refs/branches", ResourceKind::Branch),
            ("refs/branches/feature", ResourceKind::Branch),
        ];
        for (suffix, expected) in cases {
            let url = format!("{BASE}/repositories/acme/widgets/{suffix}");
            assert_eq!(infer_resource_kind(&url), expected, "{url}");
        }
    }

    #[test]
    fn test_workspace_and_user() {
        assert_eq!(
            infer_resource_kind(&format!("{BASE}/workspaces/acme")),
            ResourceKind::Workspace
        );
        assert_eq!(infer_resource_kind(&format!("{BASE}/user")), ResourceKind::User);
        assert_eq!(
            infer_resource_kind(&format!("{BASE}/users/{{abc}}")),
            ResourceKind::User
        );
    }

    #[test]
    fn test_query_string_is_ignored() {
        assert_eq!(
            infer_resource_kind(&format!("{BASE}/repositories/acme/widgets?fields=name")),
            ResourceKind::Repository
        );
        assert_eq!(
            infer_resource_kind(&format!("{BASE}/repositories/acme/widgets/pullrequests?state=OPEN")),
            ResourceKind::PullRequest
        );
    }

    #[test]
    fn test_unknown_shape_falls_back_to_resource() {
        assert_eq!(
            infer_resource_kind(&format!("{BASE}/repositories/acme/widgets/pipelines/x/steps/y/log")),
            ResourceKind::Resource
        );
        assert_eq!(infer_resource_kind("not a url"), ResourceKind::Resource);
        assert_eq!(ResourceKind::Resource.to_string(), "resource");
    }
}
