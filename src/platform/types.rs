use std::fmt;

/// Repository permission level of a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorPermission {
    None,
    Read,
    Triage,
    Write,
    Maintain,
    Admin,
}

impl ActorPermission {
    /// Only `write` and `admin` may trigger a snapshot release.
    pub fn is_sufficient(self) -> bool {
        matches!(self, ActorPermission::Write | ActorPermission::Admin)
    }
}

impl From<&str> for ActorPermission {
    fn from(value: &str) -> Self {
        match value {
            "admin" => ActorPermission::Admin,
            "maintain" => ActorPermission::Maintain,
            "write" => ActorPermission::Write,
            "triage" => ActorPermission::Triage,
            "read" => ActorPermission::Read,
            _ => ActorPermission::None,
        }
    }
}

impl fmt::Display for ActorPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActorPermission::None => "none",
            ActorPermission::Read => "read",
            ActorPermission::Triage => "triage",
            ActorPermission::Write => "write",
            ActorPermission::Maintain => "maintain",
            ActorPermission::Admin => "admin",
        };
        f.write_str(s)
    }
}

/// The parts of a pull request needed for the fork check and checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub number: u64,
    /// `None` when the head repository has been deleted.
    pub head_repo_full_name: Option<String>,
    pub head_ref: String,
    pub base_ref: String,
}

impl PullRequestRef {
    pub fn is_from_fork(&self, base_repo_full_name: &str) -> bool {
        self.head_repo_full_name.as_deref() != Some(base_repo_full_name)
    }
}

/// Reactions the action leaves on the triggering comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Processing started.
    Eyes,
    /// Snapshot published.
    Rocket,
    /// Run failed.
    Confused,
}

impl Reaction {
    pub fn content(self) -> &'static str {
        match self {
            Reaction::Eyes => "eyes",
            Reaction::Rocket => "rocket",
            Reaction::Confused => "confused",
        }
    }
}
