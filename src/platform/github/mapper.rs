use crate::platform::types;

/// Map the collaborator-permission response to a permission level.
pub fn map_permission(response: &serde_json::Value) -> types::ActorPermission {
    response["permission"]
        .as_str()
        .map(types::ActorPermission::from)
        .unwrap_or(types::ActorPermission::None)
}

/// Map octocrab PullRequest to our platform PullRequestRef type.
pub fn map_pull_request(pr: octocrab::models::pulls::PullRequest) -> types::PullRequestRef {
    types::PullRequestRef {
        number: pr.number,
        head_repo_full_name: pr.head.repo.as_ref().and_then(|r| r.full_name.clone()),
        head_ref: pr.head.ref_field.clone(),
        base_ref: pr.base.ref_field.clone(),
    }
}
