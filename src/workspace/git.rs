use std::path::Path;

use git2::{
    build::CheckoutBuilder, Cred, FetchOptions, IndexAddOption, PushOptions, RemoteCallbacks,
    Repository, Signature,
};

use crate::error::{AppError, Result};

/// Identity used for snapshot commits.
pub const BOT_NAME: &str = "github-actions[bot]";
pub const BOT_EMAIL: &str = "41898282+github-actions[bot]@users.noreply.github.com";

/// Validate a branch name to prevent argument injection.
/// Rejects names starting with `-` as defence in depth.
fn validate_branch_name(name: &str) -> Result<()> {
    if name.starts_with('-') {
        return Err(AppError::Git(format!(
            "Invalid branch name (starts with '-'): {name}"
        )));
    }
    if name.is_empty() {
        return Err(AppError::Git("Branch name is empty".to_string()));
    }
    Ok(())
}

/// Build `FetchOptions` that authenticate via credential callback.
/// The token is captured by the closure and never written to disk.
fn make_fetch_options(token: &str) -> FetchOptions<'_> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, _username_from_url, _allowed_types| {
        Cred::userpass_plaintext("x-access-token", token)
    });
    let mut opts = FetchOptions::new();
    opts.remote_callbacks(callbacks);
    opts
}

/// Build `PushOptions` that authenticate via credential callback.
fn make_push_options(token: &str) -> PushOptions<'_> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, _username_from_url, _allowed_types| {
        Cred::userpass_plaintext("x-access-token", token)
    });
    let mut opts = PushOptions::new();
    opts.remote_callbacks(callbacks);
    opts
}

/// Refspec that overwrites the remote branch regardless of history.
pub fn force_push_refspec(branch_name: &str) -> String {
    format!("+refs/heads/{branch_name}:refs/heads/{branch_name}")
}

/// Fetch a remote branch into `refs/remotes/origin/<branch>`.
pub async fn fetch_branch(dir: &Path, branch_name: &str, token: &str) -> Result<()> {
    validate_branch_name(branch_name)?;

    let dir = dir.to_path_buf();
    let branch_name = branch_name.to_string();
    let token = token.to_string();

    tokio::task::spawn_blocking(move || {
        let repo = Repository::discover(&dir)?;
        let mut remote = repo.find_remote("origin")?;
        let refspec = format!("+refs/heads/{branch_name}:refs/remotes/origin/{branch_name}");
        let mut fetch_opts = make_fetch_options(&token);
        remote.fetch(&[&refspec], Some(&mut fetch_opts), None)?;
        Ok(())
    })
    .await
    .map_err(|e| AppError::Git(format!("Fetch task panicked: {e}")))?
}

/// Fetch a specific remote branch and check it out.
pub async fn fetch_and_checkout(dir: &Path, branch_name: &str, token: &str) -> Result<()> {
    fetch_branch(dir, branch_name, token).await?;

    let dir = dir.to_path_buf();
    let branch_name = branch_name.to_string();

    tokio::task::spawn_blocking(move || {
        let repo = Repository::discover(&dir)?;

        // Find the fetched commit
        let remote_ref = format!("refs/remotes/origin/{branch_name}");
        let reference = repo.find_reference(&remote_ref)?;
        let commit = reference.peel_to_commit()?;

        // Create (or reset) a local branch pointing at that commit
        repo.branch(&branch_name, &commit, true)?;

        // Checkout the branch
        let obj = repo.revparse_single(&format!("refs/heads/{branch_name}"))?;
        repo.checkout_tree(&obj, None)?;
        repo.set_head(&format!("refs/heads/{branch_name}"))?;

        Ok(())
    })
    .await
    .map_err(|e| AppError::Git(format!("Fetch-and-checkout task panicked: {e}")))?
}

/// Name of the checked-out branch, `None` when HEAD is detached.
pub async fn current_branch(dir: &Path) -> Result<Option<String>> {
    let dir = dir.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let repo = Repository::discover(&dir)?;
        let head = repo.head()?;
        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(str::to_string))
    })
    .await
    .map_err(|e| AppError::Git(format!("Current-branch task panicked: {e}")))?
}

/// Overwrite `path` (relative to `dir`) in the working tree and index with
/// its content at `revision`.
pub async fn restore_path(dir: &Path, revision: &str, path: &str) -> Result<()> {
    let dir = dir.to_path_buf();
    let revision = revision.to_string();
    let path = path.to_string();

    tokio::task::spawn_blocking(move || {
        let repo = Repository::discover(&dir)?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| AppError::Git("Repository has no working tree".to_string()))?
            .canonicalize()?;
        let target = dir.canonicalize()?.join(&path);
        let pathspec = target
            .strip_prefix(&workdir)
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or(path);

        let tree = repo.revparse_single(&revision)?.peel_to_tree()?;
        let mut checkout = CheckoutBuilder::new();
        checkout.force().path(&pathspec);
        repo.checkout_tree(tree.as_object(), Some(&mut checkout))?;
        Ok(())
    })
    .await
    .map_err(|e| AppError::Git(format!("Restore task panicked: {e}")))?
}

/// Set `user.name` and `user.email` in the repository config.
pub async fn configure_identity(dir: &Path, name: &str, email: &str) -> Result<()> {
    let dir = dir.to_path_buf();
    let name = name.to_string();
    let email = email.to_string();

    tokio::task::spawn_blocking(move || {
        let repo = Repository::discover(&dir)?;
        let mut config = repo.config()?;
        config.set_str("user.name", &name)?;
        config.set_str("user.email", &email)?;
        Ok(())
    })
    .await
    .map_err(|e| AppError::Git(format!("Configure-identity task panicked: {e}")))?
}

/// Stage all changes, including deletions.
pub async fn add_all(dir: &Path) -> Result<()> {
    let dir = dir.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let repo = Repository::discover(&dir)?;
        let mut index = repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;
        Ok(())
    })
    .await
    .map_err(|e| AppError::Git(format!("Add-all task panicked: {e}")))?
}

/// Commit the index on top of HEAD, authored by the bot identity.
pub async fn commit(dir: &Path, message: &str) -> Result<()> {
    let dir = dir.to_path_buf();
    let message = message.to_string();

    tokio::task::spawn_blocking(move || {
        let repo = Repository::discover(&dir)?;
        let sig = Signature::now(BOT_NAME, BOT_EMAIL)?;
        let mut index = repo.index()?;
        let tree_oid = index.write_tree()?;
        let tree = repo.find_tree(tree_oid)?;
        let head = repo.head()?;
        let parent = head.peel_to_commit()?;
        repo.commit(Some("HEAD"), &sig, &sig, &message, &tree, &[&parent])?;
        Ok(())
    })
    .await
    .map_err(|e| AppError::Git(format!("Commit task panicked: {e}")))?
}

/// Create (or reset) a branch at HEAD and check it out.
pub async fn create_branch(dir: &Path, branch_name: &str) -> Result<()> {
    validate_branch_name(branch_name)?;

    let dir = dir.to_path_buf();
    let branch_name = branch_name.to_string();

    tokio::task::spawn_blocking(move || {
        let repo = Repository::discover(&dir)?;
        let head = repo.head()?;
        let commit = head.peel_to_commit()?;
        let refname = format!("refs/heads/{branch_name}");
        let already_current = head.name() == Some(refname.as_str());
        if !already_current {
            repo.branch(&branch_name, &commit, true)?;
        }
        let obj = repo.revparse_single(&refname)?;
        repo.checkout_tree(&obj, None)?;
        repo.set_head(&refname)?;
        Ok(())
    })
    .await
    .map_err(|e| AppError::Git(format!("Create-branch task panicked: {e}")))?
}

/// Push with force, replacing whatever the remote branch held.
pub async fn force_push(dir: &Path, branch_name: &str, token: &str) -> Result<()> {
    validate_branch_name(branch_name)?;

    let dir = dir.to_path_buf();
    let branch_name = branch_name.to_string();
    let token = token.to_string();

    tokio::task::spawn_blocking(move || {
        let repo = Repository::discover(&dir)?;
        let mut remote = repo.find_remote("origin")?;
        let refspec = force_push_refspec(&branch_name);
        let mut push_opts = make_push_options(&token);
        remote.push(&[&refspec], Some(&mut push_opts))?;
        Ok(())
    })
    .await
    .map_err(|e| AppError::Git(format!("Force-push task panicked: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn init_repo_with_commit(dir: &Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        fs::create_dir_all(dir.join(".changeset")).unwrap();
        fs::write(dir.join(".changeset/brave-fox.md"), "---\n\"a\": patch\n---\n").unwrap();
        fs::write(dir.join("package.json"), "{}").unwrap();
        {
            let mut index = repo.index().unwrap();
            index
                .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
                .unwrap();
            index.write().unwrap();
            let tree_oid = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_oid).unwrap();
            let sig = Signature::now("test", "test@example.com").unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
                .unwrap();
        }
        repo
    }

    #[test]
    fn test_validate_branch_name_rejects_dash_prefix() {
        assert!(validate_branch_name("-evil").is_err());
        assert!(validate_branch_name("--upload-pack").is_err());
        assert!(validate_branch_name("").is_err());
    }

    #[test]
    fn test_validate_branch_name_accepts_normal() {
        assert!(validate_branch_name("main").is_ok());
        assert!(validate_branch_name("changeset-release/main").is_ok());
        assert!(validate_branch_name("preview-123").is_ok());
    }

    #[test]
    fn test_force_push_refspec() {
        assert_eq!(
            force_push_refspec("preview-123"),
            "+refs/heads/preview-123:refs/heads/preview-123"
        );
    }

    #[tokio::test]
    async fn test_restore_path_recovers_consumed_changesets() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = init_repo_with_commit(tmp.path());
        let head = repo.head().unwrap().peel_to_commit().unwrap().id().to_string();

        fs::remove_file(tmp.path().join(".changeset/brave-fox.md")).unwrap();
        fs::write(tmp.path().join("package.json"), "{\"changed\":true}").unwrap();

        restore_path(tmp.path(), &head, ".changeset").await.unwrap();

        assert!(tmp.path().join(".changeset/brave-fox.md").exists());
        // Paths outside the restored directory are left alone
        let pkg = fs::read_to_string(tmp.path().join("package.json")).unwrap();
        assert_eq!(pkg, "{\"changed\":true}");
    }

    #[tokio::test]
    async fn test_commit_to_new_branch() {
        let tmp = tempfile::tempdir().unwrap();
        let _repo = init_repo_with_commit(tmp.path());

        fs::write(tmp.path().join("package.json"), "{\"version\":\"1.0.0-snapshot-1\"}").unwrap();
        fs::remove_file(tmp.path().join(".changeset/brave-fox.md")).unwrap();

        configure_identity(tmp.path(), BOT_NAME, BOT_EMAIL).await.unwrap();
        add_all(tmp.path()).await.unwrap();
        commit(tmp.path(), "Add dark mode snapshot-1").await.unwrap();
        create_branch(tmp.path(), "preview-123").await.unwrap();

        assert_eq!(
            current_branch(tmp.path()).await.unwrap().as_deref(),
            Some("preview-123")
        );

        let repo = Repository::open(tmp.path()).unwrap();
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.message(), Some("Add dark mode snapshot-1"));
        assert_eq!(head.author().name(), Some(BOT_NAME));
        assert!(repo.statuses(None).unwrap().is_empty());
        assert_eq!(
            repo.config().unwrap().get_string("user.name").unwrap(),
            BOT_NAME
        );
    }

    fn stage_and_commit(repo: &Repository, message: &str) -> git2::Oid {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.update_all(["*"].iter(), None).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let parent = repo.head().unwrap().peel_to_commit().unwrap();
        let sig = Signature::now("test", "test@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])
            .unwrap()
    }

    fn remote_branch_commit(remote: &Repository, branch: &str) -> (git2::Oid, String) {
        let commit = remote
            .find_reference(&format!("refs/heads/{branch}"))
            .unwrap()
            .peel_to_commit()
            .unwrap();
        (commit.id(), commit.message().unwrap_or_default().to_string())
    }

    #[tokio::test]
    async fn test_release_checkout_restore_and_force_push_against_remote() {
        let tmp = tempfile::tempdir().unwrap();
        let remote_dir = tmp.path().join("remote.git");
        let seed_dir = tmp.path().join("seed");
        let work_dir = tmp.path().join("work");
        let remote_url = remote_dir.to_str().unwrap().to_string();

        // main carries a pending changeset, the release branch has consumed it
        let remote = Repository::init_bare(&remote_dir).unwrap();
        let seed = init_repo_with_commit(&seed_dir);
        let initial = seed.head().unwrap().peel_to_commit().unwrap();
        seed.reference("refs/heads/main", initial.id(), true, "main")
            .unwrap();
        seed.set_head("refs/heads/main").unwrap();
        fs::remove_file(seed_dir.join(".changeset/brave-fox.md")).unwrap();
        fs::write(seed_dir.join("package.json"), "{\"version\":\"1.0.0\"}").unwrap();
        let released = stage_and_commit(&seed, "Version packages");
        let released = seed.find_commit(released).unwrap();
        seed.branch("changeset-release/main", &released, true).unwrap();
        // Rewind main to the commit that still has the changeset
        seed.reference("refs/heads/main", initial.id(), true, "rewind")
            .unwrap();

        let mut origin = seed.remote("origin", &remote_url).unwrap();
        origin
            .push(
                &[
                    "refs/heads/main:refs/heads/main",
                    "refs/heads/changeset-release/main:refs/heads/changeset-release/main",
                ],
                None,
            )
            .unwrap();
        remote.set_head("refs/heads/main").unwrap();

        Repository::clone(&remote_url, &work_dir).unwrap();

        fetch_and_checkout(&work_dir, "changeset-release/main", "token")
            .await
            .unwrap();
        assert_eq!(
            current_branch(&work_dir).await.unwrap().as_deref(),
            Some("changeset-release/main")
        );
        assert!(!work_dir.join(".changeset/brave-fox.md").exists());

        fetch_branch(&work_dir, "main", "token").await.unwrap();
        restore_path(&work_dir, "origin/main", ".changeset")
            .await
            .unwrap();
        assert!(work_dir.join(".changeset/brave-fox.md").exists());

        fs::write(
            work_dir.join("package.json"),
            "{\"version\":\"1.0.1-snapshot-1\"}",
        )
        .unwrap();
        configure_identity(&work_dir, BOT_NAME, BOT_EMAIL).await.unwrap();
        add_all(&work_dir).await.unwrap();
        commit(&work_dir, "Add dark mode snapshot-1").await.unwrap();
        create_branch(&work_dir, "preview-123").await.unwrap();
        force_push(&work_dir, "preview-123", "token").await.unwrap();

        let (first_id, first_message) = remote_branch_commit(&remote, "preview-123");
        assert_eq!(first_message, "Add dark mode snapshot-1");

        // Rewrite local history so the next push is not a fast-forward
        let work = Repository::open(&work_dir).unwrap();
        let base = work
            .revparse_single("origin/main")
            .unwrap()
            .peel_to_commit()
            .unwrap();
        work.reset(base.as_object(), git2::ResetType::Hard, None)
            .unwrap();
        fs::write(
            work_dir.join("package.json"),
            "{\"version\":\"1.0.1-snapshot-2\"}",
        )
        .unwrap();
        add_all(&work_dir).await.unwrap();
        commit(&work_dir, "Add dark mode snapshot-2").await.unwrap();
        force_push(&work_dir, "preview-123", "token").await.unwrap();

        let (second_id, second_message) = remote_branch_commit(&remote, "preview-123");
        assert_eq!(second_message, "Add dark mode snapshot-2");
        assert_ne!(second_id, first_id);
        let pushed = remote.find_commit(second_id).unwrap();
        assert_eq!(pushed.parent_id(0).unwrap(), base.id());
        assert!(!remote.graph_descendant_of(second_id, first_id).unwrap());
    }
}
