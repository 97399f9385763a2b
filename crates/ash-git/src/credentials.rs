//! Credential callbacks for network operations
//!
//! Authentication is assumed to be configured outside the mirror: an ssh
//! agent for ssh remotes, a git credential helper for https remotes.

use git2::{Cred, CredentialType, FetchOptions, PushOptions, RemoteCallbacks};

/// Give up after this many credential requests for one operation.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Build callbacks that answer credential requests from the ssh agent or
/// the configured credential helper.
pub fn remote_callbacks<'a>() -> RemoteCallbacks<'a> {
    let mut attempts = 0usize;
    let mut callbacks = RemoteCallbacks::new();

    callbacks.credentials(move |url, username_from_url, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str(&format!(
                "authentication to {url} failed after {MAX_CREDENTIAL_ATTEMPTS} attempts"
            )));
        }

        if allowed.contains(CredentialType::SSH_KEY) {
            return Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"));
        }
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            let config = git2::Config::open_default()?;
            return Cred::credential_helper(&config, url, username_from_url);
        }
        if allowed.contains(CredentialType::USERNAME) {
            return Cred::username(username_from_url.unwrap_or("git"));
        }
        Cred::default()
    });

    callbacks
}

/// Fetch options wired to [`remote_callbacks`].
pub fn fetch_options<'a>() -> FetchOptions<'a> {
    let mut options = FetchOptions::new();
    options.remote_callbacks(remote_callbacks());
    options
}

/// Push options wired to [`remote_callbacks`], with `rejected` collecting
/// any reference the remote refused.
pub fn push_options<'a>(rejected: &'a mut Vec<String>) -> PushOptions<'a> {
    let mut callbacks = remote_callbacks();
    callbacks.push_update_reference(move |refname, status| {
        if let Some(reason) = status {
            rejected.push(format!("{refname}: {reason}"));
        }
        Ok(())
    });

    let mut options = PushOptions::new();
    options.remote_callbacks(callbacks);
    options
}
