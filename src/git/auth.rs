//! Git authentication for the checkout step
//!
//! An access token, when configured, is offered first for HTTPS remotes
//! (as the user name with an empty password, the same shape as
//! `https://<token>@host/...`). Everything else is delegated to git's
//! native credential system:
//! - SSH agent and keys from ~/.ssh/
//! - Git credential helpers

use std::cell::Cell;

use git2::{Cred, CredentialType, Error, ErrorClass, ErrorCode, RemoteCallbacks};

/// libgit2 keeps asking while credentials are rejected; give up after this many
const MAX_ATTEMPTS: u32 = 3;

fn auth_failed(message: &str) -> Error {
    Error::new(ErrorCode::Auth, ErrorClass::Http, message)
}

fn try_ssh_key_files(username: &str) -> Result<Cred, Error> {
    let ssh_dir = dirs::home_dir().unwrap_or_default().join(".ssh");

    for key_name in ["id_ed25519", "id_rsa", "id_ecdsa"] {
        let private_key = ssh_dir.join(key_name);
        if !private_key.exists() {
            continue;
        }
        let public_key = ssh_dir.join(format!("{key_name}.pub"));
        let public_key = public_key.exists().then_some(public_key.as_path());
        if let Ok(cred) = Cred::ssh_key(username, public_key, &private_key, None) {
            return Ok(cred);
        }
    }

    Err(auth_failed("SSH key not found"))
}

fn try_credential_helper(url: &str, username_from_url: Option<&str>) -> Result<Cred, Error> {
    let config = git2::Config::open_default().or_else(|_| git2::Config::new())?;
    Cred::credential_helper(&config, url, username_from_url)
        .map_err(|_| auth_failed("no credentials available for remote"))
}

/// Install credential callbacks on `callbacks`
pub fn setup_auth_callbacks(callbacks: &mut RemoteCallbacks<'_>, token: Option<String>) {
    let attempts = Cell::new(0u32);

    callbacks.credentials(move |url, username_from_url, allowed_types| {
        attempts.set(attempts.get() + 1);
        if attempts.get() > MAX_ATTEMPTS {
            return Err(auth_failed("authentication failed: credentials rejected"));
        }

        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if let Some(token) = token.as_deref() {
                if attempts.get() == 1 {
                    return Cred::userpass_plaintext(token, "");
                }
            }
            return try_credential_helper(url, username_from_url);
        }

        if allowed_types.contains(CredentialType::SSH_KEY) {
            let username = username_from_url.unwrap_or("git");
            return Cred::ssh_key_from_agent(username).or_else(|_| try_ssh_key_files(username));
        }

        if allowed_types.contains(CredentialType::DEFAULT) {
            return Cred::default();
        }

        Err(auth_failed("authentication failed"))
    });
}
