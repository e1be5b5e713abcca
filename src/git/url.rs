//! URL handling for the checkout step
//!
//! - SCP-style SSH URLs (`git@host:path`) become `ssh://` URLs for libgit2
//! - `file://` URLs are made absolute
//! - credentials embedded in a URL never reach logs or reports

use std::borrow::Cow;

/// Rewrite `git@host:path` as `ssh://git@host/path`
pub fn normalize_ssh_url(url: &str) -> Cow<'_, str> {
    if !url.starts_with("git@") {
        return Cow::Borrowed(url);
    }
    match url.split_once(':') {
        Some((host, path)) => {
            let path = path.strip_prefix('/').unwrap_or(path);
            Cow::Owned(format!("ssh://{host}/{path}"))
        }
        None => Cow::Borrowed(url),
    }
}

/// Make `file://relative` and `file://C:\dir` style URLs absolute with forward slashes
pub fn normalize_file_url(url: &str) -> Cow<'_, str> {
    let Some(after) = url.strip_prefix("file://") else {
        return Cow::Borrowed(url);
    };
    if after.contains('\\') {
        return Cow::Owned(format!("file:///{}", after.replace('\\', "/")));
    }
    if !after.is_empty() && !after.starts_with('/') {
        return Cow::Owned(format!("file:///{after}"));
    }
    Cow::Borrowed(url)
}

/// URL as libgit2 should see it
pub fn for_clone(url: &str) -> String {
    normalize_file_url(&normalize_ssh_url(url)).into_owned()
}

/// Drop any `user:password@` part so the URL is safe to print
pub fn redact(url: &str) -> Cow<'_, str> {
    let Some((scheme, rest)) = url.split_once("://") else {
        return Cow::Borrowed(url);
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => Cow::Owned(format!("{scheme}://***@{}", &rest[at + 1..])),
        None => Cow::Borrowed(url),
    }
}

/// Local sources cannot be cloned shallowly
pub fn is_local(url: &str) -> bool {
    url.starts_with("file://") || std::path::Path::new(url).is_absolute()
}
