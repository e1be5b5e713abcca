//! Translating libgit2 errors into short reasons

use git2::{Error, ErrorClass};

/// Interpret a git2 error as a user-friendly reason
pub fn interpret_git_error(err: &Error) -> String {
    let message = err.message().to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| message.contains(n));

    if err.class() == ErrorClass::Reference || has(&["refs/remotes/"]) {
        format!("Branch not found: {}", err.message())
    } else if has(&["not found", "404", "too many redirects", "authentication replays"]) {
        "Repository not found".to_string()
    } else if has(&["authentication", "credentials"]) {
        "Authentication failed".to_string()
    } else if has(&["permission denied", "access denied"]) {
        "Permission denied".to_string()
    } else if has(&["connection", "network", "timeout", "timed out"]) {
        "Network error".to_string()
    } else if has(&["exists and is not an empty directory"]) {
        format!("Destination is not empty: {}", err.message())
    } else {
        match err.class() {
            ErrorClass::Http if has(&["certificate"]) => "Certificate error".to_string(),
            ErrorClass::Http if has(&["ssl"]) => "SSL error".to_string(),
            ErrorClass::Http => format!("HTTP error: {}", err.message()),
            ErrorClass::Ssh => format!("SSH error: {}", err.message()),
            _ => err.message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::ErrorCode;

    #[test]
    fn test_not_found() {
        let err = Error::new(ErrorCode::NotFound, ErrorClass::Http, "unexpected http status code: 404");
        assert_eq!(interpret_git_error(&err), "Repository not found");
    }

    #[test]
    fn test_auth() {
        let err = Error::new(ErrorCode::Auth, ErrorClass::Http, "authentication required");
        assert_eq!(interpret_git_error(&err), "Authentication failed");
    }

    #[test]
    fn test_http_fallback_keeps_message() {
        let err = Error::new(ErrorCode::GenericError, ErrorClass::Http, "bad gateway");
        assert_eq!(interpret_git_error(&err), "HTTP error: bad gateway");
    }

    #[test]
    fn test_other_keeps_message() {
        let err = Error::from_str("something odd");
        assert_eq!(interpret_git_error(&err), "something odd");
    }

    #[test]
    fn test_missing_branch() {
        let err = Error::new(
            ErrorCode::NotFound,
            ErrorClass::Reference,
            "reference 'refs/remotes/origin/nope' not found",
        );
        assert!(interpret_git_error(&err).starts_with("Branch not found"));
    }
}
