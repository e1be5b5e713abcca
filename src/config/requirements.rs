//! Requirements manifest reading
//!
//! The installer consumes the manifest itself; envstrap only reads it to
//! know which packages `verify` should look for.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::PackageSpec;
use crate::error::{Result, fs as fs_error};

/// Read every package requirement declared by a manifest, following
/// `-r` / `--requirement` includes relative to the including file.
pub fn read_manifest(path: &Path) -> Result<Vec<PackageSpec>> {
    let mut specs = Vec::new();
    let mut visited = HashSet::new();
    collect(path, &mut specs, &mut visited)?;
    Ok(specs)
}

fn collect(
    path: &Path,
    specs: &mut Vec<PackageSpec>,
    visited: &mut HashSet<PathBuf>,
) -> Result<()> {
    let key = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(key) {
        debug!(manifest = %path.display(), "manifest already read, skipping include");
        return Ok(());
    }

    let content = fs::read_to_string(path).map_err(|e| fs_error::read_failed(path, &e))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    for line in logical_lines(&content) {
        match classify(&line) {
            Line::Requirement(text) => specs.push(PackageSpec::parse(text)?),
            Line::Include(file) => collect(&base.join(file), specs, visited)?,
            Line::Skip => {}
        }
    }

    Ok(())
}

enum Line<'a> {
    Requirement(&'a str),
    Include(&'a str),
    Skip,
}

fn classify(line: &str) -> Line<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Line::Skip;
    }

    for prefix in ["-r ", "--requirement ", "--requirement="] {
        if let Some(file) = line.strip_prefix(prefix) {
            return Line::Include(file.trim());
        }
    }
    if let Some(file) = line.strip_prefix("-r") {
        return Line::Include(file.trim());
    }

    // Other options (-c, -e, --index-url, ...), archives, VCS and local paths
    // carry no package name we can check.
    if line.starts_with('-')
        || line.starts_with('.')
        || line.starts_with('/')
        || line.contains("://")
        || line.starts_with("git+")
    {
        return Line::Skip;
    }

    let requirement = strip_requirement_options(line);
    if is_local_archive(requirement) {
        return Line::Skip;
    }

    Line::Requirement(requirement)
}

/// Drop per-requirement options such as `--hash=...` or `--config-settings`
fn strip_requirement_options(line: &str) -> &str {
    let cut = line
        .char_indices()
        .find(|&(i, c)| c.is_whitespace() && line[i + c.len_utf8()..].starts_with("--"))
        .map_or(line.len(), |(i, _)| i);
    line[..cut].trim_end()
}

/// Wheel, sdist or directory paths written without a `./` prefix
fn is_local_archive(requirement: &str) -> bool {
    let target = requirement.split(';').next().unwrap_or(requirement).trim();
    target.contains(['/', '\\'])
        || [".whl", ".tar.gz", ".zip"]
            .iter()
            .any(|ext| target.ends_with(ext))
}

/// Join backslash continuations and strip comments
fn logical_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for raw in content.lines() {
        let without_comment = strip_comment(raw);
        if let Some(continued) = without_comment.strip_suffix('\\') {
            current.push_str(continued);
            current.push(' ');
            continue;
        }
        current.push_str(without_comment);
        lines.push(std::mem::take(&mut current));
    }
    if !current.trim().is_empty() {
        lines.push(current);
    }

    lines
}

fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    // Inline comments need whitespace before '#', URLs may contain '#egg='
    match line.find(" #").or_else(|| line.find("\t#")) {
        Some(pos) => line[..pos].trim_end(),
        None => line.trim_end(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(specs: &[PackageSpec]) -> Vec<String> {
        specs.iter().map(|s| s.name.clone()).collect()
    }

    #[test]
    fn test_read_simple_manifest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("requirements.txt");
        fs::write(&path, "requests==2.0\nnumpy\n").unwrap();

        let specs = read_manifest(&path).unwrap();
        assert_eq!(names(&specs), vec!["requests", "numpy"]);
        assert_eq!(specs[0].pinned_version(), Some("2.0"));
    }

    #[test]
    fn test_comments_options_and_urls_are_skipped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("requirements.txt");
        fs::write(
            &path,
            "# pinned deps\n\
             --extra-index-url https://example.com/simple\n\
             numpy  # for arrays\n\
             -e ./local-pkg\n\
             git+https://github.com/owner/repo.git#egg=repo\n\
             \n\
             lm-eval\n",
        )
        .unwrap();

        let specs = read_manifest(&path).unwrap();
        assert_eq!(names(&specs), vec!["numpy", "lm-eval"]);
    }

    #[test]
    fn test_line_continuations() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("requirements.txt");
        fs::write(&path, "fsspec \\\n  >=2024.1\n").unwrap();

        let specs = read_manifest(&path).unwrap();
        assert_eq!(names(&specs), vec!["fsspec"]);
        assert_eq!(specs[0].constraint.as_deref(), Some(">=2024.1"));
    }

    #[test]
    fn test_hash_options_are_not_part_of_the_pin() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("requirements.txt");
        fs::write(
            &path,
            "numpy==1.26.0 \\\n    --hash=sha256:abcdef \\\n    --hash=sha256:012345\n\
             pyarrow==15.0.0 --config-settings=--build-option=--cpp\n",
        )
        .unwrap();

        let specs = read_manifest(&path).unwrap();
        assert_eq!(names(&specs), vec!["numpy", "pyarrow"]);
        assert_eq!(specs[0].pinned_version(), Some("1.26.0"));
        assert_eq!(specs[1].pinned_version(), Some("15.0.0"));
    }

    #[test]
    fn test_local_archives_without_prefix_are_skipped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("requirements.txt");
        fs::write(
            &path,
            "wheels/foo-1.0-py3-none-any.whl\n\
             vendor\\bar-2.0.tar.gz\n\
             baz-3.0.zip\n\
             rich\n",
        )
        .unwrap();

        let specs = read_manifest(&path).unwrap();
        assert_eq!(names(&specs), vec!["rich"]);
    }

    #[test]
    fn test_marker_is_kept_on_manifest_requirements() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("requirements.txt");
        fs::write(&path, "pywin32==306; sys_platform == \"win32\"\n").unwrap();

        let specs = read_manifest(&path).unwrap();
        assert_eq!(specs[0].marker.as_deref(), Some("sys_platform == \"win32\""));
    }

    #[test]
    fn test_includes_are_followed_once() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("requirements.txt"),
            "-r base.txt\nrich\n--requirement=base.txt\n",
        )
        .unwrap();
        fs::write(temp.path().join("base.txt"), "pyarrow\n-r requirements.txt\n").unwrap();

        let specs = read_manifest(&temp.path().join("requirements.txt")).unwrap();
        assert_eq!(names(&specs), vec!["pyarrow", "rich"]);
    }

    #[test]
    fn test_missing_manifest_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = read_manifest(&temp.path().join("nope.txt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_requirement_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("requirements.txt");
        fs::write(&path, "numpy latest\n").unwrap();
        assert!(read_manifest(&path).is_err());
    }
}
