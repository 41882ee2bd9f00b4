//! Canonical file origins.

use std::io;
use std::path::{Component, Path, PathBuf};

use url::Url;

/// Absolute, normalized `file://` URI for `path`.
///
/// Relative paths are resolved against the current directory and `.`/`..`
/// components are folded lexically. Symlinks are not followed and the file
/// does not need to exist.
pub fn canonical_origin(path: &Path) -> io::Result<String> {
    let absolute = normalize(&std::path::absolute(path)?);
    Url::from_file_path(&absolute)
        .map(String::from)
        .map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot express {} as a file URI", absolute.display()),
            )
        })
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_is_file_uri() {
        let origin = canonical_origin(Path::new("/etc/app/foo.json")).unwrap();
        assert_eq!(origin, "file:///etc/app/foo.json");
    }

    #[test]
    fn test_dot_segments_folded() {
        let direct = canonical_origin(Path::new("/etc/app/foo.json")).unwrap();
        let dotted = canonical_origin(Path::new("/etc/./other/../app/foo.json")).unwrap();
        assert_eq!(direct, dotted);
    }

    #[test]
    fn test_relative_path_resolved() {
        let cwd = std::env::current_dir().unwrap();
        let relative = canonical_origin(Path::new("conf/foo.json")).unwrap();
        let absolute = canonical_origin(&cwd.join("conf").join("foo.json")).unwrap();
        assert_eq!(relative, absolute);
    }

    #[test]
    fn test_special_characters_escaped() {
        let origin = canonical_origin(Path::new("/etc/my app/foo.json")).unwrap();
        assert_eq!(origin, "file:///etc/my%20app/foo.json");
    }
}
