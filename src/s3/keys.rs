//! Object key marshalling
//!
//! Pure helpers that turn caller input into object keys and local paths.

use std::path::{Path, PathBuf};

use crate::error::KeyError;

/// Key for uploading a local file: `prefix` followed directly by the file name.
///
/// No separator is inserted, so `prefix` should carry its own trailing `/`
/// when it names a folder.
pub fn upload_key(prefix: &str, file: &Path) -> Result<String, KeyError> {
    let name = file
        .file_name()
        .ok_or_else(|| KeyError::NoLocalFileName(file.to_path_buf()))?
        .to_str()
        .ok_or_else(|| KeyError::NonUtf8FileName(file.to_path_buf()))?;

    Ok(format!("{prefix}{name}"))
}

/// Join `prefix` and `name` as slash-separated path segments and clean the result.
///
/// Empty parts are ignored; the joined path has duplicate slashes collapsed,
/// `.` segments removed, `..` resolved and any trailing slash dropped.
pub fn join_key(prefix: &str, name: &str) -> String {
    let joined = match (prefix.is_empty(), name.is_empty()) {
        (true, true) => return String::new(),
        (true, false) => name.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{name}"),
    };
    clean_key(&joined)
}

fn clean_key(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            s => parts.push(s),
        }
    }

    let body = parts.join("/");
    if rooted {
        format!("/{body}")
    } else if body.is_empty() {
        ".".to_string()
    } else {
        body
    }
}

/// Last path component of a key, ignoring trailing slashes
pub fn key_file_name(key: &str) -> Option<&str> {
    key.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

/// Local path an object is downloaded to inside `dir`
pub fn download_target(dir: &Path, key: &str) -> Result<PathBuf, KeyError> {
    key_file_name(key)
        .map(|name| dir.join(name))
        .ok_or_else(|| KeyError::NoFileName(key.to_string()))
}

/// Keep listed keys except the one equal to the prefix itself (the folder marker)
pub fn retain_listed_keys<'a, I>(prefix: &str, keys: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    keys.into_iter()
        .filter(|key| *key != prefix)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_key_concatenates() {
        let key = upload_key("uploads/", Path::new("/tmp/data/report.csv")).unwrap();
        assert_eq!(key, "uploads/report.csv");
    }

    #[test]
    fn test_upload_key_no_separator_added() {
        let key = upload_key("backup-", Path::new("dump.sql")).unwrap();
        assert_eq!(key, "backup-dump.sql");
    }

    #[test]
    fn test_upload_key_empty_prefix() {
        let key = upload_key("", Path::new("a/b/c.txt")).unwrap();
        assert_eq!(key, "c.txt");
    }

    #[test]
    fn test_upload_key_without_file_name() {
        let err = upload_key("p/", Path::new("/")).unwrap_err();
        assert_eq!(err, KeyError::NoLocalFileName(PathBuf::from("/")));
    }

    #[test]
    fn test_join_key_basic() {
        assert_eq!(join_key("images", "cat.png"), "images/cat.png");
        assert_eq!(join_key("images/", "cat.png"), "images/cat.png");
        assert_eq!(join_key("images/", "/cat.png"), "images/cat.png");
    }

    #[test]
    fn test_join_key_empty_parts() {
        assert_eq!(join_key("", "cat.png"), "cat.png");
        assert_eq!(join_key("images/", ""), "images");
        assert_eq!(join_key("", ""), "");
    }

    #[test]
    fn test_join_key_cleans_segments() {
        assert_eq!(join_key("a//b/./c", "d"), "a/b/c/d");
        assert_eq!(join_key("a/b", "../c"), "a/c");
        assert_eq!(join_key("a", "../../c"), "../c");
        assert_eq!(join_key("a", ".."), ".");
    }

    #[test]
    fn test_join_key_rooted_prefix() {
        assert_eq!(join_key("/a", "b"), "/a/b");
        assert_eq!(join_key("/", "../b"), "/b");
    }

    #[test]
    fn test_key_file_name() {
        assert_eq!(key_file_name("path/to/file.txt"), Some("file.txt"));
        assert_eq!(key_file_name("file.txt"), Some("file.txt"));
        assert_eq!(key_file_name("path/to/folder/"), Some("folder"));
        assert_eq!(key_file_name(""), None);
        assert_eq!(key_file_name("///"), None);
        assert_eq!(key_file_name("a/.."), None);
    }

    #[test]
    fn test_download_target() {
        let dir = Path::new("/tmp/out");
        assert_eq!(
            download_target(dir, "logs/2024/app.log").unwrap(),
            PathBuf::from("/tmp/out/app.log")
        );
        assert_eq!(
            download_target(dir, "/").unwrap_err(),
            KeyError::NoFileName("/".to_string())
        );
    }

    #[test]
    fn test_retain_listed_keys_drops_prefix_marker() {
        let listed = ["docs/", "docs/a.md", "docs/b.md"];
        assert_eq!(
            retain_listed_keys("docs/", listed),
            vec!["docs/a.md".to_string(), "docs/b.md".to_string()]
        );
    }

    #[test]
    fn test_retain_listed_keys_empty_prefix_keeps_all() {
        let listed = ["a", "b/c"];
        assert_eq!(retain_listed_keys("", listed), vec!["a", "b/c"]);
    }

    #[test]
    fn test_retain_listed_keys_preserves_order() {
        let listed = ["p/z", "p", "p/a"];
        assert_eq!(retain_listed_keys("p", listed), vec!["p/z", "p/a"]);
    }
}
