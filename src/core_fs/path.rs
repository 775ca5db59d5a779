use crate::core_fs::error::FsError;

/// Lexically resolves a client-supplied path against the virtual root.
///
/// Repeated separators and `.` segments are collapsed, `..` segments are
/// resolved against the segments seen so far, and any sequence that would
/// climb above the root is rejected. The result is the cleaned path
/// relative to the root, `"."` for the root itself. The guard works on
/// strings only; no host filesystem call is involved.
pub fn secure_path(input: &str) -> Result<String, FsError> {
    let mut stack: Vec<&str> = Vec::new();
    for segment in input.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                if stack.pop().is_none() {
                    return Err(FsError::AccessDenied);
                }
            }
            name => stack.push(name),
        }
    }
    if stack.is_empty() {
        Ok(String::from("."))
    } else {
        Ok(stack.join("/"))
    }
}

/// Combines the session working directory with a command argument.
/// Absolute arguments replace the working directory entirely.
pub fn join_virtual(cwd: &str, arg: &str) -> String {
    if arg.starts_with('/') {
        arg.to_string()
    } else {
        format!("{}/{}", cwd, arg)
    }
}

/// Client-facing form of a cleaned path: rooted at `/`.
pub fn display_virtual(cleaned: &str) -> String {
    if cleaned == "." {
        String::from("/")
    } else {
        format!("/{}", cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_forms_resolve_to_dot() {
        assert_eq!(secure_path("/").unwrap(), ".");
        assert_eq!(secure_path("").unwrap(), ".");
        assert_eq!(secure_path(".").unwrap(), ".");
        assert_eq!(secure_path("//").unwrap(), ".");
    }

    #[test]
    fn resolve_is_idempotent() {
        for input in ["/a/b/../c", "a//b/./d", "/", "x"] {
            let once = secure_path(input).unwrap();
            assert_eq!(secure_path(&once).unwrap(), once);
        }
    }

    #[test]
    fn parent_segments_resolve_within_root() {
        assert_eq!(secure_path("/a/b/../c").unwrap(), "a/c");
        assert_eq!(secure_path("a/..").unwrap(), ".");
    }

    #[test]
    fn escapes_are_rejected() {
        assert!(matches!(secure_path(".."), Err(FsError::AccessDenied)));
        assert!(matches!(secure_path("/../.."), Err(FsError::AccessDenied)));
        assert!(matches!(
            secure_path("a/../../b"),
            Err(FsError::AccessDenied)
        ));
    }

    #[test]
    fn join_and_display() {
        assert_eq!(join_virtual("/", "sub"), "//sub");
        assert_eq!(secure_path(&join_virtual("/", "sub")).unwrap(), "sub");
        assert_eq!(join_virtual("/a", "/b"), "/b");
        assert_eq!(display_virtual("."), "/");
        assert_eq!(display_virtual("a/b"), "/a/b");
    }
}
