//! Lexical path resolution against the session's working directory.
//!
//! Paths are always `/`-separated and never touch the filesystem here.

/// `path` joined onto `cwd` as written, with no segment folding.
pub fn join(cwd: &str, path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else if cwd.ends_with('/') {
        format!("{}{}", cwd, path)
    } else {
        format!("{}/{}", cwd, path)
    }
}

/// Resolves `path` against `cwd` and normalizes `.`, `..` and `//` segments.
/// The result is absolute and has no trailing slash (except for the root).
pub fn resolve(cwd: &str, path: &str) -> String {
    let joined = join(cwd, path);

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }

    format!("/{}", segments.join("/"))
}

/// Same as `resolve`, in the trailing-slash form the working directory is kept in.
pub fn resolve_dir(cwd: &str, path: &str) -> String {
    let resolved = resolve(cwd, path);
    if resolved.ends_with('/') {
        resolved
    } else {
        resolved + "/"
    }
}
