//! Lexical path helpers producing forward-slash asset paths.

use std::path::{Component, Path};

/// Directory of `file` relative to `base`, with `/` separators.
///
/// Purely lexical: neither path is touched on disk. Returns `""` when the file
/// sits directly in `base`, and leading `..` segments when it lies outside.
pub(crate) fn relative_dir(base: &Path, file: &Path) -> String {
    let dir = file.parent().unwrap_or(Path::new(""));
    let base: Vec<Component<'_>> = normal_components(base);
    let dir: Vec<Component<'_>> = normal_components(dir);

    let common = base
        .iter()
        .zip(&dir)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = std::iter::repeat_n("..".to_owned(), base.len() - common)
        .collect();
    segments.extend(
        dir[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    segments.join("/")
}

/// Join `reference` onto `dir` and resolve `.` and `..` segments.
///
/// Backslashes are treated as separators. `..` segments that climb above
/// `dir`'s root are kept, so `join_normalized("", "../x.png")` is `../x.png`.
pub(crate) fn join_normalized(dir: &str, reference: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let reference = reference.replace('\\', "/");

    for segment in dir.split('/').chain(reference.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let mut joined = segments.join("/");
    if reference.ends_with('/') && !joined.is_empty() {
        joined.push('/');
    }
    joined
}

fn normal_components(path: &Path) -> Vec<Component<'_>> {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
