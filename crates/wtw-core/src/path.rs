const SEPARATORS: [char; 2] = ['/', '\\'];

/// Nearest directory shared by every path, including its trailing separator.
///
/// Works on whole directory names: `/foo/bar/x` and `/foo/barn/y` share
/// `/foo/`, not `/foo/bar`. Returns an empty string when `paths` is empty or
/// the paths have no directory in common.
pub fn common_prefix<I, S>(paths: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut paths = paths.into_iter();
    let Some(first) = paths.next() else {
        return String::new();
    };

    let mut prefix = first.as_ref().to_owned();
    for path in paths {
        let shared = prefix
            .char_indices()
            .zip(path.as_ref().chars())
            .take_while(|((_, ours), theirs)| ours == theirs)
            .last()
            .map_or(0, |((index, ch), _)| index + ch.len_utf8());
        prefix.truncate(shared);
        if prefix.is_empty() {
            break;
        }
    }

    match prefix.rfind(SEPARATORS) {
        Some(index) => prefix.truncate(index + 1),
        None => prefix.clear(),
    }
    prefix
}
