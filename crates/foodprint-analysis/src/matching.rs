//! Name matching shared by the knowledge tables.

/// Lowercased, trimmed form of a produce or place name.
pub(crate) fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Match `needle` against table keys, case-insensitively.
///
/// An exact key wins, then the longest key contained in `needle`
/// ("cherry tomatoes" finds "tomato"), then the shortest key that contains
/// `needle` ("berry" finds "blueberry"). The last direction needs at least
/// three characters so stray letters do not match everything.
pub(crate) fn best_match<'a, I>(needle: &str, keys: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = normalize(needle);
    if needle.is_empty() {
        return None;
    }
    let keys: Vec<&'a str> = keys.into_iter().collect();

    if let Some(key) = keys.iter().copied().find(|k| *k == needle) {
        return Some(key);
    }
    if let Some(key) = keys
        .iter()
        .copied()
        .filter(|k| needle.contains(*k))
        .max_by_key(|k| k.len())
    {
        return Some(key);
    }
    if needle.len() < 3 {
        return None;
    }
    keys.into_iter()
        .filter(|k| k.contains(needle.as_str()))
        .min_by_key(|k| k.len())
}
