#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    /// Match the query exactly as typed, whitespace included.
    #[default]
    Literal,
    /// Strip leading and trailing whitespace before matching.
    Trimmed,
}

/// Case-insensitive substring filter. Keeps the order of `source`.
pub fn filter_labels<'a, S>(query: &str, source: &'a [S], mode: QueryMode) -> Vec<&'a str>
where
    S: AsRef<str>,
{
    let query = match mode {
        QueryMode::Literal => query,
        QueryMode::Trimmed => query.trim(),
    };
    let needle = query.to_lowercase();

    source
        .iter()
        .map(|label| label.as_ref())
        .filter(|label| needle.is_empty() || label.to_lowercase().contains(&needle))
        .collect()
}
