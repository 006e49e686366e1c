/// Canonicalizes a raw part or reference number into an identifier.
///
/// Strips every whitespace character, `-` and `/`, then uppercases what is
/// left. Total and pure: empty input yields an empty identifier, which
/// callers treat as "no identifier".
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '/')
        .flat_map(char::to_uppercase)
        .collect()
}

/// Normalizes an optional record field, returning `None` when the field is
/// absent or normalizes to the empty string.
pub fn normalize_field(raw: Option<&str>) -> Option<String> {
    raw.map(normalize).filter(|id| !id.is_empty())
}
