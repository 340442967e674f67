/// Characters that must never appear in a name used on disk.
const RESERVED_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Reduce a client-supplied filename to something safe to embed in a storage
/// key: the last path segment, stripped of control and reserved characters.
/// The extension survives so stored blobs stay inspectable.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && !RESERVED_CHARS.contains(c))
        .collect();

    let trimmed = cleaned.trim().trim_matches('.').trim();

    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}
