pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Pick the content type to store for an upload.
///
/// The client's declared type wins unless it is missing or the generic
/// octet-stream, in which case the extension is consulted.
pub fn resolve(declared: Option<&str>, filename: &str) -> String {
    match declared.map(str::trim) {
        Some(ct) if !ct.is_empty() && ct != DEFAULT_CONTENT_TYPE => ct.to_string(),
        _ => mime_guess::from_path(filename)
            .first_or_octet_stream()
            .to_string(),
    }
}

/// Loose `type/subtype` check for user-supplied content types.
pub fn is_valid(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    match essence.split_once('/') {
        Some((ty, sub)) => {
            !ty.is_empty()
                && !sub.is_empty()
                && content_type.len() <= 255
                && !content_type.chars().any(|c| c.is_ascii_control())
                && essence
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "/+-.!#$&^_".contains(c))
        }
        None => false,
    }
}
