use uuid::Uuid;

/// Fresh random session token (UUIDv4, 122 random bits)
pub fn generate_token() -> String {
    Uuid::new_v4().to_string()
}

/// Pull the token out of an Authorization header value.
/// The raw token is expected; a `Bearer ` prefix is tolerated. Blank values count as absent.
pub fn extract_token(header: Option<&str>) -> Option<&str> {
    let header = header?;
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
