// Utility functions

pub fn generate_random_id() -> String {
    use rand::Rng;
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}

/// 16 random bytes, hex encoded (32 chars)
pub fn generate_nonce() -> String {
    use rand::Rng;
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Strip the mount prefix and substitute the default listing path for a bare mount point.
///
/// The prefix only matches on a segment boundary, so `/api/netsuitex` is left alone.
/// Query strings are kept as-is.
pub fn normalize_path(inbound: &str, mount_path: &str, default_path: &str) -> String {
    let mount = mount_path.trim_end_matches('/');

    let rest = match inbound.strip_prefix(mount) {
        Some(rest) if !mount.is_empty() && (rest.is_empty() || rest.starts_with(['/', '?'])) => {
            rest
        }
        _ => inbound,
    };

    if rest.is_empty() || rest == "/" {
        return default_path.to_string();
    }

    if rest.starts_with(['/', '?']) {
        rest.to_string()
    } else {
        format!("/{}", rest)
    }
}

/// First `max_chars` characters of a body, for log previews
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
