//! Input sanitization and validation helpers for the public capture surface.
//!
//! Everything arriving through the public lead endpoint is untrusted: fields
//! are trimmed, control characters stripped, and lengths capped before any
//! row is written.

/// Sanitize a free-text input: trim, drop ASCII control characters, and
/// truncate to `max_len` characters. Returns None when nothing survives.
pub fn sanitize_text(input: &str, max_len: usize) -> Option<String> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| !c.is_ascii_control())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    if cleaned.chars().count() > max_len {
        Some(cleaned.chars().take(max_len).collect())
    } else {
        Some(cleaned)
    }
}

/// Lightweight email shape check: one `@`, no whitespace, a dot in the
/// domain part.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = match parts.next() {
        Some(d) => d,
        None => return false,
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    let mut dom = domain.splitn(2, '.');
    let head = dom.next().unwrap_or("");
    let tail = dom.next().unwrap_or("");
    !head.is_empty() && !tail.is_empty()
}

/// Validate a URL slug: lowercase alphanumeric segments joined by single
/// hyphens, no leading or trailing hyphen.
pub fn is_valid_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.starts_with('-') || slug.ends_with('-') {
        return false;
    }
    let mut prev_hyphen = false;
    for c in slug.chars() {
        match c {
            'a'..='z' | '0'..='9' => prev_hyphen = false,
            '-' => {
                if prev_hyphen {
                    return false;
                }
                prev_hyphen = true;
            }
            _ => return false,
        }
    }
    true
}

/// First client address from proxy headers, falling back to the socket peer.
///
/// `x-forwarded-for` may carry a comma-separated chain; the left-most entry
/// is the originating client.
pub fn client_ip(
    forwarded_for: Option<&str>,
    real_ip: Option<&str>,
    peer: Option<&str>,
) -> Option<String> {
    if let Some(xff) = forwarded_for {
        if let Some(first) = xff.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }
    if let Some(ip) = real_ip {
        let ip = ip.trim();
        if !ip.is_empty() {
            return Some(ip.to_string());
        }
    }
    peer.map(|p| p.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_trims_and_strips_controls() {
        assert_eq!(
            sanitize_text("  hello\x00\x1fworld \n", 100),
            Some("helloworld".to_string())
        );
    }

    #[test]
    fn test_sanitize_truncates() {
        assert_eq!(sanitize_text("abcdef", 3), Some("abc".to_string()));
    }

    #[test]
    fn test_sanitize_empty_becomes_none() {
        assert_eq!(sanitize_text("   ", 10), None);
        assert_eq!(sanitize_text("\x01\x02", 10), None);
    }

    #[test]
    fn test_sanitize_preserves_unicode() {
        assert_eq!(sanitize_text("Löwe 老虎", 20), Some("Löwe 老虎".to_string()));
    }

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last+tag@example.org"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("a @b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@"));
        assert!(!is_valid_email("a@b@c.co"));
    }

    #[test]
    fn test_valid_slugs() {
        assert!(is_valid_slug("spring-sale"));
        assert!(is_valid_slug("q3-2026-launch"));
        assert!(is_valid_slug("a"));
    }

    #[test]
    fn test_invalid_slugs() {
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("trailing-"));
        assert!(!is_valid_slug("double--hyphen"));
        assert!(!is_valid_slug("Upper-Case"));
        assert!(!is_valid_slug("spa ce"));
        assert!(!is_valid_slug("under_score"));
    }

    #[test]
    fn test_client_ip_prefers_forwarded_chain_head() {
        let ip = client_ip(
            Some("203.0.113.9, 10.0.0.1"),
            Some("10.0.0.2"),
            Some("10.0.0.3"),
        );
        assert_eq!(ip, Some("203.0.113.9".to_string()));
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip_then_peer() {
        assert_eq!(
            client_ip(None, Some("198.51.100.4"), Some("10.0.0.3")),
            Some("198.51.100.4".to_string())
        );
        assert_eq!(
            client_ip(None, None, Some("10.0.0.3")),
            Some("10.0.0.3".to_string())
        );
        assert_eq!(client_ip(None, None, None), None);
    }
}
