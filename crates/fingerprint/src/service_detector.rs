//! Banner-based service reclassification

/// Substring markers checked against the lowercased banner, in priority
/// order. The first group with any matching needle wins.
pub const BANNER_MARKERS: &[(&[&str], &str)] = &[
    (&["ssh"], "SSH"),
    (&["http", "html"], "HTTP"),
    (&["ftp"], "FTP"),
    (&["smtp"], "SMTP"),
    (&["mysql"], "MySQL"),
];

/// Service name suggested by a banner, if any marker matches.
pub fn classify_banner(banner: &str) -> Option<&'static str> {
    let banner_lower = banner.to_lowercase();

    BANNER_MARKERS
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| banner_lower.contains(n)))
        .map(|(_, service)| *service)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_detection() {
        assert_eq!(classify_banner("SSH-2.0-OpenSSH_8.2"), Some("SSH"));
        assert_eq!(classify_banner("HTTP/1.1 200 OK"), Some("HTTP"));
        assert_eq!(classify_banner("<HTML><body>hi</body>"), Some("HTTP"));
        assert_eq!(classify_banner("220 ProFTPD Server ready"), Some("FTP"));
        assert_eq!(classify_banner("220 mail.example.com ESMTP Postfix"), Some("SMTP"));
        assert_eq!(classify_banner("5.7.42-MySQL Community Server"), Some("MySQL"));
    }

    #[test]
    fn unmatched_banner_suggests_nothing() {
        assert_eq!(classify_banner("+PONG"), None);
        assert_eq!(classify_banner(""), None);
    }

    #[test]
    fn first_marker_wins() {
        // shell beats hypertext
        assert_eq!(classify_banner("SSH-2.0-dropbear\r\nHTTP/1.0 400"), Some("SSH"));
        // hypertext beats file transfer and mail
        assert_eq!(classify_banner("HTTP/1.0 400 (ftp gateway, smtp relay)"), Some("HTTP"));
        // file transfer beats mail
        assert_eq!(classify_banner("220 FTP and SMTP gateway"), Some("FTP"));
        // mail beats database
        assert_eq!(classify_banner("220 smtp proxy for mysql alerts"), Some("SMTP"));
    }

    #[test]
    fn markers_are_case_insensitive() {
        assert_eq!(classify_banner("openssh"), Some("SSH"));
        assert_eq!(classify_banner("MYSQL"), Some("MySQL"));
    }
}
