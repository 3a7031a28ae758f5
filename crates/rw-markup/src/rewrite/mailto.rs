//! Mail autolink normalization.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::MailtoAutolink;

/// CommonMark email autolink address.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .unwrap()
});

/// Strip the `mailto:` scheme (any case) from a mail autolink.
///
/// The scheme is kept when the address would not be recognized as an email
/// autolink on its own (for example `mailto:a@b.c?subject=x`), so the output
/// still parses as a link. Address-only autolinks are returned unchanged.
pub(super) fn normalize(link: MailtoAutolink) -> MailtoAutolink {
    match link.scheme {
        Some(_) if EMAIL_RE.is_match(&link.address) => MailtoAutolink {
            scheme: None,
            address: link.address,
        },
        _ => link,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailto(scheme: Option<&str>, address: &str) -> MailtoAutolink {
        MailtoAutolink {
            scheme: scheme.map(str::to_owned),
            address: address.to_owned(),
        }
    }

    #[test]
    fn test_scheme_stripped_any_case() {
        for scheme in ["mailto", "Mailto", "MAILTO"] {
            assert_eq!(
                normalize(mailto(Some(scheme), "docs@microsoft.com")),
                mailto(None, "docs@microsoft.com")
            );
        }
    }

    #[test]
    fn test_idempotent() {
        let once = normalize(mailto(Some("Mailto"), "docs@microsoft.com"));
        assert_eq!(normalize(once.clone()), once);
    }

    #[test]
    fn test_query_keeps_scheme() {
        let link = mailto(Some("mailto"), "docs@microsoft.com?subject=hi");
        assert_eq!(normalize(link.clone()), link);
    }
}
