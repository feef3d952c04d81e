//! Guides compiled into the binary.

/// `(name, origin, source)` for each bundled guide.
pub(crate) const BUNDLED: &[(&str, &str, &str)] = &[
    ("security", "<bundled>/security.md", include_str!("../../assets/security.md")),
    ("style", "<bundled>/style.md", include_str!("../../assets/style.md")),
];
