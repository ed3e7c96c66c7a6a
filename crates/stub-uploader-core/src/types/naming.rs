//! Naming conventions for stub distributions.
//!
//! A stub distribution for the runtime distribution `foo` is published as
//! `types-foo`. Names are compared in their PEP 503 canonical form.

/// Prefix carried by every stub distribution uploaded from typeshed
pub const TYPES_PREFIX: &str = "types-";

/// Suffix used by stub-only distributions maintained outside typeshed
pub const STUBS_SUFFIX: &str = "-stubs";

/// Canonicalise a distribution name: lowercase, runs of `-`, `_` and `.`
/// collapsed to a single `-`
pub fn canonical_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;

    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.extend(c.to_lowercase());
            in_separator = false;
        }
    }

    out
}

/// Return the runtime distribution a stub name describes, or `None` when the
/// name does not follow the `types-` convention
pub fn strip_types_prefix(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    let prefix = trimmed.get(..TYPES_PREFIX.len())?;
    if prefix.eq_ignore_ascii_case(TYPES_PREFIX) && trimmed.len() > TYPES_PREFIX.len() {
        Some(&trimmed[TYPES_PREFIX.len()..])
    } else {
        None
    }
}

/// Name of the stub distribution published for `distribution`
pub fn stub_distribution(distribution: &str) -> String {
    format!("{}{}", TYPES_PREFIX, distribution)
}

/// Runtime name behind a `-stubs` distribution (`pandas-stubs` -> `pandas`);
/// other names are returned unchanged
pub fn strip_stubs_suffix(name: &str) -> &str {
    let split = name.len().saturating_sub(STUBS_SUFFIX.len());
    match name.get(split..) {
        Some(suffix) if split > 0 && suffix.eq_ignore_ascii_case(STUBS_SUFFIX) => &name[..split],
        _ => name,
    }
}
