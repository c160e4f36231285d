//! ScanCode license keys to SPDX identifiers.

use std::collections::BTreeSet;

/// Prefix for keys with no SPDX identifier.
pub const LICENSE_REF_PREFIX: &str = "LicenseRef-scancode-";

const SPDX_IDS: &[(&str, &str)] = &[
    ("0bsd", "0BSD"),
    ("agpl-3.0", "AGPL-3.0-only"),
    ("agpl-3.0-plus", "AGPL-3.0-or-later"),
    ("apache-1.1", "Apache-1.1"),
    ("apache-2.0", "Apache-2.0"),
    ("artistic-2.0", "Artistic-2.0"),
    ("boost-1.0", "BSL-1.0"),
    ("bsd-new", "BSD-3-Clause"),
    ("bsd-simplified", "BSD-2-Clause"),
    ("bsd-2-clause", "BSD-2-Clause"),
    ("bsd-3-clause", "BSD-3-Clause"),
    ("cc-by-4.0", "CC-BY-4.0"),
    ("cc0-1.0", "CC0-1.0"),
    ("cddl-1.0", "CDDL-1.0"),
    ("classpath-exception-2.0", "Classpath-exception-2.0"),
    ("epl-1.0", "EPL-1.0"),
    ("epl-2.0", "EPL-2.0"),
    ("gpl-2.0", "GPL-2.0-only"),
    ("gpl-2.0-plus", "GPL-2.0-or-later"),
    ("gpl-3.0", "GPL-3.0-only"),
    ("gpl-3.0-plus", "GPL-3.0-or-later"),
    ("isc", "ISC"),
    ("lgpl-2.0", "LGPL-2.0-only"),
    ("lgpl-2.1", "LGPL-2.1-only"),
    ("lgpl-2.1-plus", "LGPL-2.1-or-later"),
    ("lgpl-3.0", "LGPL-3.0-only"),
    ("lgpl-3.0-plus", "LGPL-3.0-or-later"),
    ("llvm-exception", "LLVM-exception"),
    ("mit", "MIT"),
    ("mpl-1.1", "MPL-1.1"),
    ("mpl-2.0", "MPL-2.0"),
    ("ofl-1.1", "OFL-1.1"),
    ("openssl-ssleay", "OpenSSL"),
    ("psf-2.0", "PSF-2.0"),
    ("python", "Python-2.0"),
    ("unicode", "Unicode-DFS-2016"),
    ("unlicense", "Unlicense"),
    ("wtfpl-2.0", "WTFPL"),
    ("zlib", "Zlib"),
];

/// SPDX identifier for a single license key.
///
/// Keys that already are SPDX identifiers (in any case) come back in canonical case.
pub fn spdx_id(key: &str) -> String {
    let lower = key.trim().to_ascii_lowercase();
    if let Some((_, id)) = SPDX_IDS
        .iter()
        .find(|(k, id)| *k == lower || id.eq_ignore_ascii_case(&lower))
    {
        return (*id).to_string();
    }
    if let Some(rest) = lower.strip_prefix("licenseref-") {
        return format!("LicenseRef-{rest}");
    }
    let sanitized: String = lower
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("{LICENSE_REF_PREFIX}{sanitized}")
}

/// Whether `id` is one of the mapped SPDX identifiers (not a `LicenseRef`).
pub fn is_listed(id: &str) -> bool {
    SPDX_IDS.iter().any(|(_, listed)| *listed == id)
}

/// Rewrite a ScanCode license expression with SPDX identifiers and operators.
pub fn spdx_expression(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    for token in tokenize(expr) {
        let mapped = match token.to_ascii_lowercase().as_str() {
            "(" | ")" => token.to_string(),
            "and" => "AND".to_string(),
            "or" => "OR".to_string(),
            "with" => "WITH".to_string(),
            _ => spdx_id(token),
        };
        if !(out.is_empty() || out.ends_with('(') || mapped == ")") {
            out.push(' ');
        }
        out.push_str(&mapped);
    }
    out
}

/// Combine a package's license set into one SPDX expression. Empty input yields `None`.
pub fn combine(licenses: &BTreeSet<String>) -> Option<String> {
    let parts: Vec<String> = licenses.iter().map(|l| spdx_expression(l)).collect();
    match parts.len() {
        0 => None,
        1 => parts.into_iter().next(),
        _ => Some(
            parts
                .iter()
                .map(|p| {
                    if p.contains(' ') {
                        format!("({p})")
                    } else {
                        p.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(" AND "),
        ),
    }
}

/// `LicenseRef-*` identifiers used in an expression, in canonical case.
pub fn license_refs(expr: &str) -> BTreeSet<String> {
    tokenize(expr)
        .into_iter()
        .filter(|t| {
            t.get(.."licenseref-".len())
                .is_some_and(|p| p.eq_ignore_ascii_case("licenseref-"))
        })
        .map(spdx_id)
        .collect()
}

fn tokenize(expr: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, c) in expr.char_indices() {
        if c.is_whitespace() || c == '(' || c == ')' {
            if let Some(s) = start.take() {
                tokens.push(&expr[s..i]);
            }
            if !c.is_whitespace() {
                tokens.push(&expr[i..i + 1]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(&expr[s..]);
    }
    tokens
}
