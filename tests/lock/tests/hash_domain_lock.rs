//! Hash domain governance lock tests.
//!
//! 1. The domain set has the expected size.
//! 2. Domain byte strings are unique and null-terminated.
//! 3. Every domain follows the `DSTAR::*::V1\0` convention.
//! 4. `canonical_hash` is SHA-256 over `domain || data`, checked against an
//!    independent computation.
//! 5. No raw `DSTAR::` domain literal appears in production source outside
//!    `hash_domain.rs`.

use std::collections::BTreeSet;

use dstar_kernel::proof::hash::{canonical_hash, HashDomain};
use sha2::{Digest, Sha256};

#[test]
fn hash_domain_canonical_set_count() {
    assert_eq!(
        HashDomain::ALL.len(),
        3,
        "expected 3 domain variants; if you added a new domain, update this count"
    );
}

#[test]
fn hash_domain_bytes_unique_and_terminated() {
    let mut seen = BTreeSet::new();
    for domain in HashDomain::ALL {
        assert!(seen.insert(domain.as_bytes()), "duplicate domain bytes: {domain}");
        assert!(domain.as_bytes().ends_with(&[0]), "{domain} is not null-terminated");
    }
}

#[test]
fn hash_domain_naming_convention() {
    for domain in HashDomain::ALL {
        let bytes = domain.as_bytes();
        assert!(bytes.starts_with(b"DSTAR::"), "{domain} does not start with DSTAR::");
        assert!(bytes.ends_with(b"::V1\0"), "{domain} does not end with ::V1\\0");
    }
}

#[test]
fn canonical_hash_matches_independent_sha256() {
    let data = br#"{"a":1}"#;
    for domain in HashDomain::ALL {
        let mut hasher = Sha256::new();
        hasher.update(domain.as_bytes());
        hasher.update(data);
        let expected = format!("sha256:{}", hex::encode(hasher.finalize()));
        assert_eq!(canonical_hash(*domain, data).as_str(), expected);
    }
}

#[test]
fn domains_separate_identical_payloads() {
    let data = b"same bytes";
    let digests: BTreeSet<String> = HashDomain::ALL
        .iter()
        .map(|d| canonical_hash(*d, data).as_str().to_string())
        .collect();
    assert_eq!(digests.len(), HashDomain::ALL.len());
}

/// Scan kernel/, search/ and harness/ for `b"DSTAR::` literals. The only
/// file allowed to contain them is `hash_domain.rs`.
#[test]
fn no_raw_domain_literals_outside_authority() {
    let production_dirs = [
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../kernel/src"),
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../search/src"),
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../harness/src"),
    ];
    let pattern = "b\"DSTAR::";
    let mut violations = Vec::new();
    let mut scanned = 0;

    for dir in production_dirs {
        for path in walkdir(std::path::Path::new(dir)) {
            if path.extension().and_then(|e| e.to_str()) != Some("rs") {
                continue;
            }
            scanned += 1;
            if path.file_name().and_then(|n| n.to_str()) == Some("hash_domain.rs") {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            for (i, line) in content.lines().enumerate() {
                let trimmed = line.trim();
                if !trimmed.starts_with("//") && trimmed.contains(pattern) {
                    violations.push(format!("  {}:{}: {trimmed}", path.display(), i + 1));
                }
            }
        }
    }

    assert!(scanned > 0, "no production sources found");
    assert!(
        violations.is_empty(),
        "raw DSTAR:: domain literals outside hash_domain.rs:\n{}",
        violations.join("\n")
    );
}

/// Recursive directory walk.
fn walkdir(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    let mut results = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                results.extend(walkdir(&path));
            } else {
                results.push(path);
            }
        }
    }
    results
}
