//! ABI version registry.
//!
//! The wire contract carries a single numeric version identifier. The
//! numbered constants below are never repointed; the `CURRENT` alias is
//! moved at release time when the contract changes incompatibly, so both
//! the explicit version and the alias resolve to the same value for any
//! given build. This is distinct from the build version string in
//! `lib.rs`, which tracks the package release.

use serde::{Deserialize, Serialize};

/// A single immutable wire-contract version identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbiVersion(pub u32);

impl std::fmt::Display for AbiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// First released wire contract.
pub const ABI_V1: AbiVersion = AbiVersion(1);

/// Symbolic alias for the contract this build speaks.
pub const CURRENT: AbiVersion = ABI_V1;

/// Resolves a symbolic alias to a concrete version.
///
/// `"current"` resolves to [`CURRENT`]; explicit numbered names (`"v1"`)
/// resolve to their constants. Unknown aliases resolve to nothing.
pub fn resolve(alias: &str) -> Option<AbiVersion> {
    match alias {
        "current" => Some(CURRENT),
        "v1" => Some(ABI_V1),
        _ => None,
    }
}
