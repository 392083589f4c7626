//! Engine version gating
//!
//! A project manifest may declare a minimum mcumake version. The gate uses
//! semver constraints; the toolchain/library catalogs deliberately do not,
//! because vendor package versions predate semver (see [`super::catalog`]).

use semver::{Version, VersionReq};
use thiserror::Error;

/// Current mcumake version from Cargo.toml
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors related to engine version checking
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VersionError {
    /// Current mcumake version does not satisfy the manifest's constraint
    #[error(
        "mcumake {current} does not satisfy requirement '{constraint}' from {origin}. Update mcumake to continue."
    )]
    VersionMismatch {
        current: String,
        constraint: String,
        origin: String,
    },

    /// Invalid constraint format
    #[error("Invalid version constraint '{constraint}': {reason}")]
    InvalidConstraint { constraint: String, reason: String },

    /// Invalid version format
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },
}

/// Check that the running mcumake satisfies a manifest constraint.
///
/// `origin` names where the constraint came from, for the error message.
pub fn check_engine_version(constraint: &str, origin: &str) -> Result<(), VersionError> {
    check_version_constraint(CURRENT_VERSION, constraint, origin)
}

/// Check an explicit version against a constraint.
pub fn check_version_constraint(
    version: &str,
    constraint: &str,
    origin: &str,
) -> Result<(), VersionError> {
    let parsed = Version::parse(version).map_err(|e| VersionError::InvalidVersion {
        version: version.to_string(),
        reason: e.to_string(),
    })?;

    let req = VersionReq::parse(constraint).map_err(|e| VersionError::InvalidConstraint {
        constraint: constraint.to_string(),
        reason: e.to_string(),
    })?;

    if req.matches(&parsed) {
        Ok(())
    } else {
        Err(VersionError::VersionMismatch {
            current: version.to_string(),
            constraint: constraint.to_string(),
            origin: origin.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satisfied_constraint() {
        assert!(check_version_constraint("0.3.1", ">=0.2.0", "test").is_ok());
    }

    #[test]
    fn test_unsatisfied_constraint() {
        let err = check_version_constraint("0.1.0", ">=0.2.0", "project 'blink'").unwrap_err();
        assert!(matches!(err, VersionError::VersionMismatch { .. }));
        assert!(err.to_string().contains("blink"));
    }

    #[test]
    fn test_invalid_constraint() {
        let err = check_version_constraint("0.1.0", "not-a-req", "test").unwrap_err();
        assert!(matches!(err, VersionError::InvalidConstraint { .. }));
    }

    #[test]
    fn test_current_version_parses() {
        assert!(Version::parse(CURRENT_VERSION).is_ok());
    }
}
