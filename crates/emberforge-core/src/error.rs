//! Combination validation errors

use thiserror::Error;

use crate::combination::{ItemKind, WeaponStyle};

/// Why a submitted combination was rejected before any generation work
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CombinationError {
    #[error("a combination needs exactly 3 materials, got {0}")]
    WrongMaterialCount(usize),

    #[error("unknown material '{0}'")]
    UnknownMaterial(String),

    #[error("weapon style '{style}' given for a {kind} combination")]
    StyleWithoutWeapon { kind: ItemKind, style: WeaponStyle },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CombinationError::WrongMaterialCount(5).to_string(),
            "a combination needs exactly 3 materials, got 5"
        );
        assert_eq!(
            CombinationError::UnknownMaterial("goo".to_string()).to_string(),
            "unknown material 'goo'"
        );
        assert_eq!(
            CombinationError::StyleWithoutWeapon {
                kind: ItemKind::Buff,
                style: WeaponStyle::Axe,
            }
            .to_string(),
            "weapon style 'axe' given for a buff combination"
        );
    }
}
