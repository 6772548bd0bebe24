// World-level errors

use crate::core::Serial;

/// Longest container chain `root_container` will follow
pub const MAX_CONTAINER_DEPTH: usize = 64;

/// Errors raised by world operations on closed input domains
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("Invalid spell circle: {0}")]
    InvalidSpellCircle(u8),

    #[error("Invalid spell index: {0}")]
    InvalidSpellIndex(u8),

    #[error("Container chain of {0} is deeper than {max} links", max = MAX_CONTAINER_DEPTH)]
    ContainerTooDeep(Serial),

    #[error("Unknown entity: {0}")]
    UnknownEntity(Serial),

    #[error("Stale handle: {0}")]
    StaleHandle(Serial),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_error_display() {
        let err = WorldError::ContainerTooDeep(Serial(0x4000_0001));
        assert_eq!(
            err.to_string(),
            "Container chain of 0x40000001 is deeper than 64 links"
        );
        assert_eq!(WorldError::InvalidSpellCircle(9).to_string(), "Invalid spell circle: 9");
    }
}
