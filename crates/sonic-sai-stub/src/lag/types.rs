//! LAG types and data structures.

use std::fmt;

use sonic_sai::SaiAttrId;

use super::attribs::{SAI_LAG_MEMBER_ATTR_LAG_ID, SAI_LAG_MEMBER_ATTR_PORT_ID};

/// Field of a LAG member record readable through the attribute dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LagMemberField {
    /// The owning LAG.
    LagId,
    /// The member port.
    PortId,
}

impl LagMemberField {
    /// Maps a vendor-table argument back to a field.
    ///
    /// Returns `None` for selectors that are not LAG member fields.
    pub fn from_attr_id(id: SaiAttrId) -> Option<Self> {
        match id {
            SAI_LAG_MEMBER_ATTR_LAG_ID => Some(Self::LagId),
            SAI_LAG_MEMBER_ATTR_PORT_ID => Some(Self::PortId),
            _ => None,
        }
    }

    pub fn attr_id(&self) -> SaiAttrId {
        match self {
            Self::LagId => SAI_LAG_MEMBER_ATTR_LAG_ID,
            Self::PortId => SAI_LAG_MEMBER_ATTR_PORT_ID,
        }
    }
}

impl fmt::Display for LagMemberField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LagId => write!(f, "lag id"),
            Self::PortId => write!(f, "port id"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_selector_round_trip() {
        for field in [LagMemberField::LagId, LagMemberField::PortId] {
            assert_eq!(LagMemberField::from_attr_id(field.attr_id()), Some(field));
        }
    }

    #[test]
    fn test_unknown_selector() {
        assert_eq!(LagMemberField::from_attr_id(0x1000), None);
    }
}
