//! LAG attribute identifiers and functionality metadata.

use sonic_sai::{AttributeEntry, SaiAttrId, SaiAttrValueType};

/// List of ports in the LAG (read-only).
pub const SAI_LAG_ATTR_PORT_LIST: SaiAttrId = 0;

/// LAG the member belongs to (mandatory on create).
pub const SAI_LAG_MEMBER_ATTR_LAG_ID: SaiAttrId = 0;
/// Port the member attaches (mandatory on create).
pub const SAI_LAG_MEMBER_ATTR_PORT_ID: SaiAttrId = 1;

pub static LAG_ATTRIBS: [AttributeEntry; 1] = [AttributeEntry {
    id: SAI_LAG_ATTR_PORT_LIST,
    mandatory_on_create: false,
    valid_for_create: false,
    valid_for_set: false,
    valid_for_get: true,
    name: "List of ports in LAG",
    value_type: SaiAttrValueType::ObjectList,
}];

pub static LAG_MEMBER_ATTRIBS: [AttributeEntry; 2] = [
    AttributeEntry {
        id: SAI_LAG_MEMBER_ATTR_LAG_ID,
        mandatory_on_create: true,
        valid_for_create: true,
        valid_for_set: false,
        valid_for_get: true,
        name: "LAG ID",
        value_type: SaiAttrValueType::Oid,
    },
    AttributeEntry {
        id: SAI_LAG_MEMBER_ATTR_PORT_ID,
        mandatory_on_create: true,
        valid_for_create: true,
        valid_for_set: false,
        valid_for_get: true,
        name: "PORT ID",
        value_type: SaiAttrValueType::Oid,
    },
];
