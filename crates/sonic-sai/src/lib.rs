//! Safe Rust model of the SAI (Switch Abstraction Interface) object layer.
//!
//! This crate provides the vocabulary shared by SAI implementations and
//! their callers: type-safe object IDs with an explicit bit-level codec,
//! status codes and errors, and the attribute metadata layer used to
//! validate and dispatch attribute requests.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`types`]: Core SAI types including type-safe object IDs and the ID codec
//! - [`error`]: Error types and status handling
//! - [`attr`]: Attribute values, metadata tables, validation and get dispatch
//!
//! # Example
//!
//! ```
//! use sonic_sai::{LagOid, SaiError, SaiObjectType};
//!
//! let lag = LagOid::encode(3, 1);
//! let decoded = lag.index().unwrap();
//! assert_eq!((decoded.index, decoded.ext), (3, 1));
//!
//! // A LAG handle is never accepted where a LAG member is expected.
//! let err = sonic_sai::LagMemberOid::decode(lag.as_raw()).unwrap_err();
//! assert!(matches!(err, SaiError::InvalidObjectId { expected: SaiObjectType::LagMember, .. }));
//! ```

pub mod attr;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use attr::{
    check_attribs_metadata, find_attrib_in_list, sai_attr_list_to_str, sai_get_attributes,
    AttributeEntry, ObjectKey, ObjectList, OperationFlags, SaiAttrId, SaiAttrValueType,
    SaiAttribute, SaiAttributeValue, SaiOperation, VendorAttributeEntry, VendorCache, VendorGetter,
    MAX_LIST_VALUE_STR_LEN,
};
pub use types::{
    decode_index, encode_index, object_type_query, LagKind, LagMemberKind, LagMemberOid, LagOid,
    ObjectIndex, PackedOid, PortKind, PortOid, RawSaiObjectId, SaiObjectId, SaiObjectKind,
    SaiObjectType, SAI_NULL_OBJECT_ID,
};

pub use error::{SaiError, SaiResult, SaiStatus};
