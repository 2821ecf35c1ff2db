//! Type-safe SAI object ID wrappers and the object ID codec.
//!
//! This module provides strongly-typed wrappers for SAI object IDs, preventing
//! accidental mixing of different object types (e.g., passing a port OID where
//! a LAG OID is expected), and the explicit bit layout used to turn an opaque
//! 64-bit handle into a typed, bounds-checked index.
//!
//! # Bit layout
//!
//! ```text
//!  63            48 47            32 31            16 15             0
//! +----------------+----------------+----------------+----------------+
//! |  object type   |   extension    |            index (u32)          |   index encoding
//! +----------------+----------------+----------------+----------------+
//! |  object type   |           serial (u32)          |   port (u16)   |   packed encoding
//! +----------------+----------------+----------------+----------------+
//! ```
//!
//! Both encodings keep the object type in the top 16 bits, so
//! [`object_type_query`] works on any identifier.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::error::{SaiError, SaiResult};

/// Raw SAI object ID type (matches sai_object_id_t in C).
pub type RawSaiObjectId = u64;

/// The null object ID (SAI_NULL_OBJECT_ID).
pub const SAI_NULL_OBJECT_ID: RawSaiObjectId = 0;

const TYPE_SHIFT: u32 = 48;
const EXT_SHIFT: u32 = 32;
const SERIAL_SHIFT: u32 = 16;
const U16_MASK: u64 = 0xffff;
const U32_MASK: u64 = 0xffff_ffff;

/// SAI object types, numbered as in `sai_object_type_t`.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaiObjectType {
    Null = 0,
    Port = 1,
    Lag = 2,
    LagMember = 27,
    Switch = 33,
}

impl SaiObjectType {
    /// Converts a raw type tag, returning `None` for tags this crate does not model.
    pub fn from_raw(tag: u16) -> Option<Self> {
        match tag {
            0 => Some(Self::Null),
            1 => Some(Self::Port),
            2 => Some(Self::Lag),
            27 => Some(Self::LagMember),
            33 => Some(Self::Switch),
            _ => None,
        }
    }

    /// Returns the raw type tag.
    pub const fn as_raw(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for SaiObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Null => "SAI_OBJECT_TYPE_NULL",
            Self::Port => "SAI_OBJECT_TYPE_PORT",
            Self::Lag => "SAI_OBJECT_TYPE_LAG",
            Self::LagMember => "SAI_OBJECT_TYPE_LAG_MEMBER",
            Self::Switch => "SAI_OBJECT_TYPE_SWITCH",
        };
        write!(f, "{}", s)
    }
}

/// Returns the object type embedded in a raw identifier.
///
/// Returns [`SaiObjectType::Null`] for the null ID and for tags that are not
/// modelled, mirroring `sai_object_type_query`.
pub fn object_type_query(raw: RawSaiObjectId) -> SaiObjectType {
    if raw == SAI_NULL_OBJECT_ID {
        return SaiObjectType::Null;
    }
    let tag = (raw >> TYPE_SHIFT) as u16;
    SaiObjectType::from_raw(tag).unwrap_or(SaiObjectType::Null)
}

fn check_type(raw: RawSaiObjectId, expected: SaiObjectType) -> SaiResult<()> {
    let actual = object_type_query(raw);
    if actual == SaiObjectType::Null || actual != expected {
        return Err(SaiError::invalid_object_id(raw, expected));
    }
    Ok(())
}

/// Decoded form of an index-encoded identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectIndex {
    /// Database slot index.
    pub index: u32,
    /// Extension bits; the stub stores the slot generation here.
    pub ext: u16,
}

/// Encodes an object type, index and extension into an identifier.
pub const fn encode_index(object_type: SaiObjectType, index: u32, ext: u16) -> RawSaiObjectId {
    ((object_type.as_raw() as u64) << TYPE_SHIFT) | ((ext as u64) << EXT_SHIFT) | index as u64
}

/// Decodes an index-encoded identifier.
///
/// # Errors
///
/// Returns [`SaiError::InvalidObjectId`] if the identifier is null or its type
/// tag differs from `expected`.
pub fn decode_index(raw: RawSaiObjectId, expected: SaiObjectType) -> SaiResult<ObjectIndex> {
    check_type(raw, expected)?;
    Ok(ObjectIndex {
        index: (raw & U32_MASK) as u32,
        ext: ((raw >> EXT_SHIFT) & U16_MASK) as u16,
    })
}

/// An identifier that carries its payload in its own bits.
///
/// Used for LAG members in the dynamic database: the port travels inside the
/// member ID, so reading it back needs no table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedOid {
    pub object_type: SaiObjectType,
    /// Distinguishes identifiers that share a port.
    pub serial: u32,
    pub port: u16,
}

impl PackedOid {
    pub const fn new(object_type: SaiObjectType, serial: u32, port: u16) -> Self {
        Self {
            object_type,
            serial,
            port,
        }
    }

    /// Packs this value into a raw identifier.
    pub const fn encode(&self) -> RawSaiObjectId {
        ((self.object_type.as_raw() as u64) << TYPE_SHIFT)
            | ((self.serial as u64) << SERIAL_SHIFT)
            | self.port as u64
    }

    /// Unpacks a raw identifier, checking its type tag.
    pub fn decode(raw: RawSaiObjectId, expected: SaiObjectType) -> SaiResult<Self> {
        check_type(raw, expected)?;
        Ok(Self {
            object_type: expected,
            serial: ((raw >> SERIAL_SHIFT) & U32_MASK) as u32,
            port: (raw & U16_MASK) as u16,
        })
    }
}

/// Marker trait for SAI object kinds.
///
/// Each SAI object type implements this trait to enable compile-time
/// type checking of object IDs.
pub trait SaiObjectKind: Send + Sync + 'static {
    /// The object type tag carried by IDs of this kind.
    const OBJECT_TYPE: SaiObjectType;

    /// Returns the SAI object type name for debugging.
    fn type_name() -> &'static str;
}

/// A type-safe SAI object ID.
///
/// This wrapper ensures that object IDs of different types cannot be
/// accidentally mixed. The phantom type parameter `T` indicates what
/// kind of SAI object this ID refers to.
///
/// # Examples
///
/// ```
/// use sonic_sai::{LagOid, PortOid};
///
/// let port = PortOid::encode(11, 0);
/// let lag = LagOid::encode(0, 1);
///
/// assert_eq!(PortOid::decode(port.as_raw()).unwrap().index, 11);
/// // A LAG handle never decodes as a port.
/// assert!(PortOid::decode(lag.as_raw()).is_err());
/// ```
#[derive(Clone, Copy)]
pub struct SaiObjectId<T: SaiObjectKind> {
    raw: RawSaiObjectId,
    _marker: PhantomData<T>,
}

impl<T: SaiObjectKind> SaiObjectId<T> {
    /// The null object ID (SAI_NULL_OBJECT_ID).
    pub const NULL: Self = Self {
        raw: SAI_NULL_OBJECT_ID,
        _marker: PhantomData,
    };

    /// Creates a new object ID from a raw value.
    ///
    /// Returns `None` if the raw value is 0 (null object ID).
    /// Use `NULL` constant for explicitly null IDs.
    pub fn from_raw(raw: RawSaiObjectId) -> Option<Self> {
        if raw == SAI_NULL_OBJECT_ID {
            None
        } else {
            Some(Self {
                raw,
                _marker: PhantomData,
            })
        }
    }

    /// Creates a new object ID from a raw value, including null.
    ///
    /// Unlike `from_raw`, this allows creating null object IDs.
    pub const fn from_raw_unchecked(raw: RawSaiObjectId) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    /// Encodes an index-encoded ID of this kind.
    pub const fn encode(index: u32, ext: u16) -> Self {
        Self::from_raw_unchecked(encode_index(T::OBJECT_TYPE, index, ext))
    }

    /// Decodes a raw ID, failing if it is not an ID of this kind.
    pub fn decode(raw: RawSaiObjectId) -> SaiResult<ObjectIndex> {
        decode_index(raw, T::OBJECT_TYPE)
    }

    /// Decodes this ID, failing if its tag does not match the kind.
    pub fn index(&self) -> SaiResult<ObjectIndex> {
        Self::decode(self.raw)
    }

    /// Returns the raw object ID value.
    pub const fn as_raw(&self) -> RawSaiObjectId {
        self.raw
    }

    /// Returns true if this is a null object ID.
    pub const fn is_null(&self) -> bool {
        self.raw == SAI_NULL_OBJECT_ID
    }

    /// Returns true if this is a valid (non-null) object ID.
    pub const fn is_valid(&self) -> bool {
        self.raw != SAI_NULL_OBJECT_ID
    }
}

impl<T: SaiObjectKind> fmt::Debug for SaiObjectId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:016x})", T::type_name(), self.raw)
    }
}

impl<T: SaiObjectKind> fmt::Display for SaiObjectId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.raw)
    }
}

impl<T: SaiObjectKind> PartialEq for SaiObjectId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T: SaiObjectKind> Eq for SaiObjectId<T> {}

impl<T: SaiObjectKind> Hash for SaiObjectId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T: SaiObjectKind> Default for SaiObjectId<T> {
    fn default() -> Self {
        Self::NULL
    }
}

// ============================================================================
// Object Kind Markers
// ============================================================================

macro_rules! define_object_kind {
    ($name:ident, $object_type:ident, $type_name:literal, $oid_alias:ident) => {
        #[doc = concat!("Marker type for SAI ", $type_name, " objects.")]
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl SaiObjectKind for $name {
            const OBJECT_TYPE: SaiObjectType = SaiObjectType::$object_type;

            fn type_name() -> &'static str {
                $type_name
            }
        }

        #[doc = concat!("Type alias for ", $type_name, " object IDs.")]
        pub type $oid_alias = SaiObjectId<$name>;
    };
}

define_object_kind!(PortKind, Port, "Port", PortOid);
define_object_kind!(LagKind, Lag, "Lag", LagOid);
define_object_kind!(LagMemberKind, LagMember, "LagMember", LagMemberOid);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oid_creation() {
        let port = PortOid::from_raw(0x1000000000001).unwrap();
        assert_eq!(port.as_raw(), 0x1000000000001);
        assert!(port.is_valid());
        assert!(!port.is_null());
    }

    #[test]
    fn test_null_oid() {
        assert!(PortOid::from_raw(0).is_none());
        assert!(PortOid::NULL.is_null());
        assert!(!PortOid::NULL.is_valid());
        assert_eq!(object_type_query(0), SaiObjectType::Null);
    }

    #[test]
    fn test_oid_debug() {
        let port = PortOid::encode(1, 0);
        let debug = format!("{:?}", port);
        assert!(debug.contains("Port"));
        assert!(debug.contains("0x0001000000000001"));
    }

    #[test]
    fn test_index_encoding_layout() {
        let raw = encode_index(SaiObjectType::Lag, 4, 7);
        assert_eq!(raw, 0x0002_0007_0000_0004);
        assert_eq!(object_type_query(raw), SaiObjectType::Lag);

        let decoded = decode_index(raw, SaiObjectType::Lag).unwrap();
        assert_eq!(decoded, ObjectIndex { index: 4, ext: 7 });
    }

    #[test]
    fn test_index_round_trip_extremes() {
        for (index, ext) in [(0, 0), (u32::MAX, u16::MAX), (15, 1)] {
            let lag = LagOid::encode(index, ext);
            assert_eq!(lag.index().unwrap(), ObjectIndex { index, ext });
        }
    }

    #[test]
    fn test_decode_rejects_wrong_type() {
        let member = LagMemberOid::encode(3, 0);
        let err = LagOid::decode(member.as_raw()).unwrap_err();
        assert!(matches!(err, SaiError::InvalidObjectId { .. }));
    }

    #[test]
    fn test_decode_rejects_null_and_unknown_tag() {
        assert!(LagOid::decode(0).is_err());
        // Tag 0x00ff is not a modelled object type.
        let unknown = 0x00ff_0000_0000_0001;
        assert!(decode_index(unknown, SaiObjectType::Lag).is_err());
        assert_eq!(object_type_query(unknown), SaiObjectType::Null);
    }

    #[test]
    fn test_packed_layout() {
        let packed = PackedOid::new(SaiObjectType::LagMember, 0x1234_5678, 22);
        let raw = packed.encode();
        assert_eq!(raw, 0x001b_1234_5678_0016);
        assert_eq!(object_type_query(raw), SaiObjectType::LagMember);
        let decoded = PackedOid::decode(raw, SaiObjectType::LagMember).unwrap();
        assert_eq!(decoded, packed);
        assert!(PackedOid::decode(raw, SaiObjectType::Lag).is_err());
    }

    #[test]
    fn test_object_type_display() {
        assert_eq!(
            SaiObjectType::LagMember.to_string(),
            "SAI_OBJECT_TYPE_LAG_MEMBER"
        );
        assert_eq!(SaiObjectType::from_raw(2), Some(SaiObjectType::Lag));
        assert_eq!(SaiObjectType::from_raw(3), None);
    }
}
