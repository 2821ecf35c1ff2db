//! SAI attribute model and the metadata layer.
//!
//! Every SAI object type publishes two tables:
//!
//! - a functionality table ([`AttributeEntry`]) saying which attributes are
//!   mandatory, creatable, settable and queryable, and what value type they
//!   carry;
//! - a vendor table ([`VendorAttributeEntry`]) saying which of those the
//!   implementation actually provides, with the getter callback to invoke.
//!
//! [`check_attribs_metadata`] validates a caller's attribute list against both
//! tables before any state is touched, [`sai_get_attributes`] dispatches a get
//! request through the vendor getters, and [`sai_attr_list_to_str`] renders a
//! list for logging.

use std::fmt::{self, Write as _};

use crate::error::{SaiError, SaiResult};
use crate::types::RawSaiObjectId;

/// Attribute identifier, scoped to one object type.
pub type SaiAttrId = u32;

/// Maximum length of a rendered attribute list.
pub const MAX_LIST_VALUE_STR_LEN: usize = 128;

/// Declared value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaiAttrValueType {
    Oid,
    ObjectList,
    U16,
    U32,
    Bool,
}

impl fmt::Display for SaiAttrValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Oid => "object id",
            Self::ObjectList => "object list",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::Bool => "bool",
        };
        write!(f, "{}", s)
    }
}

/// A caller-owned object ID buffer.
///
/// The capacity is what the caller allocated; getters never write past it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectList {
    capacity: usize,
    list: Vec<RawSaiObjectId>,
}

impl ObjectList {
    /// Creates an empty buffer able to hold `capacity` IDs.
    ///
    /// Storage grows as entries are written, so the declared capacity costs
    /// nothing up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            list: Vec::new(),
        }
    }

    /// Creates a full buffer from existing IDs.
    pub fn from_ids(ids: Vec<RawSaiObjectId>) -> Self {
        Self {
            capacity: ids.len(),
            list: ids,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of IDs written.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn as_slice(&self) -> &[RawSaiObjectId] {
        &self.list
    }

    /// Replaces the contents with `ids`, writing at most `capacity` entries.
    ///
    /// Returns the number of IDs written.
    ///
    /// # Errors
    ///
    /// Returns [`SaiError::BufferOverflow`] if `ids` yields more than
    /// `capacity` entries. The first `capacity` entries are still written.
    pub fn fill<I>(&mut self, ids: I) -> SaiResult<usize>
    where
        I: IntoIterator<Item = RawSaiObjectId>,
    {
        self.list.clear();
        let mut required = 0;
        for id in ids {
            if self.list.len() < self.capacity {
                self.list.push(id);
            }
            required += 1;
        }

        if required > self.capacity {
            return Err(SaiError::BufferOverflow {
                required,
                capacity: self.capacity,
            });
        }
        Ok(required)
    }
}

/// Attribute value (sai_attribute_value_t).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaiAttributeValue {
    Oid(RawSaiObjectId),
    ObjList(ObjectList),
    U16(u16),
    U32(u32),
    Bool(bool),
}

impl SaiAttributeValue {
    pub fn value_type(&self) -> SaiAttrValueType {
        match self {
            Self::Oid(_) => SaiAttrValueType::Oid,
            Self::ObjList(_) => SaiAttrValueType::ObjectList,
            Self::U16(_) => SaiAttrValueType::U16,
            Self::U32(_) => SaiAttrValueType::U32,
            Self::Bool(_) => SaiAttrValueType::Bool,
        }
    }

    pub fn as_oid(&self) -> Option<RawSaiObjectId> {
        match self {
            Self::Oid(oid) => Some(*oid),
            _ => None,
        }
    }

    pub fn as_obj_list(&self) -> Option<&ObjectList> {
        match self {
            Self::ObjList(list) => Some(list),
            _ => None,
        }
    }
}

impl fmt::Display for SaiAttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oid(oid) => write!(f, "0x{:016x}", oid),
            Self::ObjList(list) => {
                write!(f, "{} : [", list.len())?;
                for (i, oid) in list.as_slice().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "0x{:016x}", oid)?;
                }
                write!(f, "]")
            }
            Self::U16(v) => write!(f, "{}", v),
            Self::U32(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// One attribute in a request (sai_attribute_t).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaiAttribute {
    pub id: SaiAttrId,
    pub value: SaiAttributeValue,
}

impl SaiAttribute {
    pub fn new(id: SaiAttrId, value: SaiAttributeValue) -> Self {
        Self { id, value }
    }

    /// Object ID attribute; pass the null ID when querying.
    pub fn oid(id: SaiAttrId, oid: RawSaiObjectId) -> Self {
        Self::new(id, SaiAttributeValue::Oid(oid))
    }

    /// Object list attribute backed by a buffer of `capacity` entries.
    pub fn obj_list(id: SaiAttrId, capacity: usize) -> Self {
        let list = ObjectList::with_capacity(capacity);
        Self::new(id, SaiAttributeValue::ObjList(list))
    }
}

/// Finds an attribute in a request list.
///
/// Returns the attribute's position and value.
pub fn find_attrib_in_list(
    attrs: &[SaiAttribute],
    id: SaiAttrId,
) -> Option<(usize, &SaiAttributeValue)> {
    attrs
        .iter()
        .enumerate()
        .find(|(_, attr)| attr.id == id)
        .map(|(index, attr)| (index, &attr.value))
}

/// API operation an attribute list is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaiOperation {
    Create,
    Remove,
    Set,
    Get,
}

impl fmt::Display for SaiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Remove => "remove",
            Self::Set => "set",
            Self::Get => "get",
        };
        write!(f, "{}", s)
    }
}

/// Functionality metadata for one attribute (sai_attribute_entry_t).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeEntry {
    pub id: SaiAttrId,
    pub mandatory_on_create: bool,
    pub valid_for_create: bool,
    pub valid_for_set: bool,
    pub valid_for_get: bool,
    pub name: &'static str,
    pub value_type: SaiAttrValueType,
}

impl AttributeEntry {
    fn valid_for(&self, op: SaiOperation) -> bool {
        match op {
            SaiOperation::Create => self.valid_for_create,
            SaiOperation::Set => self.valid_for_set,
            SaiOperation::Get => self.valid_for_get,
            SaiOperation::Remove => false,
        }
    }
}

/// Per-operation flags in a vendor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperationFlags {
    pub create: bool,
    pub remove: bool,
    pub set: bool,
    pub get: bool,
}

impl OperationFlags {
    pub const fn new(create: bool, remove: bool, set: bool, get: bool) -> Self {
        Self {
            create,
            remove,
            set,
            get,
        }
    }

    pub fn allows(&self, op: SaiOperation) -> bool {
        match op {
            SaiOperation::Create => self.create,
            SaiOperation::Remove => self.remove,
            SaiOperation::Set => self.set,
            SaiOperation::Get => self.get,
        }
    }
}

/// Key of the object an attribute request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectKey {
    pub object_id: RawSaiObjectId,
}

/// Scratch state shared by the getters of a single get request.
///
/// Dropped when the request returns, so nothing survives across calls.
#[derive(Debug, Clone, Default)]
pub struct VendorCache {
    /// Table slot the first getter resolved for the request's object.
    pub object_index: Option<u32>,
}

/// Vendor getter callback.
///
/// Arguments: context, target key, output value, position of the attribute
/// in the request, per-request cache, and the entry's opaque argument.
pub type VendorGetter<C> =
    fn(&C, &ObjectKey, &mut SaiAttributeValue, usize, &mut VendorCache, SaiAttrId) -> SaiResult<()>;

/// Vendor metadata for one attribute (sai_vendor_attribute_entry_t).
pub struct VendorAttributeEntry<C: ?Sized> {
    pub id: SaiAttrId,
    pub is_implemented: OperationFlags,
    pub is_supported: OperationFlags,
    pub getter: Option<VendorGetter<C>>,
    pub getter_arg: SaiAttrId,
}

fn find_vendor_attrib<C: ?Sized>(
    vendor: &[VendorAttributeEntry<C>],
    id: SaiAttrId,
) -> Option<&VendorAttributeEntry<C>> {
    vendor.iter().find(|entry| entry.id == id)
}

fn find_functionality_attrib(
    functionality: &[AttributeEntry],
    id: SaiAttrId,
) -> Option<&AttributeEntry> {
    functionality.iter().find(|entry| entry.id == id)
}

/// Validates an attribute list for `op`.
///
/// # Errors
///
/// - [`SaiError::InvalidAttribute`] for unknown or duplicated IDs, IDs not
///   valid for `op`, and value type mismatches
/// - [`SaiError::AttributeNotImplemented`] for IDs the vendor table does not
///   implement or support for `op`
/// - [`SaiError::MandatoryAttributeMissing`] on create when a mandatory
///   attribute is absent
pub fn check_attribs_metadata<C: ?Sized>(
    attrs: &[SaiAttribute],
    functionality: &[AttributeEntry],
    vendor: &[VendorAttributeEntry<C>],
    op: SaiOperation,
) -> SaiResult<()> {
    for (index, attr) in attrs.iter().enumerate() {
        let entry = find_functionality_attrib(functionality, attr.id).ok_or_else(|| {
            SaiError::invalid_attribute(index, format!("unknown attribute id {}", attr.id))
        })?;

        if attrs[..index].iter().any(|prev| prev.id == attr.id) {
            return Err(SaiError::invalid_attribute(
                index,
                format!("{} appears more than once", entry.name),
            ));
        }

        if !entry.valid_for(op) {
            return Err(SaiError::invalid_attribute(
                index,
                format!("{} is not valid for {}", entry.name, op),
            ));
        }

        let implemented = find_vendor_attrib(vendor, attr.id)
            .map(|v| v.is_implemented.allows(op) && v.is_supported.allows(op))
            .unwrap_or(false);
        if !implemented {
            return Err(SaiError::AttributeNotImplemented {
                name: entry.name.to_string(),
            });
        }

        if attr.value.value_type() != entry.value_type {
            return Err(SaiError::invalid_attribute(
                index,
                format!(
                    "{} expects {}, got {}",
                    entry.name,
                    entry.value_type,
                    attr.value.value_type()
                ),
            ));
        }
    }

    if op == SaiOperation::Create {
        if let Some(missing) = functionality
            .iter()
            .filter(|entry| entry.mandatory_on_create)
            .find(|entry| find_attrib_in_list(attrs, entry.id).is_none())
        {
            return Err(SaiError::MandatoryAttributeMissing {
                name: missing.name.to_string(),
            });
        }
    }

    Ok(())
}

/// Fills `attrs` by invoking the vendor getter of each attribute in order.
///
/// Stops at the first getter error. Values written before the failure, and
/// any partial list the failing getter wrote, stay in `attrs`.
pub fn sai_get_attributes<C: ?Sized>(
    ctx: &C,
    key: &ObjectKey,
    functionality: &[AttributeEntry],
    vendor: &[VendorAttributeEntry<C>],
    attrs: &mut [SaiAttribute],
) -> SaiResult<()> {
    check_attribs_metadata(attrs, functionality, vendor, SaiOperation::Get)?;

    let mut cache = VendorCache::default();
    for (index, attr) in attrs.iter_mut().enumerate() {
        let entry = find_vendor_attrib(vendor, attr.id).ok_or_else(|| {
            SaiError::invalid_attribute(index, format!("unknown attribute id {}", attr.id))
        })?;
        let getter = entry.getter.ok_or_else(|| SaiError::AttributeNotImplemented {
            name: format!("attribute id {}", attr.id),
        })?;
        let arg = entry.getter_arg;
        getter(ctx, key, &mut attr.value, index, &mut cache, arg)?;
    }

    Ok(())
}

/// Renders an attribute list as `NAME: value, ...`, cut to `max_len` bytes.
pub fn sai_attr_list_to_str(
    attrs: &[SaiAttribute],
    functionality: &[AttributeEntry],
    max_len: usize,
) -> String {
    let mut out = String::new();
    for (i, attr) in attrs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let name = find_functionality_attrib(functionality, attr.id)
            .map(|entry| entry.name)
            .unwrap_or("unknown");
        // Writing to a String cannot fail.
        let _ = write!(out, "{}: {}", name, attr.value);
    }

    if out.len() > max_len {
        let mut end = max_len;
        while !out.is_char_boundary(end) {
            end -= 1;
        }
        out.truncate(end);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ATTR_COLOR: SaiAttrId = 0;
    const ATTR_PEERS: SaiAttrId = 1;
    const ATTR_SPARE: SaiAttrId = 2;

    static FUNCTIONALITY: [AttributeEntry; 3] = [
        AttributeEntry {
            id: ATTR_COLOR,
            mandatory_on_create: true,
            valid_for_create: true,
            valid_for_set: false,
            valid_for_get: true,
            name: "COLOR",
            value_type: SaiAttrValueType::U32,
        },
        AttributeEntry {
            id: ATTR_PEERS,
            mandatory_on_create: false,
            valid_for_create: false,
            valid_for_set: false,
            valid_for_get: true,
            name: "PEERS",
            value_type: SaiAttrValueType::ObjectList,
        },
        AttributeEntry {
            id: ATTR_SPARE,
            mandatory_on_create: false,
            valid_for_create: true,
            valid_for_set: false,
            valid_for_get: true,
            name: "SPARE",
            value_type: SaiAttrValueType::Bool,
        },
    ];

    struct Ctx {
        color: u32,
        peers: Vec<RawSaiObjectId>,
    }

    fn get_color(
        ctx: &Ctx,
        _key: &ObjectKey,
        value: &mut SaiAttributeValue,
        _attr_index: usize,
        cache: &mut VendorCache,
        _arg: SaiAttrId,
    ) -> SaiResult<()> {
        cache.object_index = Some(7);
        *value = SaiAttributeValue::U32(ctx.color);
        Ok(())
    }

    fn get_peers(
        ctx: &Ctx,
        _key: &ObjectKey,
        value: &mut SaiAttributeValue,
        _attr_index: usize,
        cache: &mut VendorCache,
        _arg: SaiAttrId,
    ) -> SaiResult<()> {
        assert_eq!(cache.object_index, Some(7));
        match value {
            SaiAttributeValue::ObjList(list) => list.fill(ctx.peers.iter().copied()).map(|_| ()),
            _ => Err(SaiError::internal("peers needs a list")),
        }
    }

    fn vendor() -> [VendorAttributeEntry<Ctx>; 3] {
        [
            VendorAttributeEntry {
                id: ATTR_COLOR,
                is_implemented: OperationFlags::new(true, false, false, true),
                is_supported: OperationFlags::new(true, false, false, true),
                getter: Some(get_color),
                getter_arg: ATTR_COLOR,
            },
            VendorAttributeEntry {
                id: ATTR_PEERS,
                is_implemented: OperationFlags::new(false, false, false, true),
                is_supported: OperationFlags::new(false, false, false, true),
                getter: Some(get_peers),
                getter_arg: ATTR_PEERS,
            },
            VendorAttributeEntry {
                id: ATTR_SPARE,
                is_implemented: OperationFlags::default(),
                is_supported: OperationFlags::default(),
                getter: None,
                getter_arg: ATTR_SPARE,
            },
        ]
    }

    fn check(attrs: &[SaiAttribute], op: SaiOperation) -> SaiResult<()> {
        check_attribs_metadata(attrs, &FUNCTIONALITY, &vendor(), op)
    }

    fn get(ctx: &Ctx, attrs: &mut [SaiAttribute]) -> SaiResult<()> {
        let key = ObjectKey { object_id: 1 };
        sai_get_attributes(ctx, &key, &FUNCTIONALITY, &vendor(), attrs)
    }

    #[test]
    fn test_object_list_fill_within_capacity() {
        let mut list = ObjectList::with_capacity(3);
        assert_eq!(list.fill([1, 2]).unwrap(), 2);
        assert_eq!(list.as_slice(), &[1, 2]);
        assert_eq!(list.capacity(), 3);
    }

    #[test]
    fn test_object_list_fill_overflow_keeps_prefix() {
        let mut list = ObjectList::with_capacity(2);
        let err = list.fill([10, 20, 30]).unwrap_err();
        assert_eq!(
            err,
            SaiError::BufferOverflow {
                required: 3,
                capacity: 2
            }
        );
        assert_eq!(list.as_slice(), &[10, 20]);
    }

    #[test]
    fn test_object_list_zero_capacity() {
        let mut list = ObjectList::with_capacity(0);
        assert!(list.fill(std::iter::empty::<RawSaiObjectId>()).is_ok());
        assert!(list.fill([1]).is_err());
        assert!(list.is_empty());
    }

    #[test]
    fn test_object_list_huge_capacity_allocates_lazily() {
        let mut list = ObjectList::with_capacity(usize::MAX);
        assert_eq!(list.capacity(), usize::MAX);
        assert_eq!(list.fill([1, 2]).unwrap(), 2);
        assert_eq!(list.as_slice(), &[1, 2]);

        let attr = SaiAttribute::obj_list(ATTR_PEERS, usize::MAX);
        assert!(attr.value.as_obj_list().unwrap().is_empty());
    }

    #[test]
    fn test_find_attrib_in_list() {
        let attrs = vec![
            SaiAttribute::new(ATTR_SPARE, SaiAttributeValue::Bool(true)),
            SaiAttribute::new(ATTR_COLOR, SaiAttributeValue::U32(4)),
        ];
        let (index, value) = find_attrib_in_list(&attrs, ATTR_COLOR).unwrap();
        assert_eq!(index, 1);
        assert_eq!(value, &SaiAttributeValue::U32(4));
        assert!(find_attrib_in_list(&attrs, ATTR_PEERS).is_none());
    }

    #[test]
    fn test_check_create_accepts_valid_list() {
        let attrs = vec![SaiAttribute::new(ATTR_COLOR, SaiAttributeValue::U32(1))];
        assert!(check(&attrs, SaiOperation::Create).is_ok());
    }

    #[test]
    fn test_check_create_missing_mandatory() {
        let err = check(&[], SaiOperation::Create).unwrap_err();
        assert_eq!(
            err,
            SaiError::MandatoryAttributeMissing {
                name: "COLOR".to_string()
            }
        );
    }

    #[test]
    fn test_check_rejects_unknown_and_duplicate() {
        let unknown = vec![SaiAttribute::oid(99, 0)];
        let err = check(&unknown, SaiOperation::Get).unwrap_err();
        assert!(matches!(err, SaiError::InvalidAttribute { index: 0, .. }));

        let dup = vec![
            SaiAttribute::new(ATTR_COLOR, SaiAttributeValue::U32(1)),
            SaiAttribute::new(ATTR_COLOR, SaiAttributeValue::U32(2)),
        ];
        let err = check(&dup, SaiOperation::Create).unwrap_err();
        assert!(matches!(err, SaiError::InvalidAttribute { index: 1, .. }));
    }

    #[test]
    fn test_check_rejects_wrong_operation_and_type() {
        let not_creatable = vec![
            SaiAttribute::new(ATTR_COLOR, SaiAttributeValue::U32(1)),
            SaiAttribute::obj_list(ATTR_PEERS, 1),
        ];
        let err = check(&not_creatable, SaiOperation::Create).unwrap_err();
        assert!(matches!(err, SaiError::InvalidAttribute { index: 1, .. }));

        let wrong_type = vec![SaiAttribute::oid(ATTR_COLOR, 5)];
        let err = check(&wrong_type, SaiOperation::Create).unwrap_err();
        assert!(matches!(err, SaiError::InvalidAttribute { index: 0, .. }));
    }

    #[test]
    fn test_check_rejects_unimplemented_vendor_attribute() {
        let attrs = vec![
            SaiAttribute::new(ATTR_COLOR, SaiAttributeValue::U32(1)),
            SaiAttribute::new(ATTR_SPARE, SaiAttributeValue::Bool(false)),
        ];
        let err = check(&attrs, SaiOperation::Create).unwrap_err();
        assert!(matches!(err, SaiError::AttributeNotImplemented { .. }));
    }

    #[test]
    fn test_get_attributes_dispatches_in_order() {
        let ctx = Ctx {
            color: 9,
            peers: vec![0x11, 0x22],
        };
        let mut attrs = vec![
            SaiAttribute::new(ATTR_COLOR, SaiAttributeValue::U32(0)),
            SaiAttribute::obj_list(ATTR_PEERS, 4),
        ];
        get(&ctx, &mut attrs).unwrap();

        assert_eq!(attrs[0].value, SaiAttributeValue::U32(9));
        assert_eq!(
            attrs[1].value.as_obj_list().unwrap().as_slice(),
            &[0x11, 0x22]
        );
    }

    #[test]
    fn test_get_attributes_propagates_overflow() {
        let ctx = Ctx {
            color: 1,
            peers: vec![1, 2, 3],
        };
        let mut attrs = vec![
            SaiAttribute::new(ATTR_COLOR, SaiAttributeValue::U32(0)),
            SaiAttribute::obj_list(ATTR_PEERS, 2),
        ];
        let err = get(&ctx, &mut attrs).unwrap_err();
        assert!(matches!(err, SaiError::BufferOverflow { .. }));
        assert_eq!(attrs[1].value.as_obj_list().unwrap().as_slice(), &[1, 2]);
    }

    #[test]
    fn test_attr_list_to_str() {
        let attrs = vec![
            SaiAttribute::new(ATTR_COLOR, SaiAttributeValue::U32(3)),
            SaiAttribute::new(
                ATTR_PEERS,
                SaiAttributeValue::ObjList(ObjectList::from_ids(vec![0x2a])),
            ),
        ];
        assert_eq!(
            sai_attr_list_to_str(&attrs, &FUNCTIONALITY, MAX_LIST_VALUE_STR_LEN),
            "COLOR: 3, PEERS: 1 : [0x000000000000002a]"
        );
        assert_eq!(sai_attr_list_to_str(&attrs, &FUNCTIONALITY, 8), "COLOR: 3");
        assert_eq!(sai_attr_list_to_str(&[], &FUNCTIONALITY, 8), "");
    }
}
