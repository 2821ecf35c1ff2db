//! LAG API: the eight public LAG and LAG member operations.
//!
//! Every call validates its attribute list against the metadata tables before
//! touching the store, so a rejected request never leaves a partial record.

use log::{debug, info, warn};
use sonic_sai::{
    check_attribs_metadata, find_attrib_in_list, sai_attr_list_to_str, sai_get_attributes,
    AttributeEntry, LagMemberOid, LagOid, ObjectKey, OperationFlags, PortOid, RawSaiObjectId,
    SaiAttrId, SaiAttribute, SaiAttributeValue, SaiError, SaiOperation, SaiResult,
    VendorAttributeEntry, VendorCache, MAX_LIST_VALUE_STR_LEN,
};

use super::attribs::{
    LAG_ATTRIBS, LAG_MEMBER_ATTRIBS, SAI_LAG_ATTR_PORT_LIST, SAI_LAG_MEMBER_ATTR_LAG_ID,
    SAI_LAG_MEMBER_ATTR_PORT_ID,
};
use super::dynamic::DynamicLagStore;
use super::fixed::FixedLagStore;
use super::store::LagStore;
use super::types::LagMemberField;
use crate::config::{LagDbConfig, LagDbStrategy};

/// Public LAG operations (sai_lag_api_t).
pub trait LagApi {
    fn create_lag(&mut self, attrs: &[SaiAttribute]) -> SaiResult<LagOid>;

    /// Removes a LAG. The LAG must have no members.
    fn remove_lag(&mut self, lag: LagOid) -> SaiResult<()>;

    /// Accepted without effect; a LAG has no settable attributes.
    fn set_lag_attribute(&mut self, lag: LagOid, attr: &SaiAttribute) -> SaiResult<()>;

    fn get_lag_attribute(&self, lag: LagOid, attrs: &mut [SaiAttribute]) -> SaiResult<()>;

    fn create_lag_member(&mut self, attrs: &[SaiAttribute]) -> SaiResult<LagMemberOid>;

    fn remove_lag_member(&mut self, member: LagMemberOid) -> SaiResult<()>;

    /// Accepted without effect; a LAG member has no settable attributes.
    fn set_lag_member_attribute(
        &mut self,
        member: LagMemberOid,
        attr: &SaiAttribute,
    ) -> SaiResult<()>;

    fn get_lag_member_attribute(
        &self,
        member: LagMemberOid,
        attrs: &mut [SaiAttribute],
    ) -> SaiResult<()>;
}

const GET_ONLY: OperationFlags = OperationFlags::new(false, false, false, true);
const CREATE_GET: OperationFlags = OperationFlags::new(true, false, false, true);

static LAG_VENDOR_ATTRIBS: [VendorAttributeEntry<LagService>; 1] = [VendorAttributeEntry {
    id: SAI_LAG_ATTR_PORT_LIST,
    is_implemented: GET_ONLY,
    is_supported: GET_ONLY,
    getter: Some(lag_port_list_getter),
    getter_arg: SAI_LAG_ATTR_PORT_LIST,
}];

static LAG_MEMBER_VENDOR_ATTRIBS: [VendorAttributeEntry<LagService>; 2] = [
    VendorAttributeEntry {
        id: SAI_LAG_MEMBER_ATTR_LAG_ID,
        is_implemented: CREATE_GET,
        is_supported: CREATE_GET,
        getter: Some(lag_member_field_getter),
        getter_arg: SAI_LAG_MEMBER_ATTR_LAG_ID,
    },
    VendorAttributeEntry {
        id: SAI_LAG_MEMBER_ATTR_PORT_ID,
        is_implemented: CREATE_GET,
        is_supported: CREATE_GET,
        getter: Some(lag_member_field_getter),
        getter_arg: SAI_LAG_MEMBER_ATTR_PORT_ID,
    },
];

fn lag_port_list_getter(
    service: &LagService,
    key: &ObjectKey,
    value: &mut SaiAttributeValue,
    attr_index: usize,
    _cache: &mut VendorCache,
    _arg: SaiAttrId,
) -> SaiResult<()> {
    let SaiAttributeValue::ObjList(ports) = value else {
        return Err(SaiError::invalid_attribute(attr_index, "port list needs an object list"));
    };
    let lag = LagOid::from_raw_unchecked(key.object_id);
    service.store.lag_ports(lag, ports).map(|_| ())
}

fn lag_member_field_getter(
    service: &LagService,
    key: &ObjectKey,
    value: &mut SaiAttributeValue,
    _attr_index: usize,
    cache: &mut VendorCache,
    arg: SaiAttrId,
) -> SaiResult<()> {
    let Some(field) = LagMemberField::from_attr_id(arg) else {
        warn!("Got unexpected attribute ID {}", arg);
        return Err(SaiError::not_supported(format!("LAG member attribute {}", arg)));
    };
    let member = LagMemberOid::from_raw_unchecked(key.object_id);
    let oid = service.store.lag_member_field(member, field, cache)?;
    debug!("Writing {} 0x{:016x}", field, oid);
    *value = SaiAttributeValue::Oid(oid);
    Ok(())
}

fn check_create(
    attrs: &[SaiAttribute],
    functionality: &[AttributeEntry],
    vendor: &[VendorAttributeEntry<LagService>],
) -> SaiResult<()> {
    let result = check_attribs_metadata(attrs, functionality, vendor, SaiOperation::Create);
    if let Err(e) = &result {
        warn!("Failed attributes check: {}", e);
    }
    result
}

/// Looks up a mandatory object id attribute, returning its position and value.
fn required_oid(
    attrs: &[SaiAttribute],
    id: SaiAttrId,
    name: &str,
) -> SaiResult<(usize, RawSaiObjectId)> {
    let Some((index, value)) = find_attrib_in_list(attrs, id) else {
        return Err(SaiError::MandatoryAttributeMissing {
            name: name.to_string(),
        });
    };
    match value.as_oid() {
        Some(oid) => Ok((index, oid)),
        None => Err(SaiError::invalid_attribute(index, format!("{} is not an object id", name))),
    }
}

/// LAG API backed by one [`LagStore`].
pub struct LagService {
    store: Box<dyn LagStore>,
}

impl LagService {
    /// Builds an empty database for the configured strategy.
    ///
    /// # Errors
    ///
    /// `NoMemory` if the fixed tables cannot be allocated.
    pub fn new(config: &LagDbConfig) -> SaiResult<Self> {
        let store: Box<dyn LagStore> = match config.strategy {
            LagDbStrategy::Fixed => {
                let store = FixedLagStore::new(config.max_lags, config.max_lag_members)?;
                Box::new(store)
            }
            LagDbStrategy::Dynamic => Box::new(DynamicLagStore::new()),
        };
        Ok(Self::with_store(store))
    }

    pub fn with_store(store: Box<dyn LagStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn LagStore {
        self.store.as_ref()
    }

    pub fn strategy(&self) -> LagDbStrategy {
        self.store.strategy()
    }
}

impl LagApi for LagService {
    fn create_lag(&mut self, attrs: &[SaiAttribute]) -> SaiResult<LagOid> {
        check_create(attrs, &LAG_ATTRIBS, &LAG_VENDOR_ATTRIBS)?;

        let lag = self.store.create_lag().map_err(|e| {
            warn!("Cannot create LAG: {}", e);
            e
        })?;
        info!(
            "CREATED LAG: {} ({})",
            lag,
            sai_attr_list_to_str(attrs, &LAG_ATTRIBS, MAX_LIST_VALUE_STR_LEN)
        );
        Ok(lag)
    }

    fn remove_lag(&mut self, lag: LagOid) -> SaiResult<()> {
        self.store.remove_lag(lag).map_err(|e| {
            warn!("Cannot remove LAG {}: {}", lag, e);
            e
        })?;
        info!("REMOVED LAG: {}", lag);
        Ok(())
    }

    fn set_lag_attribute(&mut self, lag: LagOid, attr: &SaiAttribute) -> SaiResult<()> {
        info!("SET LAG ATTRIBUTE: {} (attr {})", lag, attr.id);
        Ok(())
    }

    fn get_lag_attribute(&self, lag: LagOid, attrs: &mut [SaiAttribute]) -> SaiResult<()> {
        self.store.check_lag(lag)?;
        let key = ObjectKey {
            object_id: lag.as_raw(),
        };
        // Logged even on failure so a partially filled port list is visible.
        let result = sai_get_attributes(self, &key, &LAG_ATTRIBS, &LAG_VENDOR_ATTRIBS, attrs);
        info!(
            "GET LAG ATTRIBUTE: {} ({})",
            lag,
            sai_attr_list_to_str(attrs, &LAG_ATTRIBS, MAX_LIST_VALUE_STR_LEN)
        );
        result
    }

    fn create_lag_member(&mut self, attrs: &[SaiAttribute]) -> SaiResult<LagMemberOid> {
        check_create(attrs, &LAG_MEMBER_ATTRIBS, &LAG_MEMBER_VENDOR_ATTRIBS)?;

        let (_, lag) = required_oid(attrs, SAI_LAG_MEMBER_ATTR_LAG_ID, "LAG ID")?;
        let (port_index, port) = required_oid(attrs, SAI_LAG_MEMBER_ATTR_PORT_ID, "PORT ID")?;
        let lag = LagOid::from_raw_unchecked(lag);
        let port = PortOid::from_raw_unchecked(port);

        if let Err(e) = self.store.check_lag(lag) {
            warn!("Cannot create LAG member: LAG {} does not exist", lag);
            return Err(e);
        }
        if !self.store.port_supported(port) {
            warn!("Cannot create LAG member: port {} not supported", port);
            let message = format!("port {} is not supported", port);
            return Err(SaiError::invalid_attribute(port_index, message));
        }

        let member = self.store.create_lag_member(lag, port).map_err(|e| {
            warn!("Failed to create a lag member: {}", e);
            e
        })?;
        info!(
            "CREATED LAG MEMBER: {} ({})",
            member,
            sai_attr_list_to_str(attrs, &LAG_MEMBER_ATTRIBS, MAX_LIST_VALUE_STR_LEN)
        );
        Ok(member)
    }

    fn remove_lag_member(&mut self, member: LagMemberOid) -> SaiResult<()> {
        self.store.remove_lag_member(member).map_err(|e| {
            warn!("Cannot remove LAG member {}: {}", member, e);
            e
        })?;
        info!("REMOVE LAG MEMBER: {}", member);
        Ok(())
    }

    fn set_lag_member_attribute(
        &mut self,
        member: LagMemberOid,
        attr: &SaiAttribute,
    ) -> SaiResult<()> {
        info!("SET LAG MEMBER ATTRIBUTE: {} (attr {})", member, attr.id);
        Ok(())
    }

    fn get_lag_member_attribute(
        &self,
        member: LagMemberOid,
        attrs: &mut [SaiAttribute],
    ) -> SaiResult<()> {
        if let Err(e) = self.store.check_lag_member(member) {
            warn!("Failed to get member attribute: lag member is not used");
            return Err(e);
        }
        let key = ObjectKey {
            object_id: member.as_raw(),
        };
        let result = sai_get_attributes(
            self,
            &key,
            &LAG_MEMBER_ATTRIBS,
            &LAG_MEMBER_VENDOR_ATTRIBS,
            attrs,
        );
        info!(
            "GET LAG MEMBER ATTRIBUTE: {} ({})",
            member,
            sai_attr_list_to_str(attrs, &LAG_MEMBER_ATTRIBS, MAX_LIST_VALUE_STR_LEN)
        );
        result
    }
}
