//! Fixed-capacity LAG database.
//!
//! LAGs and members live in preallocated slot tables. Identifiers are
//! index-encoded: the slot index plus the slot generation in the extension
//! bits. Allocation is first-fit, so the lowest free slot always wins.
//!
//! A slot whose generation is exhausted is retired instead of wrapping back to
//! zero, so an identifier handed out once can never resolve again after its
//! record is freed. Retired slots reduce the table's usable capacity.
//!
//! Each LAG record keeps a back-reference array indexed by member slot, so
//! `lag.member_ids[m]` is non-null exactly when member slot `m` belongs to
//! that LAG.

use log::{debug, warn};
use sonic_sai::{
    LagMemberOid, LagOid, ObjectList, PortOid, RawSaiObjectId, SaiError, SaiObjectType, SaiResult,
    VendorCache, SAI_NULL_OBJECT_ID,
};

use super::store::LagStore;
use super::types::LagMemberField;
use crate::config::LagDbStrategy;

/// Allocates an empty vector able to hold `len` records without growing.
fn table_storage<T>(what: &str, len: usize) -> SaiResult<Vec<T>> {
    let mut storage = Vec::new();
    match storage.try_reserve_exact(len) {
        Ok(()) => Ok(storage),
        Err(e) => Err(SaiError::no_memory(format!("{} table: {}", what, e))),
    }
}

#[derive(Debug, Clone)]
struct LagEntry {
    is_used: bool,
    retired: bool,
    generation: u16,
    member_ids: Vec<RawSaiObjectId>,
}

impl LagEntry {
    fn new(max_members: usize) -> SaiResult<Self> {
        let mut member_ids = table_storage("LAG member reference", max_members)?;
        member_ids.resize(max_members, SAI_NULL_OBJECT_ID);
        Ok(Self {
            is_used: false,
            retired: false,
            generation: 0,
            member_ids,
        })
    }

    fn is_free(&self) -> bool {
        !self.is_used && !self.retired
    }

    fn has_members(&self) -> bool {
        self.member_ids.iter().any(|&id| id != SAI_NULL_OBJECT_ID)
    }
}

/// Fixed-capacity LAG table.
#[derive(Debug, Clone)]
pub struct FixedLagTable {
    lags: Vec<LagEntry>,
}

impl FixedLagTable {
    /// Creates a table of `max_lags` free slots, each able to reference
    /// `max_members` members.
    ///
    /// # Errors
    ///
    /// `NoMemory` if the slots cannot be allocated.
    pub fn new(max_lags: usize, max_members: usize) -> SaiResult<Self> {
        let mut lags = table_storage("LAG", max_lags)?;
        for _ in 0..max_lags {
            lags.push(LagEntry::new(max_members)?);
        }
        Ok(Self { lags })
    }

    /// Marks the lowest free slot used and returns its index.
    pub fn allocate(&mut self) -> SaiResult<u32> {
        let index = self
            .lags
            .iter()
            .position(LagEntry::is_free)
            .ok_or_else(|| SaiError::table_full("LAG"))?;
        let entry = &mut self.lags[index];
        entry.is_used = true;
        entry.member_ids.fill(SAI_NULL_OBJECT_ID);
        slot_index(index)
    }

    /// Releases a slot; the next identifier minted for it gets a new generation.
    pub fn free(&mut self, index: u32) -> SaiResult<()> {
        let entry = self
            .lags
            .get_mut(index as usize)
            .filter(|entry| entry.is_used)
            .ok_or_else(|| SaiError::not_found(format!("LAG slot {}", index)))?;
        entry.is_used = false;
        match entry.generation.checked_add(1) {
            Some(generation) => entry.generation = generation,
            None => {
                debug!("LAG slot {} retired", index);
                entry.retired = true;
            }
        }
        Ok(())
    }

    /// Resolves a LAG identifier to its live slot.
    pub fn lookup(&self, lag: LagOid) -> SaiResult<u32> {
        let decoded = lag.index()?;
        match self.lags.get(decoded.index as usize) {
            Some(entry) if entry.is_used && entry.generation == decoded.ext => Ok(decoded.index),
            _ => Err(SaiError::invalid_object_id(lag.as_raw(), SaiObjectType::Lag)),
        }
    }

    /// Identifier of the record currently in `index`.
    pub fn oid(&self, index: u32) -> LagOid {
        let generation = self.lags.get(index as usize).map_or(0, |e| e.generation);
        LagOid::encode(index, generation)
    }

    /// Member identifiers referenced by the LAG in `index`, by member slot.
    pub fn member_ids(&self, index: u32) -> impl Iterator<Item = RawSaiObjectId> + '_ {
        self.lags
            .get(index as usize)
            .into_iter()
            .flat_map(|entry| entry.member_ids.iter().copied())
            .filter(|&id| id != SAI_NULL_OBJECT_ID)
    }

    fn has_members(&self, index: u32) -> bool {
        self.lags
            .get(index as usize)
            .is_some_and(|entry| entry.has_members())
    }

    /// Records `member` in the back-reference array of the LAG in `index`.
    fn link(&mut self, index: u32, member_slot: u32, member: RawSaiObjectId) {
        let Some(entry) = self.lags.get_mut(index as usize) else {
            return;
        };
        if let Some(slot) = entry.member_ids.get_mut(member_slot as usize) {
            *slot = member;
        }
    }

    pub fn used_count(&self) -> usize {
        self.lags.iter().filter(|entry| entry.is_used).count()
    }
}

#[derive(Debug, Clone, Default)]
struct LagMemberEntry {
    is_used: bool,
    retired: bool,
    generation: u16,
    lag_id: LagOid,
    port_id: PortOid,
}

impl LagMemberEntry {
    fn is_free(&self) -> bool {
        !self.is_used && !self.retired
    }
}

/// Fixed-capacity LAG member table.
#[derive(Debug, Clone)]
pub struct FixedLagMemberTable {
    members: Vec<LagMemberEntry>,
}

impl FixedLagMemberTable {
    /// # Errors
    ///
    /// `NoMemory` if the slots cannot be allocated.
    pub fn new(max_members: usize) -> SaiResult<Self> {
        let mut members = table_storage("LAG member", max_members)?;
        members.resize_with(max_members, LagMemberEntry::default);
        Ok(Self { members })
    }

    /// Fills the lowest free slot and returns its index.
    ///
    /// The caller must have resolved `lag` to a live LAG.
    pub fn allocate(&mut self, lag: LagOid, port: PortOid) -> SaiResult<u32> {
        let index = self
            .members
            .iter()
            .position(LagMemberEntry::is_free)
            .ok_or_else(|| SaiError::table_full("LAG member"))?;
        let entry = &mut self.members[index];
        entry.is_used = true;
        entry.lag_id = lag;
        entry.port_id = port;
        slot_index(index)
    }

    /// Resets every field of the slot, then marks it free.
    pub fn free(&mut self, index: u32) -> SaiResult<()> {
        let entry = self
            .members
            .get_mut(index as usize)
            .filter(|entry| entry.is_used)
            .ok_or_else(|| SaiError::not_found(format!("LAG member slot {}", index)))?;
        let (generation, retired) = match entry.generation.checked_add(1) {
            Some(generation) => (generation, false),
            None => {
                debug!("LAG member slot {} retired", index);
                (entry.generation, true)
            }
        };
        *entry = LagMemberEntry {
            retired,
            generation,
            ..LagMemberEntry::default()
        };
        Ok(())
    }

    /// Resolves a member identifier to its live slot.
    pub fn lookup(&self, member: LagMemberOid) -> SaiResult<u32> {
        let decoded = member.index()?;
        match self.members.get(decoded.index as usize) {
            Some(entry) if entry.is_used && entry.generation == decoded.ext => Ok(decoded.index),
            _ => Err(SaiError::invalid_object_id(
                member.as_raw(),
                SaiObjectType::LagMember,
            )),
        }
    }

    pub fn oid(&self, index: u32) -> LagMemberOid {
        let generation = self.members.get(index as usize).map_or(0, |e| e.generation);
        LagMemberOid::encode(index, generation)
    }

    /// Reads one field of the live record in `index`.
    pub fn get_field(&self, index: u32, field: LagMemberField) -> SaiResult<RawSaiObjectId> {
        let entry = self
            .members
            .get(index as usize)
            .filter(|entry| entry.is_used)
            .ok_or_else(|| SaiError::not_found(format!("LAG member slot {}", index)))?;
        Ok(match field {
            LagMemberField::LagId => entry.lag_id.as_raw(),
            LagMemberField::PortId => entry.port_id.as_raw(),
        })
    }

    fn owner(&self, index: u32) -> Option<LagOid> {
        self.members
            .get(index as usize)
            .filter(|entry| entry.is_used)
            .map(|entry| entry.lag_id)
    }

    /// Ports of the live members of `lag`, in ascending slot order.
    pub fn ports_of(&self, lag: LagOid) -> impl Iterator<Item = RawSaiObjectId> + '_ {
        self.members
            .iter()
            .filter(move |entry| entry.is_used && entry.lag_id == lag)
            .map(|entry| entry.port_id.as_raw())
    }

    pub fn used_count(&self) -> usize {
        self.members.iter().filter(|entry| entry.is_used).count()
    }
}

fn slot_index(index: usize) -> SaiResult<u32> {
    u32::try_from(index).map_err(|_| SaiError::internal(format!("slot {} exceeds u32", index)))
}

/// LAG database backed by fixed-capacity slot tables.
#[derive(Debug, Clone)]
pub struct FixedLagStore {
    lags: FixedLagTable,
    members: FixedLagMemberTable,
}

impl FixedLagStore {
    /// # Errors
    ///
    /// `NoMemory` if either table cannot be allocated.
    pub fn new(max_lags: usize, max_members: usize) -> SaiResult<Self> {
        debug!("Fixed LAG DB: {} LAGs, {} members", max_lags, max_members);
        Ok(Self {
            lags: FixedLagTable::new(max_lags, max_members)?,
            members: FixedLagMemberTable::new(max_members)?,
        })
    }
}

impl LagStore for FixedLagStore {
    fn strategy(&self) -> LagDbStrategy {
        LagDbStrategy::Fixed
    }

    fn create_lag(&mut self) -> SaiResult<LagOid> {
        let index = self.lags.allocate()?;
        debug!("Created on index {}", index);
        Ok(self.lags.oid(index))
    }

    fn remove_lag(&mut self, lag: LagOid) -> SaiResult<()> {
        let index = self.lags.lookup(lag)?;
        if self.lags.has_members(index) {
            return Err(SaiError::object_in_use(format!("LAG {} has members", lag)));
        }
        self.lags.free(index)
    }

    fn check_lag(&self, lag: LagOid) -> SaiResult<()> {
        self.lags.lookup(lag).map(|_| ())
    }

    fn lag_ports(&self, lag: LagOid, ports: &mut ObjectList) -> SaiResult<usize> {
        self.lags.lookup(lag)?;
        ports.fill(self.members.ports_of(lag))
    }

    fn lag_members(&self, lag: LagOid) -> SaiResult<Vec<LagMemberOid>> {
        let index = self.lags.lookup(lag)?;
        let members = self.lags.member_ids(index);
        Ok(members.map(LagMemberOid::from_raw_unchecked).collect())
    }

    fn create_lag_member(&mut self, lag: LagOid, port: PortOid) -> SaiResult<LagMemberOid> {
        let lag_index = self.lags.lookup(lag)?;
        let member_index = self.members.allocate(lag, port)?;
        let member = self.members.oid(member_index);
        self.lags.link(lag_index, member_index, member.as_raw());
        Ok(member)
    }

    fn remove_lag_member(&mut self, member: LagMemberOid) -> SaiResult<()> {
        let member_index = self.members.lookup(member)?;
        let owner = self.members.owner(member_index);
        match owner.map(|lag| self.lags.lookup(lag)) {
            Some(Ok(lag_index)) => self.lags.link(lag_index, member_index, SAI_NULL_OBJECT_ID),
            _ => warn!("LAG member {} has no live owning LAG", member),
        }
        self.members.free(member_index)
    }

    fn check_lag_member(&self, member: LagMemberOid) -> SaiResult<()> {
        self.members.lookup(member).map(|_| ())
    }

    fn lag_member_field(
        &self,
        member: LagMemberOid,
        field: LagMemberField,
        cache: &mut VendorCache,
    ) -> SaiResult<RawSaiObjectId> {
        let index = match cache.object_index {
            Some(index) => index,
            None => {
                let index = self.members.lookup(member)?;
                cache.object_index = Some(index);
                index
            }
        };
        self.members.get_field(index, field)
    }

    fn lag_count(&self) -> usize {
        self.lags.used_count()
    }

    fn lag_member_count(&self) -> usize {
        self.members.used_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn port(n: u32) -> PortOid {
        PortOid::encode(n, 0)
    }

    #[test]
    fn test_lag_allocate_first_fit() {
        let mut table = FixedLagTable::new(3, 4).unwrap();
        assert_eq!(table.allocate().unwrap(), 0);
        assert_eq!(table.allocate().unwrap(), 1);
        table.free(0).unwrap();
        assert_eq!(table.allocate().unwrap(), 0);
        assert_eq!(table.allocate().unwrap(), 2);
        assert!(matches!(table.allocate(), Err(SaiError::TableFull { .. })));
    }

    #[test]
    fn test_lag_free_unused_slot() {
        let mut table = FixedLagTable::new(2, 4).unwrap();
        assert!(matches!(table.free(0), Err(SaiError::NotFound { .. })));
        assert!(matches!(table.free(9), Err(SaiError::NotFound { .. })));
    }

    #[test]
    fn test_lag_lookup_rejects_stale_generation() {
        let mut table = FixedLagTable::new(1, 4).unwrap();
        let index = table.allocate().unwrap();
        let old = table.oid(index);
        assert_eq!(table.lookup(old).unwrap(), index);

        table.free(index).unwrap();
        assert!(table.lookup(old).is_err());

        let index = table.allocate().unwrap();
        let new = table.oid(index);
        assert_ne!(old, new);
        assert!(table.lookup(old).is_err());
        assert_eq!(table.lookup(new).unwrap(), index);
    }

    #[test]
    fn test_lag_lookup_rejects_out_of_range() {
        let table = FixedLagTable::new(2, 4).unwrap();
        assert!(table.lookup(LagOid::encode(7, 0)).is_err());
    }

    #[test]
    fn test_member_free_clears_record() {
        let mut table = FixedLagMemberTable::new(2).unwrap();
        let lag = LagOid::encode(0, 0);
        let index = table.allocate(lag, port(11)).unwrap();
        assert_eq!(
            table.get_field(index, LagMemberField::PortId).unwrap(),
            port(11).as_raw()
        );

        table.free(index).unwrap();
        let err = table.get_field(index, LagMemberField::PortId);
        assert!(err.is_err());
        assert_eq!(table.members[index as usize].lag_id, LagOid::NULL);
        assert_eq!(table.members[index as usize].port_id, PortOid::NULL);
        assert_eq!(table.members[index as usize].generation, 1);
    }

    #[test]
    fn test_member_capacity() {
        let mut table = FixedLagMemberTable::new(1).unwrap();
        let lag = LagOid::encode(0, 0);
        table.allocate(lag, port(1)).unwrap();
        assert!(matches!(
            table.allocate(lag, port(2)),
            Err(SaiError::TableFull { .. })
        ));
    }

    #[test]
    fn test_store_back_references() {
        let mut store = FixedLagStore::new(2, 4).unwrap();
        let lag_a = store.create_lag().unwrap();
        let lag_b = store.create_lag().unwrap();

        let m0 = store.create_lag_member(lag_a, port(1)).unwrap();
        let m1 = store.create_lag_member(lag_b, port(2)).unwrap();
        let m2 = store.create_lag_member(lag_a, port(3)).unwrap();

        assert_eq!(store.lag_members(lag_a).unwrap(), vec![m0, m2]);
        assert_eq!(store.lag_members(lag_b).unwrap(), vec![m1]);

        store.remove_lag_member(m0).unwrap();
        assert_eq!(store.lag_members(lag_a).unwrap(), vec![m2]);
        assert_eq!(store.lag_member_count(), 2);
    }

    #[test]
    fn test_store_remove_lag_with_members_rejected() {
        let mut store = FixedLagStore::new(1, 2).unwrap();
        let lag = store.create_lag().unwrap();
        let member = store.create_lag_member(lag, port(5)).unwrap();

        assert!(matches!(
            store.remove_lag(lag),
            Err(SaiError::ObjectInUse { .. })
        ));
        assert!(store.check_lag(lag).is_ok());

        store.remove_lag_member(member).unwrap();
        store.remove_lag(lag).unwrap();
        assert_eq!(store.lag_count(), 0);
    }

    #[test]
    fn test_store_member_field_uses_cache() {
        let mut store = FixedLagStore::new(1, 2).unwrap();
        let lag = store.create_lag().unwrap();
        let member = store.create_lag_member(lag, port(7)).unwrap();

        let mut cache = VendorCache::default();
        let owner = store
            .lag_member_field(member, LagMemberField::LagId, &mut cache)
            .unwrap();
        assert_eq!(owner, lag.as_raw());
        assert_eq!(cache.object_index, Some(0));

        let port_id = store
            .lag_member_field(member, LagMemberField::PortId, &mut cache)
            .unwrap();
        assert_eq!(port_id, port(7).as_raw());
    }

    #[test]
    fn test_store_create_member_on_missing_lag() {
        let mut store = FixedLagStore::new(1, 2).unwrap();
        let lag = store.create_lag().unwrap();
        store.remove_lag(lag).unwrap();
        assert!(matches!(
            store.create_lag_member(lag, port(1)),
            Err(SaiError::InvalidObjectId { .. })
        ));
        assert_eq!(store.lag_member_count(), 0);
    }

    #[test]
    fn test_lag_slot_retired_when_generation_exhausted() {
        let mut table = FixedLagTable::new(1, 4).unwrap();
        let index = table.allocate().unwrap();
        let first = table.oid(index);
        for _ in 0..u16::MAX {
            table.free(index).unwrap();
            assert_eq!(table.allocate().unwrap(), index);
        }
        assert_eq!(table.oid(index).index().unwrap().ext, u16::MAX);

        table.free(index).unwrap();
        assert!(matches!(table.allocate(), Err(SaiError::TableFull { .. })));
        assert!(table.lookup(first).is_err());
        assert!(table.lookup(table.oid(index)).is_err());
    }

    #[test]
    fn test_member_slot_retired_when_generation_exhausted() {
        let mut table = FixedLagMemberTable::new(2).unwrap();
        let lag = LagOid::encode(0, 0);
        let index = table.allocate(lag, port(1)).unwrap();
        let first = table.oid(index);
        for _ in 0..u16::MAX {
            table.free(0).unwrap();
            assert_eq!(table.allocate(lag, port(1)).unwrap(), 0);
        }
        table.free(0).unwrap();

        assert!(table.lookup(first).is_err());
        assert_eq!(table.allocate(lag, port(2)).unwrap(), 1);
        assert!(matches!(
            table.allocate(lag, port(3)),
            Err(SaiError::TableFull { .. })
        ));
    }

    #[test]
    fn test_new_reports_unallocatable_table() {
        let err = FixedLagTable::new(usize::MAX, 1).unwrap_err();
        assert!(matches!(err, SaiError::NoMemory { .. }));
        let err = FixedLagMemberTable::new(usize::MAX).unwrap_err();
        assert!(matches!(err, SaiError::NoMemory { .. }));
    }
}
