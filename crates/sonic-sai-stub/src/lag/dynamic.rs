//! Growable LAG database with packed member identifiers.
//!
//! LAG slots grow on demand and are reused lowest-first once vacated. A
//! vacated slot keeps its place in the table and bumps its generation, so a
//! removal never moves another LAG and a stale LAG identifier never resolves
//! to the slot's next occupant. A slot whose generation is exhausted is
//! retired and never handed out again; the table grows past it instead.
//!
//! Members are not stored in a table of their own. Each LAG keeps the packed
//! identifiers of its members in attach order; the member port travels in the
//! low 16 bits of the identifier, and the owning LAG is found by scanning.

use log::debug;
use sonic_sai::{
    LagMemberOid, LagOid, ObjectList, PackedOid, PortOid, RawSaiObjectId, SaiError, SaiObjectType,
    SaiResult, VendorCache,
};

use super::store::LagStore;
use super::types::LagMemberField;
use crate::config::LagDbStrategy;

#[derive(Debug, Clone, Default)]
struct DynamicLagEntry {
    members: Vec<PackedOid>,
}

#[derive(Debug, Clone, Default)]
struct LagSlot {
    generation: u16,
    retired: bool,
    entry: Option<DynamicLagEntry>,
}

/// Growable, generation-tagged LAG table.
impl LagSlot {
    fn is_vacant(&self) -> bool {
        self.entry.is_none() && !self.retired
    }
}

#[derive(Debug, Clone, Default)]
pub struct DynamicLagTable {
    slots: Vec<LagSlot>,
}

impl DynamicLagTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots currently backed by storage, live or vacant.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Occupies the lowest vacant slot, growing the table if none is vacant.
    pub fn allocate(&mut self) -> SaiResult<u32> {
        if let Some(index) = self.slots.iter().position(LagSlot::is_vacant) {
            self.slots[index].entry = Some(DynamicLagEntry::default());
            return slot_index(index);
        }

        let index = u32::try_from(self.slots.len()).map_err(|_| SaiError::table_full("LAG"))?;
        self.slots
            .try_reserve(1)
            .map_err(|e| SaiError::no_memory(format!("LAG table: {}", e)))?;
        self.slots.push(LagSlot {
            generation: 0,
            retired: false,
            entry: Some(DynamicLagEntry::default()),
        });
        Ok(index)
    }

    /// Vacates a slot in place.
    pub fn free(&mut self, index: u32) -> SaiResult<()> {
        let slot = self
            .slots
            .get_mut(index as usize)
            .filter(|slot| slot.entry.is_some())
            .ok_or_else(|| SaiError::not_found(format!("LAG slot {}", index)))?;
        slot.entry = None;
        match slot.generation.checked_add(1) {
            Some(generation) => slot.generation = generation,
            None => {
                debug!("LAG slot {} retired", index);
                slot.retired = true;
            }
        }
        Ok(())
    }

    pub fn lookup(&self, lag: LagOid) -> SaiResult<u32> {
        self.entry(lag).map(|(index, _)| index)
    }

    fn entry(&self, lag: LagOid) -> SaiResult<(u32, &DynamicLagEntry)> {
        let decoded = lag.index()?;
        self.slots
            .get(decoded.index as usize)
            .filter(|slot| slot.generation == decoded.ext)
            .and_then(|slot| slot.entry.as_ref())
            .map(|entry| (decoded.index, entry))
            .ok_or_else(|| SaiError::invalid_object_id(lag.as_raw(), SaiObjectType::Lag))
    }

    fn entry_mut(&mut self, lag: LagOid) -> SaiResult<&mut DynamicLagEntry> {
        let decoded = lag.index()?;
        self.slots
            .get_mut(decoded.index as usize)
            .filter(|slot| slot.generation == decoded.ext)
            .and_then(|slot| slot.entry.as_mut())
            .ok_or_else(|| SaiError::invalid_object_id(lag.as_raw(), SaiObjectType::Lag))
    }

    pub fn oid(&self, index: u32) -> LagOid {
        let generation = self.slots.get(index as usize).map_or(0, |s| s.generation);
        LagOid::encode(index, generation)
    }

    /// Finds the LAG slot and position holding `member`.
    fn find_member(&self, member: &PackedOid) -> Option<(u32, usize)> {
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            let entry = slot.entry.as_ref()?;
            let position = entry.members.iter().position(|m| m == member)?;
            Some((u32::try_from(index).ok()?, position))
        })
    }

    pub fn used_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.entry.is_some())
            .count()
    }

    fn member_count(&self) -> usize {
        self.slots
            .iter()
            .filter_map(|slot| slot.entry.as_ref())
            .map(|entry| entry.members.len())
            .sum()
    }
}

fn slot_index(index: usize) -> SaiResult<u32> {
    u32::try_from(index).map_err(|_| SaiError::internal(format!("slot {} exceeds u32", index)))
}

/// Port index of `port` if it fits the 16-bit packed field.
fn packed_port(port: PortOid) -> Option<u16> {
    let decoded = port.index().ok()?;
    if decoded.ext != 0 {
        return None;
    }
    u16::try_from(decoded.index).ok()
}

/// LAG database backed by growable storage.
#[derive(Debug, Clone)]
pub struct DynamicLagStore {
    lags: DynamicLagTable,
    next_serial: u32,
}

impl Default for DynamicLagStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicLagStore {
    pub fn new() -> Self {
        debug!("Dynamic LAG DB: growable storage");
        Self {
            lags: DynamicLagTable::new(),
            next_serial: 1,
        }
    }

    pub fn lag_table(&self) -> &DynamicLagTable {
        &self.lags
    }

    /// Mints a member identifier no live member uses.
    fn mint_member(&mut self, port: u16) -> PackedOid {
        loop {
            let serial = self.next_serial;
            self.next_serial = self.next_serial.wrapping_add(1);
            let candidate = PackedOid::new(SaiObjectType::LagMember, serial, port);
            if self.lags.find_member(&candidate).is_none() {
                return candidate;
            }
        }
    }

    fn resolve_member(&self, member: LagMemberOid) -> SaiResult<(PackedOid, u32, usize)> {
        let packed = PackedOid::decode(member.as_raw(), SaiObjectType::LagMember)?;
        let raw = member.as_raw();
        let (lag_index, position) = self
            .lags
            .find_member(&packed)
            .ok_or_else(|| SaiError::invalid_object_id(raw, SaiObjectType::LagMember))?;
        Ok((packed, lag_index, position))
    }
}

fn member_oid(packed: &PackedOid) -> LagMemberOid {
    LagMemberOid::from_raw_unchecked(packed.encode())
}

fn port_oid(packed: &PackedOid) -> PortOid {
    PortOid::encode(u32::from(packed.port), 0)
}

impl LagStore for DynamicLagStore {
    fn strategy(&self) -> LagDbStrategy {
        LagDbStrategy::Dynamic
    }

    fn create_lag(&mut self) -> SaiResult<LagOid> {
        let index = self.lags.allocate()?;
        debug!("Created on index {}", index);
        Ok(self.lags.oid(index))
    }

    fn remove_lag(&mut self, lag: LagOid) -> SaiResult<()> {
        let (index, entry) = self.lags.entry(lag)?;
        if !entry.members.is_empty() {
            return Err(SaiError::object_in_use(format!(
                "LAG {} has {} members",
                lag,
                entry.members.len()
            )));
        }
        self.lags.free(index)
    }

    fn check_lag(&self, lag: LagOid) -> SaiResult<()> {
        self.lags.lookup(lag).map(|_| ())
    }

    fn lag_ports(&self, lag: LagOid, ports: &mut ObjectList) -> SaiResult<usize> {
        let (_, entry) = self.lags.entry(lag)?;
        ports.fill(entry.members.iter().map(|m| port_oid(m).as_raw()))
    }

    fn lag_members(&self, lag: LagOid) -> SaiResult<Vec<LagMemberOid>> {
        let (_, entry) = self.lags.entry(lag)?;
        Ok(entry.members.iter().map(member_oid).collect())
    }

    fn port_supported(&self, port: PortOid) -> bool {
        packed_port(port).is_some()
    }

    fn create_lag_member(&mut self, lag: LagOid, port: PortOid) -> SaiResult<LagMemberOid> {
        self.lags.lookup(lag)?;
        let port = packed_port(port).ok_or_else(|| {
            SaiError::invalid_parameter(format!("port {} cannot be packed into 16 bits", port))
        })?;

        let packed = self.mint_member(port);
        let entry = self.lags.entry_mut(lag)?;
        entry
            .members
            .try_reserve(1)
            .map_err(|e| SaiError::no_memory(format!("LAG member list: {}", e)))?;
        entry.members.push(packed);
        Ok(member_oid(&packed))
    }

    fn remove_lag_member(&mut self, member: LagMemberOid) -> SaiResult<()> {
        let (_, lag_index, position) = self.resolve_member(member)?;
        if let Some(entry) = self
            .lags
            .slots
            .get_mut(lag_index as usize)
            .and_then(|slot| slot.entry.as_mut())
        {
            entry.members.remove(position);
        }
        Ok(())
    }

    fn check_lag_member(&self, member: LagMemberOid) -> SaiResult<()> {
        self.resolve_member(member).map(|_| ())
    }

    fn lag_member_field(
        &self,
        member: LagMemberOid,
        field: LagMemberField,
        cache: &mut VendorCache,
    ) -> SaiResult<RawSaiObjectId> {
        let packed = PackedOid::decode(member.as_raw(), SaiObjectType::LagMember)?;
        match field {
            // The port is in the identifier itself.
            LagMemberField::PortId => {
                self.check_lag_member(member)?;
                Ok(port_oid(&packed).as_raw())
            }
            LagMemberField::LagId => {
                let lag_index = match cache.object_index {
                    Some(index) => index,
                    None => {
                        let (_, index, _) = self.resolve_member(member)?;
                        cache.object_index = Some(index);
                        index
                    }
                };
                Ok(self.lags.oid(lag_index).as_raw())
            }
        }
    }

    fn lag_count(&self) -> usize {
        self.lags.used_count()
    }

    fn lag_member_count(&self) -> usize {
        self.lags.member_count()
    }
}
