//! Storage seam between the LAG service and the LAG/member tables.

use sonic_sai::{LagMemberOid, LagOid, ObjectList, PortOid, RawSaiObjectId, SaiResult, VendorCache};

use super::types::LagMemberField;
use crate::config::LagDbStrategy;

/// A LAG table paired with its LAG member table.
///
/// Implementations own all record storage. Every method re-validates the
/// identifiers it is given; nothing is cached across calls.
pub trait LagStore {
    /// Storage strategy implemented by this store.
    fn strategy(&self) -> LagDbStrategy;

    /// Allocates a LAG record and returns its identifier.
    ///
    /// # Errors
    ///
    /// `TableFull` when no slot is free and the table cannot grow,
    /// `NoMemory` when growing the backing storage fails.
    fn create_lag(&mut self) -> SaiResult<LagOid>;

    /// Frees a LAG record.
    ///
    /// # Errors
    ///
    /// `InvalidObjectId` for stale or foreign identifiers, `ObjectInUse`
    /// while the LAG still has members.
    fn remove_lag(&mut self, lag: LagOid) -> SaiResult<()>;

    /// Succeeds if `lag` names a live LAG.
    fn check_lag(&self, lag: LagOid) -> SaiResult<()>;

    /// Writes the member ports of `lag` into the caller's buffer.
    ///
    /// # Errors
    ///
    /// `BufferOverflow` if the LAG has more members than `ports` can hold;
    /// the buffer then holds the first `capacity` ports.
    fn lag_ports(&self, lag: LagOid, ports: &mut ObjectList) -> SaiResult<usize>;

    /// Returns the member identifiers the LAG record lists.
    fn lag_members(&self, lag: LagOid) -> SaiResult<Vec<LagMemberOid>>;

    /// Returns true if `port` can be attached by this store.
    ///
    /// Any non-null identifier is accepted unless the store has to encode the
    /// port itself.
    fn port_supported(&self, port: PortOid) -> bool {
        port.is_valid()
    }

    /// Attaches `port` to `lag`.
    fn create_lag_member(&mut self, lag: LagOid, port: PortOid) -> SaiResult<LagMemberOid>;

    /// Detaches a member and clears its record.
    fn remove_lag_member(&mut self, member: LagMemberOid) -> SaiResult<()>;

    /// Succeeds if `member` names a live LAG member.
    fn check_lag_member(&self, member: LagMemberOid) -> SaiResult<()>;

    /// Reads one field of a member record.
    ///
    /// `cache` is scoped to one attribute request and lets later fields skip
    /// re-resolving the member.
    fn lag_member_field(
        &self,
        member: LagMemberOid,
        field: LagMemberField,
        cache: &mut VendorCache,
    ) -> SaiResult<RawSaiObjectId>;

    /// Number of live LAGs.
    fn lag_count(&self) -> usize;

    /// Number of live LAG members.
    fn lag_member_count(&self) -> usize;
}
