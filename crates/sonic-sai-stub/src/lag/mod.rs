//! LAG and LAG member database for the SAI stub.
//!
//! # Architecture
//!
//! ```text
//! caller ──> LagApi (LagService)
//!               │
//!               ├──> metadata check (LAG_ATTRIBS / LAG_MEMBER_ATTRIBS)
//!               ├──> vendor getters (port list, member fields)
//!               ↓
//!           dyn LagStore
//!               ├──> FixedLagStore    preallocated LAG + member tables
//!               └──> DynamicLagStore  growable LAG table, packed member IDs
//! ```
//!
//! # Identifiers
//!
//! LAG IDs are index-encoded with the slot generation in the extension
//! field, for both strategies. Fixed-strategy member IDs are encoded the same
//! way. Dynamic-strategy member IDs are packed: a serial plus the member
//! port's 16-bit index.
//!
//! # Removal policy
//!
//! Removing a LAG that still has members fails with `ObjectInUse`. Members
//! must be removed first, so no member ever points at a freed LAG.

mod attribs;
mod dynamic;
mod fixed;
mod service;
mod store;
mod types;

pub use attribs::{
    LAG_ATTRIBS, LAG_MEMBER_ATTRIBS, SAI_LAG_ATTR_PORT_LIST, SAI_LAG_MEMBER_ATTR_LAG_ID,
    SAI_LAG_MEMBER_ATTR_PORT_ID,
};
pub use dynamic::{DynamicLagStore, DynamicLagTable};
pub use fixed::{FixedLagMemberTable, FixedLagStore, FixedLagTable};
pub use service::{LagApi, LagService};
pub use store::LagStore;
pub use types::LagMemberField;
