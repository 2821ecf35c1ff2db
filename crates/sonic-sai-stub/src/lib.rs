//! In-process SAI stub implementing the LAG API.
//!
//! The stub keeps LAGs and LAG members in memory and answers the eight LAG
//! API calls with the same status vocabulary a vendor SAI would use. Two
//! storage strategies are available, selected by configuration or by the
//! `SAI_LAG_DB_STRATEGY` profile key.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use sonic_sai::{PortOid, SaiAttribute};
//! use sonic_sai_stub::lag::{SAI_LAG_ATTR_PORT_LIST, SAI_LAG_MEMBER_ATTR_LAG_ID, SAI_LAG_MEMBER_ATTR_PORT_ID};
//! use sonic_sai_stub::{SaiStub, StubConfig};
//!
//! let profile: HashMap<String, String> = HashMap::new();
//! let mut stub = SaiStub::initialize(0, &profile, StubConfig::default()).unwrap();
//! let api = stub.lag_api().unwrap();
//!
//! let lag = api.create_lag(&[]).unwrap();
//! let port = PortOid::encode(11, 0);
//! api.create_lag_member(&[
//!     SaiAttribute::oid(SAI_LAG_MEMBER_ATTR_LAG_ID, lag.as_raw()),
//!     SaiAttribute::oid(SAI_LAG_MEMBER_ATTR_PORT_ID, port.as_raw()),
//! ])
//! .unwrap();
//!
//! let mut attrs = [SaiAttribute::obj_list(SAI_LAG_ATTR_PORT_LIST, 4)];
//! api.get_lag_attribute(lag, &mut attrs).unwrap();
//! assert_eq!(attrs[0].value.as_obj_list().unwrap().as_slice(), &[port.as_raw()]);
//! ```

pub mod api;
pub mod config;
pub mod lag;

pub use api::{SaiStub, ServiceMethodTable};
pub use config::{ConfigError, LagDbConfig, LagDbStrategy, StubConfig};
pub use lag::{LagApi, LagService, LagStore};
