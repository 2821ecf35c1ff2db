//! API bootstrap: initialization, LAG API access and teardown.
//!
//! `SaiStub` owns the LAG database. There is no process-wide state; a host
//! that shares the stub between threads wraps it in its own lock.

use std::collections::HashMap;

use log::{debug, info, warn};
use sonic_sai::{SaiError, SaiResult};

use crate::config::{
    StubConfig, PROFILE_KEY_DB_STRATEGY, PROFILE_KEY_MAX_LAGS, PROFILE_KEY_MAX_MEMBERS,
};
use crate::lag::{LagApi, LagService};

/// Switch-profile services handed to the stub at initialization
/// (sai_service_method_table_t).
pub trait ServiceMethodTable {
    /// Returns the profile value for `variable`, if set.
    fn profile_get_value(&self, profile_id: u32, variable: &str) -> Option<String>;
}

/// A flat key/value profile shared by every profile id.
impl ServiceMethodTable for HashMap<String, String> {
    fn profile_get_value(&self, _profile_id: u32, variable: &str) -> Option<String> {
        self.get(variable).cloned()
    }
}

/// An initialized stub.
pub struct SaiStub {
    config: StubConfig,
    lag: Option<LagService>,
}

impl SaiStub {
    /// Builds empty LAG tables.
    ///
    /// Profile keys override the matching fields of `config`.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when a profile value or the resulting configuration
    /// is invalid, `NoMemory` when the fixed tables cannot be allocated.
    pub fn initialize(
        profile_id: u32,
        services: &dyn ServiceMethodTable,
        mut config: StubConfig,
    ) -> SaiResult<Self> {
        for key in [
            PROFILE_KEY_DB_STRATEGY,
            PROFILE_KEY_MAX_LAGS,
            PROFILE_KEY_MAX_MEMBERS,
        ] {
            if let Some(value) = services.profile_get_value(profile_id, key) {
                debug!("Profile {}: {} = {}", profile_id, key, value);
                config
                    .lag
                    .set_from_profile(key, &value)
                    .map_err(|e| SaiError::invalid_parameter(e.to_string()))?;
            }
        }
        config
            .validate()
            .map_err(|e| SaiError::invalid_parameter(e.to_string()))?;

        let lag = LagService::new(&config.lag)?;
        info!(
            "Initialized LAG DB: strategy={}, max_lags={}, max_lag_members={}",
            config.lag.strategy, config.lag.max_lags, config.lag.max_lag_members
        );
        Ok(Self {
            config,
            lag: Some(lag),
        })
    }

    /// Returns the LAG API (sai_api_query for SAI_API_LAG).
    pub fn lag_api(&mut self) -> SaiResult<&mut dyn LagApi> {
        match self.lag.as_mut() {
            Some(lag) => Ok(lag as &mut dyn LagApi),
            None => Err(SaiError::Uninitialized),
        }
    }

    /// Read-only view of the LAG service, for inspection.
    pub fn lag_service(&self) -> SaiResult<&LagService> {
        self.lag.as_ref().ok_or(SaiError::Uninitialized)
    }

    /// Releases the LAG database. Later API queries fail with `Uninitialized`.
    pub fn uninitialize(&mut self) -> SaiResult<()> {
        match self.lag.take() {
            Some(lag) => {
                let store = lag.store();
                if store.lag_count() > 0 || store.lag_member_count() > 0 {
                    warn!(
                        "Releasing LAG DB with {} LAGs and {} members still allocated",
                        store.lag_count(),
                        store.lag_member_count()
                    );
                }
                info!("Released LAG DB");
                Ok(())
            }
            None => Err(SaiError::Uninitialized),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.lag.is_some()
    }

    pub fn config(&self) -> &StubConfig {
        &self.config
    }
}
