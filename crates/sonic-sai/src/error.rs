//! SAI error types and status handling.
//!
//! This module provides safe error handling for SAI operations. Every
//! [`SaiError`] maps back to the raw SAI status code a C caller would see.

use std::fmt;
use thiserror::Error;

use crate::types::{RawSaiObjectId, SaiObjectType};

/// SAI status codes matching the SAI C API.
///
/// These values correspond to `sai_status_t` in the SAI header files.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaiStatus {
    Success = 0,
    Failure = -1,
    NotSupported = -2,
    NoMemory = -3,
    InsufficientResources = -4,
    InvalidParameter = -5,
    ItemAlreadyExists = -6,
    ItemNotFound = -7,
    BufferOverflow = -8,
    InvalidPortNumber = -9,
    InvalidPortMember = -10,
    InvalidVlanId = -11,
    Uninitialized = -12,
    TableFull = -13,
    MandatoryAttributeMissing = -14,
    NotImplemented = -15,
    AddrNotFound = -16,
    ObjectInUse = -17,
    InvalidObjectType = -18,
    InvalidObjectId = -19,
    InvalidNifId = -20,
    NifTableFull = -21,
    HwTableFull = -22,
    NotExecuted = -23,
    InvalidAttribute = -24,
}

impl SaiStatus {
    /// Returns the raw `sai_status_t` value.
    pub const fn as_raw(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for SaiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SaiStatus::Success => "SAI_STATUS_SUCCESS",
            SaiStatus::Failure => "SAI_STATUS_FAILURE",
            SaiStatus::NotSupported => "SAI_STATUS_NOT_SUPPORTED",
            SaiStatus::NoMemory => "SAI_STATUS_NO_MEMORY",
            SaiStatus::InsufficientResources => "SAI_STATUS_INSUFFICIENT_RESOURCES",
            SaiStatus::InvalidParameter => "SAI_STATUS_INVALID_PARAMETER",
            SaiStatus::ItemAlreadyExists => "SAI_STATUS_ITEM_ALREADY_EXISTS",
            SaiStatus::ItemNotFound => "SAI_STATUS_ITEM_NOT_FOUND",
            SaiStatus::BufferOverflow => "SAI_STATUS_BUFFER_OVERFLOW",
            SaiStatus::InvalidPortNumber => "SAI_STATUS_INVALID_PORT_NUMBER",
            SaiStatus::InvalidPortMember => "SAI_STATUS_INVALID_PORT_MEMBER",
            SaiStatus::InvalidVlanId => "SAI_STATUS_INVALID_VLAN_ID",
            SaiStatus::Uninitialized => "SAI_STATUS_UNINITIALIZED",
            SaiStatus::TableFull => "SAI_STATUS_TABLE_FULL",
            SaiStatus::MandatoryAttributeMissing => "SAI_STATUS_MANDATORY_ATTRIBUTE_MISSING",
            SaiStatus::NotImplemented => "SAI_STATUS_NOT_IMPLEMENTED",
            SaiStatus::AddrNotFound => "SAI_STATUS_ADDR_NOT_FOUND",
            SaiStatus::ObjectInUse => "SAI_STATUS_OBJECT_IN_USE",
            SaiStatus::InvalidObjectType => "SAI_STATUS_INVALID_OBJECT_TYPE",
            SaiStatus::InvalidObjectId => "SAI_STATUS_INVALID_OBJECT_ID",
            SaiStatus::InvalidNifId => "SAI_STATUS_INVALID_NIF_ID",
            SaiStatus::NifTableFull => "SAI_STATUS_NIF_TABLE_FULL",
            SaiStatus::HwTableFull => "SAI_STATUS_HW_TABLE_FULL",
            SaiStatus::NotExecuted => "SAI_STATUS_NOT_EXECUTED",
            SaiStatus::InvalidAttribute => "SAI_STATUS_INVALID_ATTRIBUTE",
        };
        write!(f, "{}", s)
    }
}

/// Error type for SAI operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaiError {
    /// The requested feature is not supported by the SAI implementation.
    #[error("Feature not supported: {feature}")]
    NotSupported { feature: String },

    /// Invalid parameter passed to SAI API.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// The identifier does not decode to a live object of the expected type.
    #[error("Invalid object id 0x{oid:016x} (expected {expected})")]
    InvalidObjectId {
        oid: RawSaiObjectId,
        expected: SaiObjectType,
    },

    /// An attribute in the list failed a metadata check.
    #[error("Invalid attribute #{index}: {message}")]
    InvalidAttribute { index: usize, message: String },

    /// A mandatory-on-create attribute was not supplied.
    #[error("Mandatory attribute missing: {name}")]
    MandatoryAttributeMissing { name: String },

    /// The attribute is known but the implementation does not provide it.
    #[error("Attribute not implemented: {name}")]
    AttributeNotImplemented { name: String },

    /// The caller's list buffer is too small for the full result.
    #[error("Buffer overflow: {required} entries required, capacity {capacity}")]
    BufferOverflow { required: usize, capacity: usize },

    /// Backing storage could not be grown.
    #[error("Out of memory: {what}")]
    NoMemory { what: String },

    /// The requested item was not found.
    #[error("Item not found: {item}")]
    NotFound { item: String },

    /// Table is full.
    #[error("Table full: {table}")]
    TableFull { table: String },

    /// Object is in use and cannot be removed.
    #[error("Object in use: {object}")]
    ObjectInUse { object: String },

    /// SAI API is not initialized.
    #[error("SAI not initialized")]
    Uninitialized,

    /// Internal error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SaiError {
    /// Creates a not supported error with a feature description.
    pub fn not_supported(feature: impl Into<String>) -> Self {
        SaiError::NotSupported {
            feature: feature.into(),
        }
    }

    /// Creates an invalid parameter error with a message.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        SaiError::InvalidParameter {
            message: message.into(),
        }
    }

    /// Creates an invalid object id error.
    pub fn invalid_object_id(oid: RawSaiObjectId, expected: SaiObjectType) -> Self {
        SaiError::InvalidObjectId { oid, expected }
    }

    /// Creates an invalid attribute error for the attribute at `index`.
    pub fn invalid_attribute(index: usize, message: impl Into<String>) -> Self {
        SaiError::InvalidAttribute {
            index,
            message: message.into(),
        }
    }

    /// Creates a not found error with an item description.
    pub fn not_found(item: impl Into<String>) -> Self {
        SaiError::NotFound { item: item.into() }
    }

    /// Creates a table full error.
    pub fn table_full(table: impl Into<String>) -> Self {
        SaiError::TableFull {
            table: table.into(),
        }
    }

    /// Creates an object in use error.
    pub fn object_in_use(object: impl Into<String>) -> Self {
        SaiError::ObjectInUse {
            object: object.into(),
        }
    }

    /// Creates an out of memory error.
    pub fn no_memory(what: impl Into<String>) -> Self {
        SaiError::NoMemory { what: what.into() }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        SaiError::Internal {
            message: message.into(),
        }
    }

    /// Returns the SAI status code reported to C-style callers.
    pub fn status(&self) -> SaiStatus {
        match self {
            SaiError::NotSupported { .. } => SaiStatus::NotSupported,
            SaiError::InvalidParameter { .. } => SaiStatus::InvalidParameter,
            SaiError::InvalidObjectId { .. } => SaiStatus::InvalidObjectId,
            SaiError::InvalidAttribute { .. } => SaiStatus::InvalidAttribute,
            SaiError::MandatoryAttributeMissing { .. } => SaiStatus::MandatoryAttributeMissing,
            SaiError::AttributeNotImplemented { .. } => SaiStatus::NotImplemented,
            SaiError::BufferOverflow { .. } => SaiStatus::BufferOverflow,
            SaiError::NoMemory { .. } => SaiStatus::NoMemory,
            SaiError::NotFound { .. } => SaiStatus::ItemNotFound,
            SaiError::TableFull { .. } => SaiStatus::TableFull,
            SaiError::ObjectInUse { .. } => SaiStatus::ObjectInUse,
            SaiError::Uninitialized => SaiStatus::Uninitialized,
            SaiError::Internal { .. } => SaiStatus::Failure,
        }
    }
}

/// Result type for SAI operations.
pub type SaiResult<T> = Result<T, SaiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_raw_values() {
        assert_eq!(SaiStatus::Success.as_raw(), 0);
        assert_eq!(SaiStatus::BufferOverflow.as_raw(), -8);
        assert_eq!(SaiStatus::InvalidObjectId.as_raw(), -19);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(
            SaiStatus::ObjectInUse.to_string(),
            "SAI_STATUS_OBJECT_IN_USE"
        );
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            SaiError::invalid_object_id(0x2, SaiObjectType::Lag).status(),
            SaiStatus::InvalidObjectId
        );
        assert_eq!(
            SaiError::BufferOverflow {
                required: 3,
                capacity: 2
            }
            .status(),
            SaiStatus::BufferOverflow
        );
        assert_eq!(SaiError::table_full("LAG").status(), SaiStatus::TableFull);
        assert_eq!(
            SaiError::object_in_use("LAG").status(),
            SaiStatus::ObjectInUse
        );
        assert_eq!(SaiError::internal("x").status(), SaiStatus::Failure);
    }

    #[test]
    fn test_invalid_object_id_message() {
        let err = SaiError::invalid_object_id(0x2_0000_0000_0001, SaiObjectType::Lag);
        assert_eq!(
            err.to_string(),
            "Invalid object id 0x0002000000000001 (expected SAI_OBJECT_TYPE_LAG)"
        );
    }
}
