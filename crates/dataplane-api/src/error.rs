//! Device status codes and error handling.
//!
//! The dataplane answers every request with a signed return value. Driver
//! implementations map the values they receive onto [`DeviceStatus`] and
//! report failures to orchestrators as [`DeviceError`].

use std::fmt;
use thiserror::Error;

/// Return values reported by the dataplane.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceStatus {
    Success = 0,
    Unspecified = -1,
    Unimplemented = -2,
    InvalidSwIfIndex = -3,
    NoSuchEntry = -7,
    InvalidValue = -8,
    EntryAlreadyExists = -10,
    InvalidInterface = -11,
    SysCallError = -12,
    NoMemory = -13,
    Timeout = -14,
    Uninitialized = -15,
}

impl DeviceStatus {
    /// Returns the raw return value.
    pub fn as_raw(&self) -> i32 {
        *self as i32
    }

    /// Returns true if the status indicates success.
    pub fn is_success(&self) -> bool {
        *self == DeviceStatus::Success
    }

    /// Converts to a Result, returning Ok(()) for success.
    pub fn into_result(self) -> DeviceResult<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(DeviceError::from_status(self))
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceStatus::Success => "success",
            DeviceStatus::Unspecified => "unspecified error",
            DeviceStatus::Unimplemented => "unimplemented",
            DeviceStatus::InvalidSwIfIndex => "invalid sw_if_index",
            DeviceStatus::NoSuchEntry => "no such entry",
            DeviceStatus::InvalidValue => "invalid value",
            DeviceStatus::EntryAlreadyExists => "entry already exists",
            DeviceStatus::InvalidInterface => "invalid interface",
            DeviceStatus::SysCallError => "system call error",
            DeviceStatus::NoMemory => "out of memory",
            DeviceStatus::Timeout => "request timed out",
            DeviceStatus::Uninitialized => "not initialized",
        };
        write!(f, "{} ({})", s, self.as_raw())
    }
}

/// Error type for dataplane requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// The dataplane returned a non-success status.
    #[error("device request failed: {status}")]
    Status { status: DeviceStatus },

    /// The dataplane does not implement the request.
    #[error("not supported by device: {feature}")]
    NotSupported { feature: String },

    /// The request was rejected before or by the device as malformed.
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// The referenced object does not exist in the device.
    #[error("not found in device: {item}")]
    NotFound { item: String },

    /// The object already exists in the device.
    #[error("already exists in device: {item}")]
    AlreadyExists { item: String },

    /// The channel gave up waiting for a reply.
    #[error("device request timed out: {operation}")]
    Timeout { operation: String },

    /// The channel to the device is not connected yet.
    #[error("device channel not initialized")]
    Uninitialized,

    /// Internal error.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl DeviceError {
    /// Creates an error from a device status.
    pub fn from_status(status: DeviceStatus) -> Self {
        match status {
            DeviceStatus::Success => DeviceError::Internal {
                message: "from_status called with success status".to_string(),
            },
            DeviceStatus::Unimplemented => DeviceError::NotSupported {
                feature: "unknown".to_string(),
            },
            DeviceStatus::InvalidValue
            | DeviceStatus::InvalidSwIfIndex
            | DeviceStatus::InvalidInterface => DeviceError::InvalidParameter {
                message: format!("device returned {}", status),
            },
            DeviceStatus::NoSuchEntry => DeviceError::NotFound {
                item: "unknown".to_string(),
            },
            DeviceStatus::EntryAlreadyExists => DeviceError::AlreadyExists {
                item: "unknown".to_string(),
            },
            DeviceStatus::Timeout => DeviceError::Timeout {
                operation: "unknown".to_string(),
            },
            DeviceStatus::Uninitialized => DeviceError::Uninitialized,
            _ => DeviceError::Status { status },
        }
    }

    /// Creates a not supported error.
    pub fn not_supported(feature: impl Into<String>) -> Self {
        DeviceError::NotSupported {
            feature: feature.into(),
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        DeviceError::InvalidParameter {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(item: impl Into<String>) -> Self {
        DeviceError::NotFound { item: item.into() }
    }

    /// Creates an already exists error.
    pub fn already_exists(item: impl Into<String>) -> Self {
        DeviceError::AlreadyExists { item: item.into() }
    }

    /// Creates a timeout error.
    pub fn timeout(operation: impl Into<String>) -> Self {
        DeviceError::Timeout {
            operation: operation.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        DeviceError::Internal {
            message: message.into(),
        }
    }

    /// Returns the underlying status if this is a Status error.
    pub fn status(&self) -> Option<DeviceStatus> {
        match self {
            DeviceError::Status { status } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for dataplane requests.
pub type DeviceResult<T> = Result<T, DeviceError>;
