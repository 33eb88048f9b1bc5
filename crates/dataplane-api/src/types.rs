//! Device object handles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a software interface object inside the dataplane.
///
/// The device hands these out on creation. Index 0 is a real interface in
/// most dataplanes (the local loopback), so validity is tracked against
/// [`SwIfIndex::INVALID`] rather than zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwIfIndex(u32);

impl SwIfIndex {
    /// Sentinel used by the device for "no interface".
    pub const INVALID: Self = SwIfIndex(u32::MAX);

    /// Wraps a raw index returned by the device.
    pub const fn from_raw(raw: u32) -> Self {
        SwIfIndex(raw)
    }

    /// Returns the raw index.
    pub const fn as_raw(&self) -> u32 {
        self.0
    }

    /// Returns true unless this is the [`SwIfIndex::INVALID`] sentinel.
    pub const fn is_valid(&self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for SwIfIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "SwIfIndex({})", self.0)
        } else {
            write!(f, "SwIfIndex(INVALID)")
        }
    }
}

impl fmt::Display for SwIfIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SwIfIndex> for u32 {
    fn from(idx: SwIfIndex) -> u32 {
        idx.0
    }
}
