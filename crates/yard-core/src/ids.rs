//! Strongly typed, zero-cost identifier wrappers.
//!
//! Yard input files use plain integers for switches, tracks and trains.
//! Wrapping each in its own type keeps a track number from ever being
//! passed where a switch id is expected.  All IDs are `Copy + Ord + Hash` so
//! they can be used as map keys and sorted collection elements without
//! ceremony.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub $inner);

        impl $name {
            /// The raw integer as it appears in yard and fleet files.
            #[inline(always)]
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(n: $inner) -> $name {
                $name(n)
            }
        }
    };
}

typed_id! {
    /// Identity of a physical switch.  The same id in several yard records
    /// always refers to the same `SwitchLock`.
    pub struct SwitchId(u32);
}

typed_id! {
    /// An inbound or outbound track number.
    pub struct TrackId(u32);
}

typed_id! {
    /// Unique train number from the fleet schedule.  Also identifies the
    /// owner of a held switch.
    pub struct TrainNumber(u32);
}
