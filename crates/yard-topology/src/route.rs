//! A route: the switches one train must hold to cross the yard.

use std::fmt;
use std::sync::Arc;

use yard_core::{SwitchId, TrackId};
use yard_switch::SwitchLock;

/// Ordered, immutable list of switches from `inbound` to `outbound`.
///
/// The order is the mandatory acquisition order: first to last when
/// locking, last to first when releasing.  Always non-empty once built by
/// [`TopologyBuilder`][crate::TopologyBuilder].
#[derive(Debug)]
pub struct Route {
    pub inbound:  TrackId,
    pub outbound: TrackId,
    switches:     Vec<Arc<SwitchLock>>,
}

impl Route {
    pub(crate) fn new(inbound: TrackId, outbound: TrackId, switches: Vec<Arc<SwitchLock>>) -> Self {
        Self { inbound, outbound, switches }
    }

    /// Switches in acquisition order.
    #[inline]
    pub fn switches(&self) -> &[Arc<SwitchLock>] {
        &self.switches
    }

    pub fn switch_ids(&self) -> impl Iterator<Item = SwitchId> + '_ {
        self.switches.iter().map(|s| s.id())
    }

    pub fn len(&self) -> usize {
        self.switches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} via [", self.inbound, self.outbound)?;
        for (i, id) in self.switch_ids().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}")?;
        }
        f.write_str("]")
    }
}
