//! Yard topology: the shared switch registry and the route lookup table.
//!
//! Built once before dispatch starts and read-only afterwards, so it can be
//! shared across worker threads behind an `Arc` without further locking.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use yard_core::{SwitchId, TrackId};
use yard_switch::SwitchLock;

use crate::error::format_cycle;
use crate::{Route, TopologyError, TopologyResult};

// ── Topology ──────────────────────────────────────────────────────────────────

/// Every switch in the yard (one `SwitchLock` per distinct id) and every
/// route, keyed by `(inbound, outbound)`.
///
/// Do not construct directly; use [`TopologyBuilder`].
#[derive(Debug)]
pub struct Topology {
    switches: BTreeMap<SwitchId, Arc<SwitchLock>>,
    routes:   HashMap<(TrackId, TrackId), Arc<Route>>,
}

impl Topology {
    /// A yard with no switches and no routes.  Every train resolves to
    /// "no route".
    pub fn empty() -> Self {
        Self { switches: BTreeMap::new(), routes: HashMap::new() }
    }

    /// The route from `inbound` to `outbound`, or `None` if the yard has no
    /// such path.
    pub fn resolve_route(&self, inbound: TrackId, outbound: TrackId) -> Option<Arc<Route>> {
        self.routes.get(&(inbound, outbound)).cloned()
    }

    pub fn switch(&self, id: SwitchId) -> Option<&Arc<SwitchLock>> {
        self.switches.get(&id)
    }

    /// All switches in ascending id order.
    pub fn switches(&self) -> impl Iterator<Item = &Arc<SwitchLock>> + '_ {
        self.switches.values()
    }

    pub fn routes(&self) -> impl Iterator<Item = &Arc<Route>> + '_ {
        self.routes.values()
    }

    pub fn switch_count(&self) -> usize {
        self.switches.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Ids of switches that are currently held by some train.
    pub fn held_switches(&self) -> Vec<SwitchId> {
        self.switches
            .values()
            .filter(|s| s.is_held())
            .map(|s| s.id())
            .collect()
    }
}

// ── TopologyBuilder ───────────────────────────────────────────────────────────

/// Collect route definitions, then validate and freeze them with
/// [`build`](Self::build).
///
/// # Example
///
/// ```
/// use yard_core::{SwitchId, TrackId};
/// use yard_topology::TopologyBuilder;
///
/// let mut b = TopologyBuilder::new();
/// b.add_route(TrackId(1), &[SwitchId(101), SwitchId(102), SwitchId(103)], TrackId(9));
/// b.add_route(TrackId(2), &[SwitchId(104), SwitchId(102), SwitchId(105)], TrackId(9));
/// let yard = b.build().unwrap();
/// assert_eq!(yard.route_count(), 2);
/// assert_eq!(yard.switch_count(), 5); // 102 is shared
/// ```
#[derive(Default)]
pub struct TopologyBuilder {
    raw:           Vec<RawRoute>,
    permit_cycles: bool,
}

struct RawRoute {
    inbound:  TrackId,
    switches: Vec<SwitchId>,
    outbound: TrackId,
}

#[derive(Copy, Clone)]
enum Mark {
    Visiting,
    Done,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(routes: usize) -> Self {
        Self { raw: Vec::with_capacity(routes), permit_cycles: false }
    }

    /// Add a route.  `switches` is the acquisition order.
    pub fn add_route(&mut self, inbound: TrackId, switches: &[SwitchId], outbound: TrackId) {
        self.raw.push(RawRoute { inbound, switches: switches.to_vec(), outbound });
    }

    /// Accept yards whose routes lock switches in conflicting orders.
    ///
    /// Such a yard can form a circular wait; per-switch timeouts still break
    /// it eventually, but trains burn attempts doing so.  When permitted, the
    /// conflict is logged as a warning instead of failing `build`.
    pub fn permit_ordering_cycles(&mut self, permit: bool) -> &mut Self {
        self.permit_cycles = permit;
        self
    }

    pub fn route_count(&self) -> usize {
        self.raw.len()
    }

    /// Validate all routes and produce a [`Topology`].
    ///
    /// Fails on the first empty route, repeated switch within a route,
    /// duplicate `(inbound, outbound)` pair, or (unless permitted) an
    /// acquisition-order cycle.
    pub fn build(self) -> TopologyResult<Topology> {
        let mut seen: BTreeSet<(TrackId, TrackId)> = BTreeSet::new();
        for r in &self.raw {
            if r.switches.is_empty() {
                return Err(TopologyError::EmptyRoute { inbound: r.inbound, outbound: r.outbound });
            }
            let mut within: BTreeSet<SwitchId> = BTreeSet::new();
            for &switch in &r.switches {
                if !within.insert(switch) {
                    return Err(TopologyError::RepeatedSwitch {
                        inbound: r.inbound,
                        outbound: r.outbound,
                        switch,
                    });
                }
            }
            if !seen.insert((r.inbound, r.outbound)) {
                return Err(TopologyError::DuplicateRoute { inbound: r.inbound, outbound: r.outbound });
            }
        }

        if let Some(cycle) = find_ordering_cycle(&self.raw) {
            if !self.permit_cycles {
                return Err(TopologyError::OrderingCycle(cycle));
            }
            log::warn!(
                "routes lock switches in conflicting order ({}); trains may contend until timeout",
                format_cycle(&cycle)
            );
        }

        // ── Share one SwitchLock per distinct id ──────────────────────────
        let mut switches: BTreeMap<SwitchId, Arc<SwitchLock>> = BTreeMap::new();
        let mut routes = HashMap::with_capacity(self.raw.len());
        for r in self.raw {
            let locks: Vec<Arc<SwitchLock>> = r
                .switches
                .iter()
                .map(|&id| Arc::clone(switches.entry(id).or_insert_with(|| Arc::new(SwitchLock::new(id)))))
                .collect();
            routes.insert((r.inbound, r.outbound), Arc::new(Route::new(r.inbound, r.outbound, locks)));
        }

        log::debug!("topology built: {} switches, {} routes", switches.len(), routes.len());
        Ok(Topology { switches, routes })
    }
}

// ── Ordering check ────────────────────────────────────────────────────────────

/// Find a cycle in the "must be locked before" graph, whose edges are the
/// consecutive switch pairs of every route.  Returns the switches on the
/// cycle in order, or `None` if a single global order exists.
fn find_ordering_cycle(routes: &[RawRoute]) -> Option<Vec<SwitchId>> {
    let mut after: BTreeMap<SwitchId, BTreeSet<SwitchId>> = BTreeMap::new();
    for r in routes {
        for pair in r.switches.windows(2) {
            after.entry(pair[0]).or_default().insert(pair[1]);
            after.entry(pair[1]).or_default();
        }
    }

    let mut marks: BTreeMap<SwitchId, Mark> = BTreeMap::new();
    let mut path: Vec<SwitchId> = Vec::new();
    for &start in after.keys() {
        if marks.contains_key(&start) {
            continue;
        }
        if let Some(cycle) = visit(start, &after, &mut marks, &mut path) {
            return Some(cycle);
        }
    }
    None
}

fn visit(
    node:  SwitchId,
    after: &BTreeMap<SwitchId, BTreeSet<SwitchId>>,
    marks: &mut BTreeMap<SwitchId, Mark>,
    path:  &mut Vec<SwitchId>,
) -> Option<Vec<SwitchId>> {
    marks.insert(node, Mark::Visiting);
    path.push(node);

    if let Some(nexts) = after.get(&node) {
        for &next in nexts {
            match marks.get(&next) {
                Some(Mark::Visiting) => {
                    let from = path.iter().position(|&s| s == next)?;
                    return Some(path[from..].to_vec());
                }
                Some(Mark::Done) => {}
                None => {
                    if let Some(cycle) = visit(next, after, marks, path) {
                        return Some(cycle);
                    }
                }
            }
        }
    }

    path.pop();
    marks.insert(node, Mark::Done);
    None
}
