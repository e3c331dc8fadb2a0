// cl_itemtimers.rs -- active respawn timers for world items
//
// The host starts a timer when it sees a timed pickup taken (powerups,
// armor, dropped packs) and the registry keeps them in the order they were
// started. Handles stay valid across removals of other timers; a removed
// handle simply stops resolving.

use myqw_common::common::com_printf;
use myqw_common::q_shared::{ItemFlags, Vec3};

use crate::cl_entclass::cl_classify_entity;
use crate::client::{ClientState, QueryError};

/// Returned by location queries when no zone matches.
pub const UNKNOWN_LOCATION: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u32);

/// itemtimer_s
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemTimer {
    pub handle: TimerHandle,
    pub entnum: i32,
    pub start: f32,
    pub end: f32,
    pub duration: f32,
    pub radius: f32,
    pub origin: Vec3,
}

impl ItemTimer {
    /// Seconds left at `now`, never negative.
    pub fn remaining(&self, now: f32) -> f32 {
        (self.end - now).max(0.0)
    }
}

#[derive(Debug, Default)]
pub struct ItemTimerList {
    timers: Vec<ItemTimer>,
    next_handle: u32,
}

impl ItemTimerList {
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            next_handle: 1,
        }
    }

    /// Start a timer for `entnum`. An entity that already has a timer gets it
    /// restarted in place and keeps its handle.
    pub fn add(
        &mut self,
        entnum: i32,
        origin: Vec3,
        start: f32,
        duration: f32,
        radius: f32,
    ) -> TimerHandle {
        if let Some(t) = self.timers.iter_mut().find(|t| t.entnum == entnum) {
            t.start = start;
            t.duration = duration;
            t.end = start + duration;
            t.radius = radius;
            t.origin = origin;
            tracing::debug!(entnum, start, duration, "item timer restarted");
            return t.handle;
        }

        let handle = TimerHandle(self.next_handle.max(1));
        self.next_handle = handle.0.wrapping_add(1);
        self.timers.push(ItemTimer {
            handle,
            entnum,
            start,
            end: start + duration,
            duration,
            radius,
            origin,
        });
        tracing::debug!(entnum, start, duration, "item timer started");
        handle
    }

    pub fn get(&self, handle: TimerHandle) -> Option<&ItemTimer> {
        self.timers.iter().find(|t| t.handle == handle)
    }

    pub fn remove(&mut self, handle: TimerHandle) -> Option<ItemTimer> {
        let pos = self.timers.iter().position(|t| t.handle == handle)?;
        Some(self.timers.remove(pos))
    }

    /// Drop the timer of an entity that despawned.
    pub fn remove_entity(&mut self, entnum: i32) -> Option<ItemTimer> {
        let pos = self.timers.iter().position(|t| t.entnum == entnum)?;
        Some(self.timers.remove(pos))
    }

    /// Drop every timer whose end time has been reached. Returns how many went.
    pub fn expire(&mut self, now: f32) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| t.end > now);
        let expired = before - self.timers.len();
        if expired > 0 {
            tracing::debug!(expired, now, "item timers expired");
        }
        expired
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Active timers, oldest first. Restartable; never mutates.
    pub fn iter(&self) -> std::slice::Iter<'_, ItemTimer> {
        self.timers.iter()
    }

    pub fn first(&self) -> Option<&ItemTimer> {
        self.timers.first()
    }

    /// The timer after `handle` in list order.
    pub fn next(&self, handle: TimerHandle) -> Option<&ItemTimer> {
        let pos = self.timers.iter().position(|t| t.handle == handle)?;
        self.timers.get(pos + 1)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl<'a> IntoIterator for &'a ItemTimerList {
    type Item = &'a ItemTimer;
    type IntoIter = std::slice::Iter<'a, ItemTimer>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================
// Presentation queries
// ============================================================

/// Item bits of the entity the timer is for.
pub fn cl_itemtimer_type(cl: &ClientState, timer: &ItemTimer) -> Result<ItemFlags, QueryError> {
    Ok(cl_classify_entity(cl, timer.entnum)?.item)
}

/// Teamplay display name of the entity the timer is for.
pub fn cl_itemtimer_type_name(cl: &ClientState, timer: &ItemTimer) -> Result<String, QueryError> {
    let mapping = cl_classify_entity(cl, timer.entnum)?;
    mapping.display_name(&cl.cvars).map(str::to_string)
}

/// Zone name of the timer's origin, or UNKNOWN_LOCATION.
pub fn cl_itemtimer_location(cl: &ClientState, timer: &ItemTimer) -> String {
    cl.locations
        .find_nearest(timer.origin)
        .unwrap_or(UNKNOWN_LOCATION)
        .to_string()
}

// ============================================================
// Console Commands
// ============================================================

/// itemtimers - List active item timers
pub fn cmd_itemtimers(cl: &ClientState) {
    if cl.itemtimers.is_empty() {
        com_printf("No active item timers\n");
        return;
    }

    for timer in &cl.itemtimers {
        let name =
            cl_itemtimer_type_name(cl, timer).unwrap_or_else(|_| format!("#{}", timer.entnum));
        com_printf(&format!(
            "{:<8} {:>5.1}s  {}\n",
            name,
            timer.remaining(cl.time),
            cl_itemtimer_location(cl, timer)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cl_fragfile::FragFile;
    use crate::cl_loc::Location;
    use myqw_common::common::com_capture;
    use myqw_common::cvar::CvarContext;
    use myqw_common::q_shared::{EntityState, IT_ARMOR3, IT_QUAD};

    fn item_state(modelindex: i32, skinnum: i32) -> EntityState {
        EntityState {
            modelindex,
            skinnum,
            ..EntityState::default()
        }
    }

    fn client_with_items() -> ClientState {
        let mut cl = ClientState::new(&FragFile::default_qw());
        cl.set_model_name(2, "progs/quaddama.mdl");
        cl.set_model_name(3, "progs/armor.mdl");
        cl.set_model_name(4, "progs/player.mdl");
        cl.set_baseline(40, item_state(2, 0));
        cl.set_baseline(41, item_state(3, 2));
        cl.set_baseline(42, item_state(4, 0));
        cl.locations.locations.push(Location {
            origin: [0.0, 0.0, 0.0],
            name: "quad low".to_string(),
        });
        cl.locations.locations.push(Location {
            origin: [1000.0, 0.0, 0.0],
            name: "ra tunnel".to_string(),
        });
        cl
    }

    #[test]
    fn test_insertion_order() {
        let mut list = ItemTimerList::new();
        list.add(5, [0.0; 3], 0.0, 30.0, 32.0);
        list.add(3, [0.0; 3], 1.0, 30.0, 32.0);
        list.add(9, [0.0; 3], 2.0, 30.0, 32.0);
        let order: Vec<i32> = list.iter().map(|t| t.entnum).collect();
        assert_eq!(order, vec![5, 3, 9]);
    }

    #[test]
    fn test_repeated_reads_identical() {
        let mut list = ItemTimerList::new();
        list.add(1, [1.0, 2.0, 3.0], 0.0, 30.0, 32.0);
        list.add(2, [4.0, 5.0, 6.0], 0.5, 60.0, 32.0);
        let a: Vec<ItemTimer> = list.iter().copied().collect();
        let b: Vec<ItemTimer> = list.iter().copied().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_readd_restarts_in_place() {
        let mut list = ItemTimerList::new();
        let h1 = list.add(1, [0.0; 3], 0.0, 30.0, 32.0);
        list.add(2, [0.0; 3], 0.0, 30.0, 32.0);
        let h1b = list.add(1, [0.0; 3], 10.0, 30.0, 32.0);
        assert_eq!(h1, h1b);
        assert_eq!(list.len(), 2);
        let t = list.get(h1).unwrap();
        assert_eq!(t.start, 10.0);
        assert_eq!(t.end, 40.0);
        assert_eq!(list.first().unwrap().entnum, 1);
    }

    #[test]
    fn test_handles_survive_removal() {
        let mut list = ItemTimerList::new();
        let a = list.add(1, [0.0; 3], 0.0, 30.0, 32.0);
        let b = list.add(2, [0.0; 3], 0.0, 30.0, 32.0);
        let c = list.add(3, [0.0; 3], 0.0, 30.0, 32.0);

        assert_eq!(list.remove(b).unwrap().entnum, 2);
        assert!(list.get(b).is_none());
        assert!(list.remove(b).is_none());
        assert_eq!(list.get(c).unwrap().entnum, 3);
        assert_eq!(list.next(a).unwrap().handle, c);
        assert!(list.next(c).is_none());

        // a fresh timer never reuses a removed handle
        let d = list.add(2, [0.0; 3], 0.0, 30.0, 32.0);
        assert_ne!(d, b);
    }

    #[test]
    fn test_expire_and_despawn() {
        let mut list = ItemTimerList::new();
        list.add(1, [0.0; 3], 0.0, 30.0, 32.0);
        list.add(2, [0.0; 3], 0.0, 60.0, 32.0);
        list.add(3, [0.0; 3], 0.0, 120.0, 32.0);

        assert_eq!(list.expire(29.9), 0);
        assert_eq!(list.expire(30.0), 1);
        assert_eq!(list.remove_entity(3).unwrap().entnum, 3);
        assert!(list.remove_entity(3).is_none());
        let left: Vec<i32> = list.iter().map(|t| t.entnum).collect();
        assert_eq!(left, vec![2]);
    }

    #[test]
    fn test_remaining() {
        let mut list = ItemTimerList::new();
        let h = list.add(1, [0.0; 3], 10.0, 30.0, 32.0);
        let t = list.get(h).unwrap();
        assert_eq!(t.remaining(20.0), 20.0);
        assert_eq!(t.remaining(50.0), 0.0);
    }

    #[test]
    fn test_type_and_name() {
        let mut cl = client_with_items();
        let quad = cl.itemtimers.add(40, [10.0, 0.0, 0.0], 0.0, 60.0, 32.0);
        let ra = cl.itemtimers.add(41, [990.0, 0.0, 0.0], 0.0, 20.0, 32.0);
        let quad = *cl.itemtimers.get(quad).unwrap();
        let ra = *cl.itemtimers.get(ra).unwrap();

        assert_eq!(cl_itemtimer_type(&cl, &quad), Ok(IT_QUAD));
        assert_eq!(cl_itemtimer_type(&cl, &ra), Ok(IT_ARMOR3));
        assert_eq!(cl_itemtimer_type_name(&cl, &quad).unwrap(), "quad");
        assert_eq!(cl_itemtimer_type_name(&cl, &ra).unwrap(), "ra");
        assert_eq!(cl_itemtimer_location(&cl, &quad), "quad low");
        assert_eq!(cl_itemtimer_location(&cl, &ra), "ra tunnel");
    }

    #[test]
    fn test_type_name_failures() {
        let mut cl = client_with_items();
        let h = cl.itemtimers.add(42, [0.0; 3], 0.0, 30.0, 32.0);
        let missing = cl.itemtimers.add(999, [0.0; 3], 0.0, 30.0, 32.0);
        let player = *cl.itemtimers.get(h).unwrap();
        let missing = *cl.itemtimers.get(missing).unwrap();

        assert!(matches!(
            cl_itemtimer_type_name(&cl, &player),
            Err(QueryError::Unrecognized { .. })
        ));
        assert_eq!(cl_itemtimer_type(&cl, &missing), Err(QueryError::NotFound(999)));
    }

    #[test]
    fn test_type_name_without_teamplay_cvar() {
        let mut cl = client_with_items();
        cl.cvars = CvarContext::new();
        let h = cl.itemtimers.add(40, [0.0; 3], 0.0, 30.0, 32.0);
        let quad = *cl.itemtimers.get(h).unwrap();

        // still classifies, but has no name to show
        assert_eq!(cl_itemtimer_type(&cl, &quad), Ok(IT_QUAD));
        assert_eq!(
            cl_itemtimer_type_name(&cl, &quad),
            Err(QueryError::Unsupported("tp_name_quad"))
        );
    }

    #[test]
    fn test_location_unknown_without_locs() {
        let mut cl = client_with_items();
        cl.locations.clear();
        let h = cl.itemtimers.add(40, [0.0; 3], 0.0, 30.0, 32.0);
        let t = *cl.itemtimers.get(h).unwrap();
        assert_eq!(cl_itemtimer_location(&cl, &t), UNKNOWN_LOCATION);
    }

    #[test]
    fn test_cmd_itemtimers() {
        let mut cl = client_with_items();
        let out = com_capture(|| cmd_itemtimers(&cl));
        assert_eq!(out, "No active item timers\n");

        cl.time = 10.0;
        cl.itemtimers.add(40, [0.0; 3], 0.0, 30.0, 32.0);
        cl.itemtimers.add(42, [1000.0, 0.0, 0.0], 0.0, 30.0, 32.0);
        let out = com_capture(|| cmd_itemtimers(&cl));
        assert!(out.contains("quad"));
        assert!(out.contains("20.0s"));
        assert!(out.contains("quad low"));
        assert!(out.contains("#42"));
        assert!(out.contains("ra tunnel"));
    }
}
