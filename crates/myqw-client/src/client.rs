// client.rs -- primary header for client
//
// ClientState is the per-connection context: entity snapshot sources, the
// model precache, the scoreboard, player views, and the stat/timer components
// that the presentation layer polls between update ticks. Everything in it is
// owned by the update thread; references handed out borrow `&ClientState` and
// so cannot outlive the next mutation.
//
// There is no internal locking. A reader on another thread must arrange its
// own exclusion with the update tick.

use thiserror::Error;

use myqw_common::cvar::CvarContext;
use myqw_common::q_shared::{
    EntityState, Vec3, MAX_CLIENTS, MAX_EDICTS, MAX_PRECACHE_MODELS, MAX_SPLITS,
};

use crate::cl_entclass::register_teamplay_names;
use crate::cl_fragfile::FragFile;
use crate::cl_fragstats::FragStats;
use crate::cl_itemtimers::ItemTimerList;
use crate::cl_loc::LocationDb;

// ============================================================
// Query errors
// ============================================================

/// Failures raised to the presentation layer at the point of a bad query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("{what} index {index} out of range (0..{max})")]
    Range {
        what: &'static str,
        index: i64,
        max: usize,
    },

    #[error("no entity state for entity {0}")]
    NotFound(i32),

    #[error("entity model index {0} out of range or not precached")]
    InvalidModel(i32),

    #[error("entity type not supported (model {model}, skin {skin})")]
    Unrecognized { model: String, skin: i32 },

    #[error("no display name configured in {0}")]
    Unsupported(&'static str),
}

/// Bounds-check `index` against a fixed capacity. Negative indices are
/// always out of range.
pub fn check_index(what: &'static str, index: i64, max: usize) -> Result<usize, QueryError> {
    if index < 0 || index >= max as i64 {
        return Err(QueryError::Range { what, index, max });
    }
    Ok(index as usize)
}

// ============================================================
// lerpents_t -- interpolated entity buffer entry
// ============================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct LerpEnt {
    /// Matches ClientState::lerpents_sequence when this entry is current.
    pub sequence: u32,
    pub entstate: EntityState,
    pub origin: Vec3,
    pub angles: Vec3,
}

// ============================================================
// player_info_t -- scoreboard slot
// ============================================================

/// Per-player weapon accuracy slots kept by the server.
pub const MAX_WEAPONSTATS: usize = 16;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeaponStats {
    pub wname: String,
    pub hit: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerInfo {
    pub userid: i32,
    pub name: String,
    pub team: String,
    pub spectator: bool,
    pub frags: i32,
    pub topcolor: i32,
    pub bottomcolor: i32,
    pub weaponstats: [WeaponStats; MAX_WEAPONSTATS],
}

impl PlayerInfo {
    /// A named, playing slot. Spectators and empty slots are not players.
    pub fn is_active(&self) -> bool {
        !self.name.is_empty() && !self.spectator
    }

    pub fn weapon_stats(&self, index: i64) -> Result<&WeaponStats, QueryError> {
        let i = check_index("weapon stats", index, MAX_WEAPONSTATS)?;
        Ok(&self.weaponstats[i])
    }
}

// ============================================================
// playerview_t -- one per split-screen seat
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerView {
    pub playernum: i32,
    /// Player slot being spectated, -1 when free-flying.
    pub cam_spec_track: i32,
}

impl Default for PlayerView {
    fn default() -> Self {
        Self {
            playernum: 0,
            cam_spec_track: -1,
        }
    }
}

// ============================================================
// client_state_t
// ============================================================

#[derive(Debug)]
pub struct ClientState {
    pub time: f32,

    pub lerpents: Vec<LerpEnt>,
    /// 0 until the first packet entities have been interpolated.
    pub lerpents_sequence: u32,
    /// Interpolated player positions, [MAX_CLIENTS]. Used when the player has
    /// no entry of its own in lerpents.
    pub lerpplayers: Vec<LerpEnt>,
    pub baselines: Vec<EntityState>,
    /// Model precache, [MAX_PRECACHE_MODELS]. Index 0 is never a model.
    pub model_name: Vec<Option<String>>,

    pub players: Vec<PlayerInfo>,
    /// Slots the server has told us about (maxclients + maxspectators).
    pub allocated_client_slots: usize,
    pub playerviews: Vec<PlayerView>,

    pub cvars: CvarContext,
    pub locations: LocationDb,
    pub itemtimers: ItemTimerList,
    pub fragstats: FragStats,
}

impl ClientState {
    pub fn new(fragfile: &FragFile) -> Self {
        let mut cvars = CvarContext::new();
        register_teamplay_names(&mut cvars);

        Self {
            time: 0.0,
            lerpents: Vec::new(),
            lerpents_sequence: 0,
            lerpplayers: vec![LerpEnt::default(); MAX_CLIENTS],
            baselines: Vec::new(),
            model_name: vec![None; MAX_PRECACHE_MODELS],
            players: vec![PlayerInfo::default(); MAX_CLIENTS],
            allocated_client_slots: MAX_CLIENTS,
            playerviews: vec![PlayerView::default()],
            cvars,
            locations: LocationDb::new(),
            itemtimers: ItemTimerList::new(),
            fragstats: FragStats::new(fragfile),
        }
    }

    /// Wipe everything tied to the current connection or level. Cvars and
    /// the fragfile weapon table survive.
    pub fn clear_state(&mut self) {
        self.time = 0.0;
        self.lerpents.clear();
        self.lerpents_sequence = 0;
        self.lerpplayers.fill(LerpEnt::default());
        self.baselines.clear();
        self.model_name.iter_mut().for_each(|m| *m = None);
        self.players.fill(PlayerInfo::default());
        self.allocated_client_slots = MAX_CLIENTS;
        self.playerviews = vec![PlayerView::default()];
        self.locations.clear();
        self.itemtimers.clear();
        self.fragstats.clear();
        tracing::info!("client state cleared");
    }

    /// Per-frame update step: ingest every queued stat message, then drop
    /// timers that have run out.
    pub fn run_frame(&mut self, now: f32) {
        self.time = now;
        let local = self.local_player();
        self.fragstats.drain(local);
        self.itemtimers.expire(now);
    }

    /// Player slot controlled by the first seat.
    pub fn local_player(&self) -> i32 {
        self.playerviews.first().map_or(-1, |pv| pv.playernum)
    }

    pub fn player_view(&self, index: i64) -> Result<&PlayerView, QueryError> {
        let i = check_index("player view", index, self.playerviews.len())?;
        Ok(&self.playerviews[i])
    }

    pub fn set_split_clients(&mut self, count: usize) {
        let count = count.clamp(1, MAX_SPLITS);
        self.playerviews.resize(count, PlayerView::default());
    }

    pub fn player(&self, index: i64) -> Result<&PlayerInfo, QueryError> {
        let i = check_index("player", index, MAX_CLIENTS)?;
        Ok(&self.players[i])
    }

    pub fn set_client_slots(&mut self, count: usize) {
        self.allocated_client_slots = count.min(MAX_CLIENTS);
    }

    // ========================================================
    // Entity source plumbing, fed by the parser
    // ========================================================

    pub fn set_model_name(&mut self, modelindex: usize, name: &str) {
        if modelindex == 0 || modelindex >= MAX_PRECACHE_MODELS {
            tracing::warn!(modelindex, name, "model precache index out of range");
            return;
        }
        self.model_name[modelindex] = Some(name.to_string());
    }

    pub fn set_baseline(&mut self, entnum: usize, state: EntityState) {
        if entnum >= MAX_EDICTS {
            tracing::warn!(entnum, "baseline for entity out of range");
            return;
        }
        if entnum >= self.baselines.len() {
            self.baselines.resize(entnum + 1, EntityState::default());
        }
        self.baselines[entnum] = state;
    }

    /// Start a new interpolation pass; entries not re-linked during it go stale.
    pub fn begin_entity_frame(&mut self) {
        self.lerpents_sequence = self.lerpents_sequence.wrapping_add(1).max(1);
    }

    /// Record the interpolated state of an entity for the current pass.
    pub fn link_entity(&mut self, entnum: usize, state: EntityState) {
        if entnum >= MAX_EDICTS {
            tracing::warn!(entnum, "linked entity out of range");
            return;
        }
        if entnum >= self.lerpents.len() {
            self.lerpents.resize(entnum + 1, LerpEnt::default());
        }
        self.lerpents[entnum] = LerpEnt {
            sequence: self.lerpents_sequence,
            entstate: state,
            origin: state.origin,
            angles: state.angles,
        };
    }

    /// Record the interpolated position of a player for the current pass.
    pub fn link_player(&mut self, playernum: usize, origin: Vec3, angles: Vec3) {
        let Some(lp) = self.lerpplayers.get_mut(playernum) else {
            tracing::warn!(playernum, "linked player out of range");
            return;
        };
        lp.sequence = self.lerpents_sequence;
        lp.origin = origin;
        lp.angles = angles;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cl_fragstats::{FragMsgType, StatMessage};
    use myqw_common::q_shared::W_ROCKET_LAUNCHER;

    fn new_client() -> ClientState {
        ClientState::new(&FragFile::default_qw())
    }

    #[test]
    fn test_check_index() {
        assert_eq!(check_index("weapon", 0, 64), Ok(0));
        assert_eq!(check_index("weapon", 63, 64), Ok(63));
        assert!(matches!(
            check_index("weapon", 64, 64),
            Err(QueryError::Range { index: 64, max: 64, .. })
        ));
        assert!(check_index("weapon", -1, 64).is_err());
    }

    #[test]
    fn test_player_view_bounds() {
        let mut cl = new_client();
        assert!(cl.player_view(0).is_ok());
        assert!(cl.player_view(1).is_err());
        cl.set_split_clients(2);
        assert!(cl.player_view(1).is_ok());
        cl.set_split_clients(99);
        assert_eq!(cl.playerviews.len(), MAX_SPLITS);
    }

    #[test]
    fn test_local_player_follows_first_seat() {
        let mut cl = new_client();
        cl.playerviews[0].playernum = 5;
        assert_eq!(cl.local_player(), 5);
    }

    #[test]
    fn test_begin_entity_frame_never_zero() {
        let mut cl = new_client();
        cl.lerpents_sequence = u32::MAX;
        cl.begin_entity_frame();
        assert_eq!(cl.lerpents_sequence, 1);
    }

    #[test]
    fn test_run_frame_drains_and_expires() {
        let mut cl = new_client();
        cl.playerviews[0].playernum = 1;
        cl.itemtimers.add(10, [0.0; 3], 0.0, 30.0, 32.0);
        cl.fragstats.push(StatMessage::new(
            FragMsgType::Frags,
            W_ROCKET_LAUNCHER,
            1,
            2,
        ));

        cl.run_frame(5.0);
        assert_eq!(cl.fragstats.pending(), 0);
        assert_eq!(cl.fragstats.totalkills, 1);
        assert_eq!(cl.itemtimers.len(), 1);

        cl.run_frame(30.0);
        assert!(cl.itemtimers.is_empty());
    }

    #[test]
    fn test_clear_state() {
        let mut cl = new_client();
        cl.set_model_name(1, "progs/quaddama.mdl");
        cl.set_baseline(3, EntityState::default());
        cl.begin_entity_frame();
        cl.link_entity(3, EntityState::default());
        cl.itemtimers.add(3, [0.0; 3], 0.0, 60.0, 32.0);
        cl.fragstats.push(StatMessage::new(FragMsgType::Suicide, 0, 1, -1));
        cl.players[2].name = "griffin".to_string();
        cl.run_frame(1.0);
        assert_eq!(cl.fragstats.totalsuicides, 1);

        cl.clear_state();
        assert!(cl.model_name.iter().all(Option::is_none));
        assert!(cl.baselines.is_empty());
        assert!(cl.lerpents.is_empty());
        assert_eq!(cl.lerpents_sequence, 0);
        assert!(cl.itemtimers.is_empty());
        assert_eq!(cl.fragstats.totalsuicides, 0);
        assert!(cl.players.iter().all(|p| p.name.is_empty()));
        // weapon metadata comes from the fragfile, not the session
        assert_eq!(
            cl.fragstats.get_weapon_totals(W_ROCKET_LAUNCHER as i64).unwrap().abbrev,
            "rl"
        );
        // teamplay names are user configuration
        assert_eq!(cl.cvars.variable_string("tp_name_quad"), "quad");
    }

    #[test]
    fn test_entity_numbers_bounded() {
        let mut cl = new_client();
        cl.set_baseline(usize::MAX, EntityState::default());
        cl.set_baseline(MAX_EDICTS, EntityState::default());
        cl.begin_entity_frame();
        cl.link_entity(usize::MAX, EntityState::default());
        cl.link_entity(MAX_EDICTS, EntityState::default());
        assert!(cl.baselines.is_empty());
        assert!(cl.lerpents.is_empty());

        cl.set_baseline(MAX_EDICTS - 1, EntityState::default());
        cl.link_entity(MAX_EDICTS - 1, EntityState::default());
        assert_eq!(cl.baselines.len(), MAX_EDICTS);
        assert_eq!(cl.lerpents.len(), MAX_EDICTS);
    }

    #[test]
    fn test_player_bounds() {
        let mut cl = new_client();
        cl.players[3].name = "bps".to_string();
        assert_eq!(cl.player(3).unwrap().name, "bps");
        assert!(cl.player(MAX_CLIENTS as i64 - 1).is_ok());
        assert!(matches!(
            cl.player(MAX_CLIENTS as i64),
            Err(QueryError::Range { what: "player", .. })
        ));
        assert!(cl.player(-1).is_err());
    }

    #[test]
    fn test_weapon_stats_bounds() {
        let mut cl = new_client();
        cl.players[0].weaponstats[15].hit = 4;
        let player = cl.player(0).unwrap();
        assert_eq!(player.weapon_stats(15).unwrap().hit, 4);
        assert!(player.weapon_stats(0).is_ok());
        assert_eq!(
            player.weapon_stats(16),
            Err(QueryError::Range {
                what: "weapon stats",
                index: 16,
                max: MAX_WEAPONSTATS,
            })
        );
        assert!(player.weapon_stats(-1).is_err());
    }

    #[test]
    fn test_set_model_name_rejects_world_slot() {
        let mut cl = new_client();
        cl.set_model_name(0, "maps/dm2.bsp");
        cl.set_model_name(MAX_PRECACHE_MODELS, "progs/x.mdl");
        assert!(cl.model_name.iter().all(Option::is_none));
    }
}
