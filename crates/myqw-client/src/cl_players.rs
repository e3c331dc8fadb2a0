// cl_players.rs -- scoreboard and player position queries
//
// A player's position comes from its own entity in lerpents (entity number
// playernum + 1) when the server sent one this pass, otherwise from the
// predicted/interpolated player buffer. Neither being current means we have
// no idea where the player is.

use myqw_common::common::com_printf;
use myqw_common::q_shared::{Vec3, MAX_CLIENTS};

use crate::cl_itemtimers::UNKNOWN_LOCATION;
use crate::client::{check_index, ClientState, LerpEnt, PlayerInfo, QueryError};

/// Named, non-spectating players among the allocated slots, with their slot.
pub fn cl_active_players(cl: &ClientState) -> impl Iterator<Item = (usize, &PlayerInfo)> {
    cl.players
        .iter()
        .take(cl.allocated_client_slots)
        .enumerate()
        .filter(|(_, p)| p.is_active())
}

/// Interpolated state of a player for the current pass.
pub fn cl_player_lerped(cl: &ClientState, index: i64) -> Result<&LerpEnt, QueryError> {
    let i = check_index("player", index, MAX_CLIENTS)?;

    if cl.lerpents_sequence != 0 {
        if let Some(le) = cl.lerpents.get(i + 1) {
            if le.sequence == cl.lerpents_sequence {
                return Ok(le);
            }
        }
        if cl.lerpplayers[i].sequence == cl.lerpents_sequence {
            return Ok(&cl.lerpplayers[i]);
        }
    }

    Err(QueryError::NotFound(i as i32 + 1))
}

pub fn cl_player_origin(cl: &ClientState, index: i64) -> Result<Vec3, QueryError> {
    cl_player_lerped(cl, index).map(|le| le.origin)
}

pub fn cl_player_angles(cl: &ClientState, index: i64) -> Result<Vec3, QueryError> {
    cl_player_lerped(cl, index).map(|le| le.angles)
}

/// Zone the player is standing in, or UNKNOWN_LOCATION.
pub fn cl_player_location(cl: &ClientState, index: i64) -> Result<String, QueryError> {
    let origin = cl_player_origin(cl, index)?;
    Ok(cl
        .locations
        .find_nearest(origin)
        .unwrap_or(UNKNOWN_LOCATION)
        .to_string())
}

/// The player a split-screen seat is spectating.
pub fn cl_tracked_player(cl: &ClientState, view: i64) -> Result<&PlayerInfo, QueryError> {
    let pv = cl.player_view(view)?;
    cl.player(pv.cam_spec_track as i64)
}

// ============================================================
// Console Commands
// ============================================================

/// players - List active players with frags and location
pub fn cmd_players(cl: &ClientState) {
    let mut count = 0;
    for (slot, player) in cl_active_players(cl) {
        let location = cl_player_location(cl, slot as i64).unwrap_or_else(|_| "-".to_string());
        com_printf(&format!(
            "{:2} {:<16} {:<4} {:>4}  {}\n",
            slot, player.name, player.team, player.frags, location
        ));
        count += 1;
    }
    com_printf(&format!("{} players\n", count));
}
