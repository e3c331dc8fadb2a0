#![allow(clippy::manual_range_contains, clippy::new_without_default)]
// Client-side item recognition, respawn timers and frag statistics
pub mod client;
pub mod cl_entclass;
pub mod cl_fragfile;
pub mod cl_fragstats;
pub mod cl_itemtimers;
pub mod cl_loc;
pub mod cl_players;
