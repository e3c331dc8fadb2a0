// cl_fragstats.rs -- frag and flag statistics
//
// The obituary matcher classifies console prints into StatMessages and
// queues them; once per frame the queue is drained and every message is
// applied to the global, per-weapon and per-client counters.
//
// Counters are u16 and wrap. That is plenty for a play session and nobody
// keeps a client connected long enough for it to matter.
//
// Single-subject messages only touch the global totals (flag messages also
// credit the subject's grabs/caps/drops). Dual-subject messages name two
// clients, p1 and p2:
//
//   Frags, Teamkill          p1 killed p2
//   FraggedBy, TeamkilledBy  p1 was killed by p2
//
// and update the weapon totals plus the counters of p2, the counterpart.

use crossbeam::channel::{unbounded, Receiver, Sender};
use thiserror::Error;

use myqw_common::common::com_printf;
use myqw_common::q_shared::{MAX_CLIENTS, MAX_WEAPONS};

use crate::cl_fragfile::FragFile;
use crate::client::{check_index, QueryError};

pub type Stat = u16;

pub const NUM_RUNES: usize = 4;

#[inline]
fn bump(stat: &mut Stat) {
    *stat = stat.wrapping_add(1);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FragStatsError {
    #[error("weapon index {0} out of range")]
    WeaponIndexOutOfRange(i32),

    #[error("client index {0} out of range")]
    ClientIndexOutOfRange(i32),
}

// ============================================================
// Messages
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragMsgType {
    // one component
    Death,
    TeamkillDeath,
    Suicide,
    BonusFrag,
    TeamkillBonus,
    FlagTouch,
    FlagCapture,
    FlagDrop,
    RuneResistance,
    RuneStrength,
    RuneHaste,
    RuneRegeneration,

    // two components
    Frags,
    FraggedBy,
    Teamkill,
    TeamkilledBy,
}

/// Which mode flag gates a message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    Kills,
    Captures,
    Runes,
}

impl FragMsgType {
    pub fn is_dual(self) -> bool {
        matches!(
            self,
            FragMsgType::Frags
                | FragMsgType::FraggedBy
                | FragMsgType::Teamkill
                | FragMsgType::TeamkilledBy
        )
    }

    pub fn class(self) -> EventClass {
        match self {
            FragMsgType::FlagTouch | FragMsgType::FlagCapture | FragMsgType::FlagDrop => {
                EventClass::Captures
            }
            FragMsgType::RuneResistance
            | FragMsgType::RuneStrength
            | FragMsgType::RuneHaste
            | FragMsgType::RuneRegeneration => EventClass::Runes,
            _ => EventClass::Kills,
        }
    }

    fn rune_index(self) -> Option<usize> {
        match self {
            FragMsgType::RuneResistance => Some(0),
            FragMsgType::RuneStrength => Some(1),
            FragMsgType::RuneHaste => Some(2),
            FragMsgType::RuneRegeneration => Some(3),
            _ => None,
        }
    }
}

/// statmessage_t
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatMessage {
    pub kind: FragMsgType,
    pub wid: i32,
    /// Obituary text fragments the message was matched with.
    pub msgpart1: String,
    pub msgpart2: String,
    /// Subject client slot; -1 when the message names nobody.
    pub p1: i32,
    /// Counterpart client slot for two-component messages, -1 otherwise.
    pub p2: i32,
}

impl StatMessage {
    pub fn new(kind: FragMsgType, wid: i32, p1: i32, p2: i32) -> Self {
        Self {
            kind,
            wid,
            msgpart1: String::new(),
            msgpart2: String::new(),
            p1,
            p2,
        }
    }

    pub fn with_text(mut self, msgpart1: &str, msgpart2: &str) -> Self {
        self.msgpart1 = msgpart1.to_string();
        self.msgpart2 = msgpart2.to_string();
        self
    }
}

/// Producer handle for the event source. The queue is unbounded, so sending
/// never blocks and never drops a message while the owning FragStats lives.
#[derive(Clone)]
pub struct StatMessageSender {
    sender: Sender<StatMessage>,
}

impl StatMessageSender {
    /// Returns `false` only if the FragStats this handle came from is gone.
    pub fn send(&self, msg: StatMessage) -> bool {
        match self.sender.send(msg) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(kind = ?err.0.kind, "stat queue closed, message dropped");
                false
            }
        }
    }
}

// ============================================================
// Totals
// ============================================================

/// Per-weapon totals. Kills are tracked for everyone; the own* counters only
/// for events involving the local player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeaponTotals {
    pub kills: Stat,
    pub teamkills: Stat,
    pub suicides: Stat,

    pub ownkills: Stat,
    pub owndeaths: Stat,
    pub ownteamkills: Stat,
    pub ownteamdeaths: Stat,
    pub ownsuicides: Stat,

    pub fullname: String,
    pub abbrev: String,
    pub image: String,
    pub codename: String,
}

impl WeaponTotals {
    fn reset_counts(&mut self) {
        self.kills = 0;
        self.teamkills = 0;
        self.suicides = 0;
        self.ownkills = 0;
        self.owndeaths = 0;
        self.ownteamkills = 0;
        self.ownteamdeaths = 0;
        self.ownsuicides = 0;
    }

    fn has_counts(&self) -> bool {
        self.kills != 0 || self.teamkills != 0 || self.suicides != 0
    }
}

/// Per-client totals, seen from the local player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientTotals {
    pub caps: Stat,       // times they captured the flag
    pub drops: Stat,      // times they lost the flag
    pub grabs: Stat,      // times they grabbed the flag

    pub owndeaths: Stat,  // times they killed you
    pub ownkills: Stat,   // times you killed them
    pub deaths: Stat,     // times they died (including by you)
    pub kills: Stat,      // times they killed (including you)
    pub teamkills: Stat,  // times they killed a team member
    pub teamdeaths: Stat, // times they died to a team member
    pub suicides: Stat,
}

// ============================================================
// fragstats_t
// ============================================================

pub struct FragStats {
    pub totaldeaths: Stat,
    pub totalsuicides: Stat,
    pub totalteamkills: Stat,
    pub totalkills: Stat,
    pub totaltouches: Stat,
    pub totalcaps: Stat,
    pub totaldrops: Stat,
    /// resistance, strength, haste, regeneration
    pub totalrunes: [Stat; NUM_RUNES],

    pub weapontotals: [WeaponTotals; MAX_WEAPONS],
    pub clienttotals: [ClientTotals; MAX_CLIENTS],

    pub tracks_captures: bool,
    pub tracks_kills: bool,

    sender: Sender<StatMessage>,
    receiver: Receiver<StatMessage>,
}

impl std::fmt::Debug for FragStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragStats")
            .field("totaldeaths", &self.totaldeaths)
            .field("totalsuicides", &self.totalsuicides)
            .field("totalteamkills", &self.totalteamkills)
            .field("totalkills", &self.totalkills)
            .field("totaltouches", &self.totaltouches)
            .field("totalcaps", &self.totalcaps)
            .field("totaldrops", &self.totaldrops)
            .field("tracks_captures", &self.tracks_captures)
            .field("tracks_kills", &self.tracks_kills)
            .field("pending", &self.receiver.len())
            .finish_non_exhaustive()
    }
}

impl FragStats {
    pub fn new(fragfile: &FragFile) -> Self {
        let (sender, receiver) = unbounded();
        let mut fs = Self {
            totaldeaths: 0,
            totalsuicides: 0,
            totalteamkills: 0,
            totalkills: 0,
            totaltouches: 0,
            totalcaps: 0,
            totaldrops: 0,
            totalrunes: [0; NUM_RUNES],
            weapontotals: std::array::from_fn(|_| WeaponTotals::default()),
            clienttotals: [ClientTotals::default(); MAX_CLIENTS],
            tracks_captures: false,
            tracks_kills: false,
            sender,
            receiver,
        };
        fs.apply_fragfile(fragfile);
        fs
    }

    /// Install weapon names and mode flags from a fragfile.
    pub fn apply_fragfile(&mut self, fragfile: &FragFile) {
        for (i, wt) in self.weapontotals.iter_mut().enumerate() {
            let wc = fragfile.weapons.get(i).cloned().unwrap_or_default();
            wt.fullname = wc.fullname;
            wt.abbrev = wc.abbrev;
            wt.image = wc.image;
            wt.codename = wc.codename;
        }
        self.tracks_kills = fragfile.tracks_kills;
        self.tracks_captures = fragfile.tracks_captures;
    }

    /// Zero every counter and discard queued messages. Weapon names and mode
    /// flags are configuration and stay.
    pub fn clear(&mut self) {
        self.totaldeaths = 0;
        self.totalsuicides = 0;
        self.totalteamkills = 0;
        self.totalkills = 0;
        self.totaltouches = 0;
        self.totalcaps = 0;
        self.totaldrops = 0;
        self.totalrunes = [0; NUM_RUNES];
        self.weapontotals.iter_mut().for_each(WeaponTotals::reset_counts);
        self.clienttotals = [ClientTotals::default(); MAX_CLIENTS];

        let discarded = self.receiver.try_iter().count();
        if discarded > 0 {
            tracing::debug!(discarded, "stale stat messages discarded");
        }
    }

    // ========================================================
    // Queue
    // ========================================================

    pub fn sender(&self) -> StatMessageSender {
        StatMessageSender {
            sender: self.sender.clone(),
        }
    }

    pub fn push(&self, msg: StatMessage) {
        // the receiver lives in self, so this cannot fail
        let _ = self.sender.send(msg);
    }

    /// Messages waiting for the next drain.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Ingest every queued message in arrival order. Returns how many were
    /// taken off the queue.
    pub fn drain(&mut self, playernum: i32) -> usize {
        let mut count = 0;
        while let Ok(msg) = self.receiver.try_recv() {
            self.ingest(msg, playernum);
            count += 1;
        }
        count
    }

    /// Apply one message. Bad messages are logged and dropped.
    pub fn ingest(&mut self, msg: StatMessage, playernum: i32) {
        if let Err(err) = self.evaluate(&msg, playernum) {
            tracing::warn!(
                kind = ?msg.kind,
                wid = msg.wid,
                p1 = msg.p1,
                p2 = msg.p2,
                "stat message dropped: {}",
                err
            );
        }
    }

    fn evaluate(&mut self, msg: &StatMessage, playernum: i32) -> Result<(), FragStatsError> {
        let tracked = match msg.kind.class() {
            EventClass::Kills => self.tracks_kills,
            EventClass::Captures => self.tracks_captures,
            EventClass::Runes => true,
        };
        if !tracked {
            tracing::debug!(kind = ?msg.kind, "stat message for untracked event class");
            return Ok(());
        }

        tracing::debug!(kind = ?msg.kind, wid = msg.wid, p1 = msg.p1, p2 = msg.p2, "stat message");
        if msg.kind.is_dual() {
            self.evaluate_dual(msg, playernum)
        } else {
            self.evaluate_single(msg)
        }
    }

    fn evaluate_single(&mut self, msg: &StatMessage) -> Result<(), FragStatsError> {
        match msg.kind {
            FragMsgType::Death => bump(&mut self.totaldeaths),
            FragMsgType::TeamkillDeath => {
                bump(&mut self.totaldeaths);
                bump(&mut self.totalteamkills);
            }
            FragMsgType::Suicide => {
                bump(&mut self.totaldeaths);
                bump(&mut self.totalsuicides);
            }
            FragMsgType::BonusFrag => bump(&mut self.totalkills),
            FragMsgType::TeamkillBonus => {
                bump(&mut self.totalkills);
                bump(&mut self.totalteamkills);
            }
            FragMsgType::FlagTouch => {
                let subject = optional_client(msg.p1)?;
                bump(&mut self.totaltouches);
                if let Some(c) = subject {
                    bump(&mut self.clienttotals[c].grabs);
                }
            }
            FragMsgType::FlagCapture => {
                let subject = optional_client(msg.p1)?;
                bump(&mut self.totalcaps);
                if let Some(c) = subject {
                    bump(&mut self.clienttotals[c].caps);
                }
            }
            FragMsgType::FlagDrop => {
                let subject = optional_client(msg.p1)?;
                bump(&mut self.totaldrops);
                if let Some(c) = subject {
                    bump(&mut self.clienttotals[c].drops);
                }
            }
            kind => {
                if let Some(rune) = kind.rune_index() {
                    bump(&mut self.totalrunes[rune]);
                }
            }
        }
        Ok(())
    }

    fn evaluate_dual(&mut self, msg: &StatMessage, playernum: i32) -> Result<(), FragStatsError> {
        if msg.wid < 0 || msg.wid as usize >= MAX_WEAPONS {
            return Err(FragStatsError::WeaponIndexOutOfRange(msg.wid));
        }
        let wid = msg.wid as usize;
        let p1 = client(msg.p1)?;
        let p2 = client(msg.p2)?;

        let (killer, victim) = match msg.kind {
            FragMsgType::Frags | FragMsgType::Teamkill => (p1, p2),
            _ => (p2, p1),
        };
        let is_local = |c: usize| playernum >= 0 && c == playernum as usize;
        let wt = &mut self.weapontotals[wid];

        if killer == victim {
            bump(&mut wt.suicides);
            if is_local(killer) {
                bump(&mut wt.ownsuicides);
            }
            bump(&mut self.clienttotals[killer].suicides);
            bump(&mut self.totalsuicides);
            bump(&mut self.totaldeaths);
            return Ok(());
        }

        if matches!(msg.kind, FragMsgType::Teamkill | FragMsgType::TeamkilledBy) {
            bump(&mut wt.teamkills);
            if is_local(killer) {
                bump(&mut wt.ownteamkills);
            }
            if is_local(victim) {
                bump(&mut wt.ownteamdeaths);
            }
            bump(&mut self.totalteamkills);
        } else {
            bump(&mut wt.kills);
            if is_local(killer) {
                bump(&mut wt.ownkills);
            }
            if is_local(victim) {
                bump(&mut wt.owndeaths);
            }
            bump(&mut self.totalkills);
        }

        let ct = &mut self.clienttotals[p2];
        match msg.kind {
            FragMsgType::Frags => {
                bump(&mut ct.deaths);
                if is_local(p1) {
                    bump(&mut ct.ownkills);
                }
            }
            FragMsgType::FraggedBy => {
                bump(&mut ct.kills);
                if is_local(p1) {
                    bump(&mut ct.owndeaths);
                }
            }
            FragMsgType::Teamkill => bump(&mut ct.teamdeaths),
            _ => bump(&mut ct.teamkills),
        }
        Ok(())
    }

    // ========================================================
    // Presentation queries
    // ========================================================

    pub fn get_weapon_totals(&self, index: i64) -> Result<&WeaponTotals, QueryError> {
        let i = check_index("weapon", index, MAX_WEAPONS)?;
        Ok(&self.weapontotals[i])
    }

    pub fn get_client_totals(&self, index: i64) -> Result<&ClientTotals, QueryError> {
        let i = check_index("client", index, MAX_CLIENTS)?;
        Ok(&self.clienttotals[i])
    }
}

fn client(p: i32) -> Result<usize, FragStatsError> {
    if p < 0 || p as usize >= MAX_CLIENTS {
        return Err(FragStatsError::ClientIndexOutOfRange(p));
    }
    Ok(p as usize)
}

fn optional_client(p: i32) -> Result<Option<usize>, FragStatsError> {
    if p == -1 {
        return Ok(None);
    }
    client(p).map(Some)
}

// ============================================================
// Console Commands
// ============================================================

/// fragstats - Show session totals and per-weapon kills
pub fn cmd_fragstats(fs: &FragStats) {
    com_printf(&format!(
        "kills {}  deaths {}  suicides {}  teamkills {}\n",
        fs.totalkills, fs.totaldeaths, fs.totalsuicides, fs.totalteamkills
    ));
    if fs.tracks_captures {
        com_printf(&format!(
            "flag touches {}  caps {}  drops {}\n",
            fs.totaltouches, fs.totalcaps, fs.totaldrops
        ));
    }

    for wt in fs.weapontotals.iter().filter(|wt| wt.has_counts()) {
        let name = if wt.fullname.is_empty() { "?" } else { wt.fullname.as_str() };
        com_printf(&format!(
            "{:<18} {:>5} kills {:>5} own {:>5} deaths {:>5} suicides\n",
            name, wt.kills, wt.ownkills, wt.owndeaths, wt.suicides
        ));
    }
}
