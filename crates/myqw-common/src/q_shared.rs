// q_shared.rs -- types and limits shared by every part of the engine
// QuakeWorld flavour: item bits, weapon ids and entity state as the
// client sees them on the wire.

pub type Vec3 = [f32; 3];

// ============================================================
// Limits
// ============================================================

pub const MAX_CLIENTS: usize = 32;
pub const MAX_SPLITS: usize = 4;
/// Entity numbers the client will hold baselines or interpolated state for.
pub const MAX_EDICTS: usize = 8192;
pub const MAX_PRECACHE_MODELS: usize = 2048;
pub const MAX_WEAPONS: usize = 64;

// ============================================================
// Weapon ids (index into the per-weapon stat tables)
// ============================================================

pub const W_AXE: i32 = 0;
pub const W_SHOTGUN: i32 = 1;
pub const W_SUPER_SHOTGUN: i32 = 2;
pub const W_NAILGUN: i32 = 3;
pub const W_SUPER_NAILGUN: i32 = 4;
pub const W_GRENADE_LAUNCHER: i32 = 5;
pub const W_ROCKET_LAUNCHER: i32 = 6;
pub const W_LIGHTNING: i32 = 7;

// ============================================================
// Item bits (STAT_ITEMS)
// ============================================================

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ItemFlags: u32 {
        const SHOTGUN          = 0x00000001;
        const SUPER_SHOTGUN    = 0x00000002;
        const NAILGUN          = 0x00000004;
        const SUPER_NAILGUN    = 0x00000008;
        const GRENADE_LAUNCHER = 0x00000010;
        const ROCKET_LAUNCHER  = 0x00000020;
        const LIGHTNING        = 0x00000040;
        const SUPER_LIGHTNING  = 0x00000080;
        const SHELLS           = 0x00000100;
        const NAILS            = 0x00000200;
        const ROCKETS          = 0x00000400;
        const CELLS            = 0x00000800;
        const AXE              = 0x00001000;
        const ARMOR1           = 0x00002000;
        const ARMOR2           = 0x00004000;
        const ARMOR3           = 0x00008000;
        const SUPERHEALTH      = 0x00010000;
        const KEY1             = 0x00020000;
        const KEY2             = 0x00040000;
        const INVISIBILITY     = 0x00080000;
        const INVULNERABILITY  = 0x00100000;
        const SUIT             = 0x00200000;
        const QUAD             = 0x00400000;
        const SIGIL1           = 0x10000000;
        const SIGIL2           = 0x20000000;
        const SIGIL3           = 0x40000000;
        const SIGIL4           = 0x80000000;
    }
}

pub const IT_SHOTGUN: ItemFlags = ItemFlags::SHOTGUN;
pub const IT_SUPER_SHOTGUN: ItemFlags = ItemFlags::SUPER_SHOTGUN;
pub const IT_NAILGUN: ItemFlags = ItemFlags::NAILGUN;
pub const IT_SUPER_NAILGUN: ItemFlags = ItemFlags::SUPER_NAILGUN;
pub const IT_GRENADE_LAUNCHER: ItemFlags = ItemFlags::GRENADE_LAUNCHER;
pub const IT_ROCKET_LAUNCHER: ItemFlags = ItemFlags::ROCKET_LAUNCHER;
pub const IT_LIGHTNING: ItemFlags = ItemFlags::LIGHTNING;
pub const IT_ARMOR1: ItemFlags = ItemFlags::ARMOR1;
pub const IT_ARMOR2: ItemFlags = ItemFlags::ARMOR2;
pub const IT_ARMOR3: ItemFlags = ItemFlags::ARMOR3;
pub const IT_SUPERHEALTH: ItemFlags = ItemFlags::SUPERHEALTH;
pub const IT_INVISIBILITY: ItemFlags = ItemFlags::INVISIBILITY;
pub const IT_INVULNERABILITY: ItemFlags = ItemFlags::INVULNERABILITY;
pub const IT_SUIT: ItemFlags = ItemFlags::SUIT;
pub const IT_QUAD: ItemFlags = ItemFlags::QUAD;

// ============================================================
// Cvar flags
// ============================================================

pub const CVAR_ARCHIVE: i32 = 1;
pub const CVAR_TEAMPLAYTIDY: i32 = 16;

// ============================================================
// entity_state_t
// ============================================================

/// Network state of a single entity, as held in the baselines and in the
/// interpolated entity buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityState {
    pub number: i32,
    pub origin: Vec3,
    pub angles: Vec3,
    pub modelindex: i32,
    pub frame: i32,
    pub colormap: i32,
    pub skinnum: i32,
    pub effects: u32,
}

impl Default for EntityState {
    fn default() -> Self {
        Self {
            number: 0,
            origin: [0.0; 3],
            angles: [0.0; 3],
            modelindex: 0,
            frame: 0,
            colormap: 0,
            skinnum: 0,
            effects: 0,
        }
    }
}

pub fn vector_distance_squared(a: &Vec3, b: &Vec3) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}
