// cl_entclass.rs -- map world entities back to known item types
//
// An entity is identified by the model it draws with, plus its skin where a
// model is shared between items (the three armor tiers use one model). The
// table is scanned in order and the first match wins, so the skinned armor
// rows must stay ahead of anything that would match the model alone.

use myqw_common::cvar::CvarContext;
use myqw_common::q_shared::*;

use crate::client::{ClientState, QueryError};

/// Skin value that matches any skin.
pub const ANY_SKIN: i32 = -1;

/// One row of the entity mapping table.
#[derive(Debug, PartialEq, Eq)]
pub struct EntityMapping {
    pub mdl: &'static str,
    /// Cvar holding the teamplay display name for this item.
    pub tp_cvar: &'static str,
    pub item: ItemFlags,
    pub skin: i32,
}

#[rustfmt::skip]
pub static ENTITY_MAPPING: [EntityMapping; 15] = [
    EntityMapping { mdl: "progs/backpack.mdl", tp_cvar: "tp_name_backpack", item: ItemFlags::empty(), skin: ANY_SKIN },
    EntityMapping { mdl: "progs/ring.mdl",     tp_cvar: "tp_name_ring",     item: IT_INVISIBILITY,     skin: ANY_SKIN },
    EntityMapping { mdl: "progs/invulner.mdl", tp_cvar: "tp_name_pent",     item: IT_INVULNERABILITY,  skin: ANY_SKIN },
    EntityMapping { mdl: "progs/quaddama.mdl", tp_cvar: "tp_name_quad",     item: IT_QUAD,             skin: ANY_SKIN },
    EntityMapping { mdl: "progs/suit.mdl",     tp_cvar: "tp_name_suit",     item: IT_SUIT,             skin: ANY_SKIN },
    EntityMapping { mdl: "progs/armor.mdl",    tp_cvar: "tp_name_ra",       item: IT_ARMOR3,           skin: 2 },
    EntityMapping { mdl: "progs/armor.mdl",    tp_cvar: "tp_name_ya",       item: IT_ARMOR2,           skin: 1 },
    EntityMapping { mdl: "progs/armor.mdl",    tp_cvar: "tp_name_ga",       item: IT_ARMOR1,           skin: 0 },
    EntityMapping { mdl: "progs/g_shot.mdl",   tp_cvar: "tp_name_ssg",      item: IT_SUPER_SHOTGUN,    skin: ANY_SKIN },
    EntityMapping { mdl: "progs/g_nail.mdl",   tp_cvar: "tp_name_ng",       item: IT_NAILGUN,          skin: ANY_SKIN },
    EntityMapping { mdl: "progs/g_nail2.mdl",  tp_cvar: "tp_name_sng",      item: IT_SUPER_NAILGUN,    skin: ANY_SKIN },
    EntityMapping { mdl: "progs/g_rock.mdl",   tp_cvar: "tp_name_gl",       item: IT_GRENADE_LAUNCHER, skin: ANY_SKIN },
    EntityMapping { mdl: "progs/g_rock2.mdl",  tp_cvar: "tp_name_rl",       item: IT_ROCKET_LAUNCHER,  skin: ANY_SKIN },
    EntityMapping { mdl: "progs/g_light.mdl",  tp_cvar: "tp_name_lg",       item: IT_LIGHTNING,        skin: ANY_SKIN },
    EntityMapping { mdl: "maps/b_bh100.bsp",   tp_cvar: "tp_name_mh",       item: IT_SUPERHEALTH,      skin: ANY_SKIN },
];

/// Default teamplay names, registered once at client init.
const TP_NAME_DEFAULTS: [(&str, &str); 15] = [
    ("tp_name_backpack", "pack"),
    ("tp_name_ring", "ring"),
    ("tp_name_pent", "pent"),
    ("tp_name_quad", "quad"),
    ("tp_name_suit", "suit"),
    ("tp_name_ra", "ra"),
    ("tp_name_ya", "ya"),
    ("tp_name_ga", "ga"),
    ("tp_name_ssg", "ssg"),
    ("tp_name_ng", "ng"),
    ("tp_name_sng", "sng"),
    ("tp_name_gl", "gl"),
    ("tp_name_rl", "rl"),
    ("tp_name_lg", "lg"),
    ("tp_name_mh", "mh"),
];

pub fn register_teamplay_names(cvars: &mut CvarContext) {
    for (name, value) in TP_NAME_DEFAULTS {
        cvars.get(name, value, CVAR_ARCHIVE | CVAR_TEAMPLAYTIDY);
    }
}

impl EntityMapping {
    pub fn matches(&self, mdl: &str, skinnum: i32) -> bool {
        self.mdl == mdl && (self.skin == ANY_SKIN || self.skin == skinnum)
    }

    /// Current teamplay name of this item type.
    pub fn display_name<'a>(&self, cvars: &'a CvarContext) -> Result<&'a str, QueryError> {
        cvars
            .find_var(self.tp_cvar)
            .map(|var| var.string.as_str())
            .ok_or(QueryError::Unsupported(self.tp_cvar))
    }
}

/// First table row matching a model path and skin.
pub fn lookup_mapping(mdl: &str, skinnum: i32) -> Option<&'static EntityMapping> {
    ENTITY_MAPPING.iter().find(|e| e.matches(mdl, skinnum))
}

/// The freshest state known for an entity: this pass's interpolated state if
/// there is one, the baseline otherwise.
pub fn entity_state(cl: &ClientState, entnum: i32) -> Result<&EntityState, QueryError> {
    if entnum < 0 {
        return Err(QueryError::NotFound(entnum));
    }
    let idx = entnum as usize;

    if cl.lerpents_sequence != 0 {
        if let Some(le) = cl.lerpents.get(idx) {
            if le.sequence == cl.lerpents_sequence {
                return Ok(&le.entstate);
            }
        }
    }

    cl.baselines.get(idx).ok_or(QueryError::NotFound(entnum))
}

/// Classify the entity at `entnum` against ENTITY_MAPPING.
pub fn cl_classify_entity(
    cl: &ClientState,
    entnum: i32,
) -> Result<&'static EntityMapping, QueryError> {
    let ent = entity_state(cl, entnum)?;

    if ent.modelindex < 0 || ent.modelindex as usize >= MAX_PRECACHE_MODELS {
        return Err(QueryError::InvalidModel(ent.modelindex));
    }

    let mdl = match cl.model_name.get(ent.modelindex as usize) {
        Some(Some(name)) if !name.is_empty() => name.as_str(),
        _ => return Err(QueryError::InvalidModel(ent.modelindex)),
    };

    lookup_mapping(mdl, ent.skinnum).ok_or_else(|| QueryError::Unrecognized {
        model: mdl.to_string(),
        skin: ent.skinnum,
    })
}
