// cl_loc.rs -- Location system for named map positions
//
// Resolves a world position to the nearest named zone so timers and
// players can be reported as "quad low" rather than coordinates.
//
// Location file format (locs/<mapname>.loc):
// ```
// # Comments start with #
// x y z Location Name
// -512 1024 128 Red Armor
// 256 -384 64 Rocket Launcher
// ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use myqw_common::common::com_printf;
use myqw_common::q_shared::{vector_distance_squared, Vec3};

/// A named location on a map.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub origin: Vec3,
    pub name: String,
}

/// Location database for the current map.
#[derive(Debug, Default)]
pub struct LocationDb {
    pub mapname: String,
    pub locations: Vec<Location>,
}

impl LocationDb {
    pub fn new() -> Self {
        Self {
            mapname: String::new(),
            locations: Vec::new(),
        }
    }

    /// Load locations for a map from `<gamedir>/locs/<mapname>.loc`.
    /// A map without a location file just has no locations.
    pub fn load(&mut self, mapname: &str, gamedir: &Path) -> usize {
        self.clear();
        self.mapname = mapname.to_string();

        let path = gamedir.join("locs").join(format!("{}.loc", mapname));
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(_) => return 0,
        };

        // .loc files carry Quake charset bytes, so lines are not always UTF-8
        let mut reader = BufReader::new(file);
        let mut raw = Vec::new();
        loop {
            raw.clear();
            match reader.read_until(b'\n', &mut raw) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "location file read failed");
                    break;
                }
            }
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }
            if let Some(loc) = Self::parse_location_line(line) {
                self.locations.push(loc);
            }
        }

        tracing::info!(count = self.locations.len(), mapname, "loaded locations");
        self.locations.len()
    }

    /// Parse a location line: "x y z Location Name"
    fn parse_location_line(line: &str) -> Option<Location> {
        let mut parts = line.split_whitespace();
        let x: f32 = parts.next()?.parse().ok()?;
        let y: f32 = parts.next()?.parse().ok()?;
        let z: f32 = parts.next()?.parse().ok()?;

        let name = parts.collect::<Vec<_>>().join(" ");
        if name.is_empty() {
            return None;
        }

        Some(Location {
            origin: [x, y, z],
            name,
        })
    }

    /// Name of the location nearest to `pos`, None when the map has none.
    pub fn find_nearest(&self, pos: Vec3) -> Option<&str> {
        self.locations
            .iter()
            .map(|loc| (vector_distance_squared(&pos, &loc.origin), loc))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, loc)| loc.name.as_str())
    }

    pub fn clear(&mut self) {
        self.mapname.clear();
        self.locations.clear();
    }

    pub fn count(&self) -> usize {
        self.locations.len()
    }
}

// ============================================================
// Console Commands
// ============================================================

/// loclist - List all locations on current map
pub fn cmd_loclist(db: &LocationDb) {
    if db.locations.is_empty() {
        com_printf(&format!("No locations loaded for map '{}'\n", db.mapname));
        return;
    }

    com_printf(&format!("Locations for {}:\n", db.mapname));
    for (i, loc) in db.locations.iter().enumerate() {
        com_printf(&format!(
            "  {:3}: {:>8.0} {:>8.0} {:>8.0}  {}\n",
            i + 1,
            loc.origin[0],
            loc.origin[1],
            loc.origin[2],
            loc.name
        ));
    }
    com_printf(&format!("Total: {} locations\n", db.locations.len()));
}
