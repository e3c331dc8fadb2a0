// cl_fragfile.rs -- fragfile.dat configuration
//
// The fragfile names the weapon classes a mod reports obituaries with and
// tells us which event classes the mod emits at all. Only the directives
// that configure stat tracking are interpreted here:
//
// ```
// #FRAGFILE VERSION ezquake-1.00
// #DEFINE WEAPON_CLASS axe "Axe" ax
// #DEFINE WEAPON_CLASS rl "Rocket Launcher" rl inv_srlaunch
// #DEFINE OBITUARY PLAYER_DEATH rl " rides " "'s rocket"
// #DEFINE FLAG_ALERT X_TOUCHES_FLAG " got the flag"
// ```
//
// Weapon classes get ids in declaration order, starting at 0.

use std::path::Path;

use thiserror::Error;

use myqw_common::q_shared::MAX_WEAPONS;

#[derive(Debug, Error)]
pub enum FragFileError {
    #[error("IO error reading fragfile: {0}")]
    Io(#[from] std::io::Error),

    #[error("fragfile line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Display metadata for one weapon id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeaponClass {
    pub codename: String,
    pub fullname: String,
    pub abbrev: String,
    pub image: String,
}

impl WeaponClass {
    fn new(codename: &str, fullname: &str, abbrev: &str, image: &str) -> Self {
        Self {
            codename: codename.to_string(),
            fullname: fullname.to_string(),
            abbrev: abbrev.to_string(),
            image: image.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragFile {
    pub weapons: Vec<WeaponClass>,
    /// The mod reports kills/deaths (any OBITUARY defined).
    pub tracks_kills: bool,
    /// The mod reports flag events (any FLAG_ALERT defined).
    pub tracks_captures: bool,
}

impl FragFile {
    /// Stock QuakeWorld weapons, ids matching W_AXE..W_LIGHTNING.
    pub fn default_qw() -> Self {
        Self {
            weapons: vec![
                WeaponClass::new("axe", "Axe", "axe", ""),
                WeaponClass::new("sg", "Shotgun", "sg", "inv_shotgun"),
                WeaponClass::new("ssg", "Super Shotgun", "ssg", "inv_sshotgun"),
                WeaponClass::new("ng", "Nailgun", "ng", "inv_nailgun"),
                WeaponClass::new("sng", "Super Nailgun", "sng", "inv_snailgun"),
                WeaponClass::new("gl", "Grenade Launcher", "gl", "inv_rlaunch"),
                WeaponClass::new("rl", "Rocket Launcher", "rl", "inv_srlaunch"),
                WeaponClass::new("lg", "Thunderbolt", "lg", "inv_lightng"),
            ],
            tracks_kills: true,
            tracks_captures: true,
        }
    }

    pub fn load(path: &Path) -> Result<Self, FragFileError> {
        let text = std::fs::read_to_string(path)?;
        let ff = Self::parse(&text)?;
        tracing::info!(
            path = %path.display(),
            weapons = ff.weapons.len(),
            kills = ff.tracks_kills,
            captures = ff.tracks_captures,
            "loaded fragfile"
        );
        Ok(ff)
    }

    pub fn parse(text: &str) -> Result<Self, FragFileError> {
        let mut ff = FragFile::default();

        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            let tokens = tokenize(line).map_err(|reason| FragFileError::Parse {
                line: line_no,
                reason,
            })?;
            let Some(directive) = tokens.first() else {
                continue;
            };

            if directive.eq_ignore_ascii_case("#FRAGFILE")
                || directive.eq_ignore_ascii_case("#META")
            {
                continue;
            }
            if !directive.eq_ignore_ascii_case("#DEFINE") {
                tracing::warn!(
                    line = line_no,
                    directive = %directive,
                    "unknown fragfile directive ignored"
                );
                continue;
            }

            let kind = tokens.get(1).map(String::as_str).unwrap_or("");
            match kind.to_ascii_uppercase().as_str() {
                "WEAPON_CLASS" | "WC" => {
                    let wc = parse_weapon_class(&tokens[2..]).ok_or_else(|| FragFileError::Parse {
                        line: line_no,
                        reason: "WEAPON_CLASS needs a codename and a name".to_string(),
                    })?;
                    if ff.weapons.len() >= MAX_WEAPONS {
                        tracing::warn!(
                            line = line_no,
                            codename = %wc.codename,
                            "too many weapon classes, ignored"
                        );
                        continue;
                    }
                    ff.weapons.push(wc);
                }
                "OBITUARY" | "OBIT" => ff.tracks_kills = true,
                "FLAG_ALERT" | "FLAG_MSG" => ff.tracks_captures = true,
                _ => {
                    tracing::warn!(line = line_no, kind, "unknown #DEFINE ignored");
                }
            }
        }

        Ok(ff)
    }

    /// Weapon id of a codename, as used by OBITUARY lines.
    pub fn weapon_id(&self, codename: &str) -> Option<i32> {
        self.weapons
            .iter()
            .position(|w| w.codename.eq_ignore_ascii_case(codename))
            .map(|i| i as i32)
    }
}

fn parse_weapon_class(args: &[String]) -> Option<WeaponClass> {
    let codename = args.first()?;
    let fullname = args.get(1)?;
    let abbrev = args.get(2).unwrap_or(codename);
    let image = args.get(3).map(String::as_str).unwrap_or("");
    Some(WeaponClass::new(codename, fullname, abbrev, image))
}

/// Split a line into whitespace-separated tokens; double quotes group.
fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '"' {
            chars.next();
            let mut tok = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some(ch) => tok.push(ch),
                    None => return Err("unterminated quote".to_string()),
                }
            }
            tokens.push(tok);
        } else {
            let mut tok = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                tok.push(ch);
                chars.next();
            }
            tokens.push(tok);
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use myqw_common::q_shared::{W_AXE, W_LIGHTNING, W_ROCKET_LAUNCHER};

    const SAMPLE: &str = r#"
#FRAGFILE VERSION ezquake-1.00
#META TITLE "test"
// weapons
#DEFINE WEAPON_CLASS axe "Axe" ax
#DEFINE WC rl "Rocket Launcher" rl inv_srlaunch
#DEFINE WEAPON_CLASS tele "Telefrag"
#DEFINE OBITUARY PLAYER_DEATH rl " rides " "'s rocket"
"#;

    #[test]
    fn test_parse_weapons() {
        let ff = FragFile::parse(SAMPLE).unwrap();
        assert_eq!(ff.weapons.len(), 3);
        assert_eq!(ff.weapons[0], WeaponClass::new("axe", "Axe", "ax", ""));
        assert_eq!(ff.weapons[1].image, "inv_srlaunch");
        assert_eq!(ff.weapons[2].abbrev, "tele");
        assert_eq!(ff.weapon_id("RL"), Some(1));
        assert_eq!(ff.weapon_id("lg"), None);
    }

    #[test]
    fn test_mode_flags() {
        let ff = FragFile::parse(SAMPLE).unwrap();
        assert!(ff.tracks_kills);
        assert!(!ff.tracks_captures);

        let ff =
            FragFile::parse("#DEFINE FLAG_ALERT X_CAPTURES_FLAG \" captured the flag\"").unwrap();
        assert!(!ff.tracks_kills);
        assert!(ff.tracks_captures);
    }

    #[test]
    fn test_parse_errors() {
        let err = FragFile::parse("#DEFINE WEAPON_CLASS axe").unwrap_err();
        assert!(matches!(err, FragFileError::Parse { line: 1, .. }));

        let err = FragFile::parse("\n#DEFINE WC rl \"Rocket").unwrap_err();
        assert!(matches!(err, FragFileError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_unknown_directives_ignored() {
        let ff = FragFile::parse("#DEFINE SOMETHING a b\n#INCLUDE other.dat\nloose text").unwrap();
        assert_eq!(ff, FragFile::default());
    }

    #[test]
    fn test_weapon_cap() {
        let mut text = String::new();
        for i in 0..MAX_WEAPONS + 3 {
            text.push_str(&format!("#DEFINE WC w{} \"Weapon {}\"\n", i, i));
        }
        let ff = FragFile::parse(&text).unwrap();
        assert_eq!(ff.weapons.len(), MAX_WEAPONS);
        assert_eq!(ff.weapons[MAX_WEAPONS - 1].codename, format!("w{}", MAX_WEAPONS - 1));
    }

    #[test]
    fn test_default_qw_ids() {
        let ff = FragFile::default_qw();
        assert_eq!(ff.weapon_id("axe"), Some(W_AXE));
        assert_eq!(ff.weapon_id("rl"), Some(W_ROCKET_LAUNCHER));
        assert_eq!(ff.weapon_id("lg"), Some(W_LIGHTNING));
        assert!(ff.tracks_kills && ff.tracks_captures);
    }

    #[test]
    fn test_load_missing_file() {
        let err = FragFile::load(Path::new("/nonexistent/fragfile.dat")).unwrap_err();
        assert!(matches!(err, FragFileError::Io(_)));
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize(r#"#DEFINE WC rl "Rocket Launcher"  rl"#).unwrap(),
            vec!["#DEFINE", "WC", "rl", "Rocket Launcher", "rl"]
        );
        assert_eq!(tokenize(r#""" x"#).unwrap(), vec!["", "x"]);
    }
}
