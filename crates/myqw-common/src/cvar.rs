// cvar.rs -- dynamic variable tracking
//
// The client keeps one CvarContext per session; lookups are by name and
// return the current string, which is what the teamplay name cvars
// (tp_name_*) are read through.

use std::collections::HashMap;

/// A console variable.
#[derive(Debug, Clone)]
pub struct Cvar {
    pub name: String,
    pub string: String,
    pub flags: i32,
    pub value: f32,
}

/// The full cvar system context.
#[derive(Debug)]
pub struct CvarContext {
    pub cvar_vars: Vec<Cvar>,
    /// O(1) cvar lookup by name -> index in cvar_vars
    cvar_index: HashMap<String, usize>,
}

impl CvarContext {
    pub fn new() -> Self {
        Self {
            cvar_vars: Vec::new(),
            cvar_index: HashMap::new(),
        }
    }

    pub fn find_var_index(&self, name: &str) -> Option<usize> {
        self.cvar_index.get(name).copied()
    }

    pub fn find_var(&self, name: &str) -> Option<&Cvar> {
        self.cvar_index.get(name).map(|&idx| &self.cvar_vars[idx])
    }

    /// Get the floating-point value of a cvar. Returns 0 if not found.
    pub fn variable_value(&self, name: &str) -> f32 {
        self.find_var(name).map_or(0.0, |var| var.value)
    }

    /// Get the string value of a cvar. Returns "" if not found.
    pub fn variable_string(&self, name: &str) -> &str {
        self.find_var(name).map_or("", |var| var.string.as_str())
    }

    /// Get or create a cvar. If it already exists, the value is not changed
    /// but flags are OR'd in.
    pub fn get(&mut self, name: &str, value: &str, flags: i32) -> usize {
        if let Some(&idx) = self.cvar_index.get(name) {
            self.cvar_vars[idx].flags |= flags;
            return idx;
        }

        let idx = self.cvar_vars.len();
        self.cvar_vars.push(Cvar {
            name: name.to_string(),
            string: value.to_string(),
            flags,
            value: value.parse::<f32>().unwrap_or(0.0),
        });
        self.cvar_index.insert(name.to_string(), idx);
        tracing::debug!(name, value, flags, "cvar registered");

        idx
    }

    /// Set a cvar value, creating it with no flags if it doesn't exist.
    pub fn set(&mut self, name: &str, value: &str) -> usize {
        let Some(idx) = self.find_var_index(name) else {
            return self.get(name, value, 0);
        };

        let var = &mut self.cvar_vars[idx];
        if value != var.string {
            var.string = value.to_string();
            var.value = value.parse::<f32>().unwrap_or(0.0);
        }
        idx
    }
}

impl Default for CvarContext {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::q_shared::{CVAR_ARCHIVE, CVAR_TEAMPLAYTIDY};

    #[test]
    fn test_cvar_get_and_find() {
        let mut ctx = CvarContext::new();
        ctx.get("test_var", "42", 0);
        assert_eq!(ctx.variable_value("test_var"), 42.0);
        assert_eq!(ctx.variable_string("test_var"), "42");
    }

    #[test]
    fn test_cvar_get_creates_once() {
        let mut ctx = CvarContext::new();
        let idx = ctx.get("tp_name_quad", "quad", CVAR_ARCHIVE);
        ctx.set("tp_name_quad", "QUAD!");
        // registering again must not clobber the user value
        assert_eq!(ctx.get("tp_name_quad", "quad", CVAR_TEAMPLAYTIDY), idx);
        assert_eq!(ctx.variable_string("tp_name_quad"), "QUAD!");
        assert_eq!(ctx.cvar_vars.len(), 1);
        assert_eq!(
            ctx.find_var("tp_name_quad").unwrap().flags,
            CVAR_ARCHIVE | CVAR_TEAMPLAYTIDY
        );
    }

    #[test]
    fn test_cvar_set_creates_missing() {
        let mut ctx = CvarContext::new();
        ctx.set("tp_name_rl", "rocket");
        assert_eq!(ctx.variable_string("tp_name_rl"), "rocket");
        assert_eq!(ctx.find_var("tp_name_rl").unwrap().flags, 0);
        ctx.set("tp_name_rl", "7");
        assert_eq!(ctx.variable_value("tp_name_rl"), 7.0);
    }

    #[test]
    fn test_cvar_not_found() {
        let ctx = CvarContext::new();
        assert!(ctx.find_var("nonexistent").is_none());
        assert!(ctx.find_var_index("nonexistent").is_none());
        assert_eq!(ctx.variable_value("nonexistent"), 0.0);
        assert_eq!(ctx.variable_string("nonexistent"), "");
    }
}
