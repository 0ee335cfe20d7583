//! Environment variable expansion.
//!
//! Windows populates the environment of a spawned process with raw `%VAR%`
//! placeholders when a variable references another one (or itself, as in
//! `PATH=%PATH%;C:\extra`). The platform build toolchains choke on those, so
//! the snapshot handed to them has every placeholder resolved first. On
//! other platforms the shell has already done this and the snapshot passes
//! through unchanged.

use crate::types::EnvMap;

/// Resolves `%VAR%` placeholders in the given environment snapshot.
///
/// Returns a new map; the input is not mutated. On non-Windows hosts this
/// is the identity.
pub fn expand_environment(vars: &EnvMap) -> EnvMap {
    if cfg!(windows) {
        expand_percent_vars(vars)
    } else {
        vars.clone()
    }
}

/// Platform-independent resolution core, exercised directly by tests.
pub(crate) fn expand_percent_vars(vars: &EnvMap) -> EnvMap {
    vars.iter()
        .map(|(name, value)| (name.clone(), expand_value(vars, value)))
        .collect()
}

fn expand_value(vars: &EnvMap, value: &str) -> String {
    let mut resolved = value.to_string();
    for name in placeholder_names(value) {
        let Some(referenced) = vars.get(&name) else {
            continue;
        };
        let token = format!("%{}%", name);
        // Self-reference guard: a variable whose value still contains its
        // own placeholder (PATH=%PATH%;X) is left alone, otherwise the
        // substitution would recurse forever.
        if referenced.contains(&token) {
            continue;
        }
        // Forward references may themselves hold placeholders; resolve the
        // referenced value first. Depth is bounded by the acyclic structure
        // of non-self references; a genuine cycle among two or more distinct
        // variables is not detected.
        let replacement = if referenced.contains('%') {
            expand_value(vars, referenced)
        } else {
            referenced.clone()
        };
        resolved = resolved.replace(&token, &replacement);
    }
    resolved
}

/// Extracts distinct `NAME` occurrences of `%NAME%` pairs, in order.
fn placeholder_names(value: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = value;
    while let Some(start) = rest.find('%') {
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
                rest = &after[end + 1..];
            }
            Some(end) => {
                // "%%" is not a placeholder; skip past it.
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    names
}
