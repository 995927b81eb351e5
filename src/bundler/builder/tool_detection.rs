//! External tool detection and availability checking.
//!
//! Missing tools are reported before the run starts instead of halfway
//! through a build. They are warnings, not errors: wrapper shells may put
//! them on `PATH` only for child processes.

use crate::bundler::Settings;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{LazyLock, Mutex};

/// Lookup results, cached per program to avoid repeated `PATH` scans.
static TOOL_CACHE: LazyLock<Mutex<HashMap<String, Option<PathBuf>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Locates `program` on `PATH` (or checks it directly if it is a path).
pub fn locate(program: &str) -> Option<PathBuf> {
    let mut cache = TOOL_CACHE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    cache
        .entry(program.to_string())
        .or_insert_with(|| match which::which(program) {
            Ok(path) => {
                log::debug!("Found {} at: {}", program, path.display());
                Some(path)
            }
            Err(e) => {
                log::debug!("{} not found in PATH: {}", program, e);
                None
            }
        })
        .clone()
}

/// Programs this run will invoke.
pub fn required_tools(settings: &Settings) -> Vec<String> {
    let tools = settings.tools();
    let mut programs = vec![
        settings.solution_generator_path().to_string_lossy().into_owned(),
        tools.msbuild.clone(),
        settings.signing().tool.clone(),
        tools.nmake.clone(),
        tools.iscc.clone(),
        tools.insignia.clone(),
    ];
    if settings.version_settings().vcs == crate::source::Vcs::Mercurial {
        programs.push(tools.hg.clone());
    }
    programs
}

/// Returns the required programs that cannot be found, logging a warning
/// for each.
pub fn missing_tools(settings: &Settings) -> Vec<String> {
    required_tools(settings)
        .into_iter()
        .filter(|program| {
            let found = locate(program).is_some();
            if !found {
                log::warn!("{} not found; the stage using it will fail", program);
            }
            !found
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::SettingsBuilder;

    #[test]
    fn lists_hg_only_for_mercurial_checkouts() {
        let settings = SettingsBuilder::new().repo_root("/repo").build().unwrap();
        let tools = required_tools(&settings);
        assert!(tools.contains(&"hg".to_string()));
        assert!(tools.contains(&"signtool".to_string()));
        assert_eq!(tools.len(), 7);
    }

    #[test]
    fn unknown_program_is_missing() {
        assert!(locate("definitely-not-a-real-tool-4711").is_none());
    }
}
