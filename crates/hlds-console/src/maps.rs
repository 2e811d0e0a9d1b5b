//! Map list discovery from the game directory.

use std::fs;
use std::io;
use std::path::Path;

/// List map names in `dir`.
///
/// Only regular files directly inside `dir` whose extension equals
/// `extension` (ignoring case) are considered. Names are returned without the
/// extension, sorted byte-wise.
pub fn scan_map_dir(dir: &Path, extension: &str) -> io::Result<Vec<String>> {
    let mut maps = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if !matches {
            continue;
        }

        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            if !stem.is_empty() {
                maps.push(stem.to_string());
            }
        }
    }

    maps.sort();
    Ok(maps)
}

/// Build the selectable map list.
///
/// Falls back to the currently loaded map when the directory is missing,
/// unreadable or holds no maps. Returns an empty list only if that is unknown
/// too.
pub fn load_map_list(dir: &Path, extension: &str, current_map: Option<&str>) -> Vec<String> {
    let maps = match scan_map_dir(dir, extension) {
        Ok(maps) => maps,
        Err(e) => {
            log::debug!("Could not scan map directory {:?}: {}", dir, e);
            Vec::new()
        }
    };

    if !maps.is_empty() {
        log::debug!("Found {} maps in {:?}", maps.len(), dir);
        return maps;
    }

    match current_map.filter(|name| !name.is_empty()) {
        Some(name) => vec![name.to_string()],
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs::File;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "de_dust2.bsp");
        touch(dir.path(), "cs_office.BSP");
        touch(dir.path(), "Aim_map.bsp");
        touch(dir.path(), "de_dust.bsp");
        touch(dir.path(), "de_dust.res");
        touch(dir.path(), "readme.txt");
        touch(dir.path(), ".bsp");
        fs::create_dir(dir.path().join("nested.bsp")).unwrap();

        let maps = scan_map_dir(dir.path(), "bsp").unwrap();
        assert_eq!(maps, vec!["Aim_map", "cs_office", "de_dust", "de_dust2"]);
    }

    #[test]
    fn test_scan_is_not_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        touch(&sub, "hidden.bsp");

        assert!(scan_map_dir(dir.path(), "bsp").unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_falls_back_to_current_map() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("maps");

        assert!(scan_map_dir(&missing, "bsp").is_err());
        assert_eq!(load_map_list(&missing, "bsp", Some("de_dust")), vec!["de_dust"]);
        assert!(load_map_list(&missing, "bsp", None).is_empty());
        assert!(load_map_list(&missing, "bsp", Some("")).is_empty());
    }

    #[test]
    fn test_empty_directory_falls_back_to_current_map() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_map_list(dir.path(), "bsp", Some("crossfire")), vec!["crossfire"]);
    }

    #[test]
    fn test_found_maps_take_precedence() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "de_aztec.bsp");
        assert_eq!(load_map_list(dir.path(), "bsp", Some("crossfire")), vec!["de_aztec"]);
    }
}
