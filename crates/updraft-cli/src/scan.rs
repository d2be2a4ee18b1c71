//! Candidate file discovery under the update root.
//!
//! Include/exclude filters are wildcard masks (`*`, `?`), semicolon
//! separated, matched against file names. Discovered paths come back
//! root-relative, ready to feed into `add_file_reference` one at a time.

use regex::Regex;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

const MASK_SPECIAL_CHARS: [char; 10] = ['.', '+', '$', '^', '(', ')', '[', ']', '{', '}'];

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Include masks; empty means everything (`*`).
    pub include: Vec<String>,
    /// Exclude masks; a lone `*` excludes everything.
    pub exclude: Vec<String>,
    pub recursive: bool,
}

/// Split a semicolon-separated mask list, dropping empty entries.
pub fn split_masks(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Translate a wildcard mask into an anchored, case-insensitive regex:
/// regex metacharacters are escaped, `*` becomes `.*`, and `?` becomes an
/// optional character.
pub fn mask_to_regex(mask: &str) -> String {
    let mut pattern = String::with_capacity(mask.len() + 8);
    pattern.push_str("(?i)^");
    for c in mask.chars() {
        match c {
            '\\' => {}
            '*' => pattern.push_str(".*"),
            '?' => pattern.push_str(".?"),
            c if MASK_SPECIAL_CHARS.contains(&c) => {
                pattern.push('\\');
                pattern.push(c);
            }
            c => pattern.push(c),
        }
    }
    pattern.push('$');
    pattern
}

fn compile_masks(masks: &[String]) -> Result<Vec<Regex>, regex::Error> {
    masks.iter().map(|m| Regex::new(&mask_to_regex(m))).collect()
}

/// Walk `root` and return the root-relative paths of every file matching
/// the include masks and none of the exclude masks, in path order.
pub fn scan_root(root: &Path, options: &ScanOptions) -> Result<Vec<String>, regex::Error> {
    if options.exclude.iter().any(|m| m == "*") {
        debug!("exclude mask '*' present, nothing to scan");
        return Ok(Vec::new());
    }

    let include = if options.include.is_empty() {
        vec!["*".to_owned()]
    } else {
        options.include.clone()
    };
    let include = compile_masks(&include)?;
    let exclude = compile_masks(&options.exclude)?;

    let max_depth = if options.recursive { usize::MAX } else { 1 };
    let mut found = Vec::new();
    for entry in WalkDir::new(root)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !include.iter().any(|m| m.is_match(&name)) {
            continue;
        }
        if exclude.iter().any(|m| m.is_match(&name)) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        found.push(relative.to_string_lossy().into_owned());
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn split_masks_drops_empty_entries() {
        assert_eq!(split_masks("*.exe; *.dll;;"), vec!["*.exe", "*.dll"]);
        assert!(split_masks("").is_empty());
    }

    #[test]
    fn mask_translation_escapes_specials() {
        assert_eq!(mask_to_regex("*.exe"), "(?i)^.*\\.exe$");
        assert_eq!(mask_to_regex("app?.dll"), "(?i)^app.?\\.dll$");
        assert_eq!(mask_to_regex("a+b(1).txt"), "(?i)^a\\+b\\(1\\)\\.txt$");
    }

    #[test]
    fn empty_include_means_everything() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.exe"));
        touch(&dir.path().join("b.txt"));

        let files = scan_root(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(files, vec!["a.exe", "b.txt"]);
    }

    #[test]
    fn include_masks_filter_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("app.exe"));
        touch(&dir.path().join("app.pdb"));
        touch(&dir.path().join("readme.txt"));

        let options = ScanOptions {
            include: split_masks("*.exe;*.txt"),
            ..ScanOptions::default()
        };
        let files = scan_root(dir.path(), &options).unwrap();
        assert_eq!(files, vec!["app.exe", "readme.txt"]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("APP.EXE"));

        let options = ScanOptions {
            include: split_masks("*.exe"),
            ..ScanOptions::default()
        };
        assert_eq!(scan_root(dir.path(), &options).unwrap(), vec!["APP.EXE"]);
    }

    #[test]
    fn exclude_masks_win_over_includes() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("app.exe"));
        touch(&dir.path().join("app.vshost.exe"));

        let options = ScanOptions {
            include: split_masks("*.exe"),
            exclude: split_masks("*.vshost.exe"),
            ..ScanOptions::default()
        };
        assert_eq!(scan_root(dir.path(), &options).unwrap(), vec!["app.exe"]);
    }

    #[test]
    fn exclude_everything_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.exe"));

        let options = ScanOptions {
            exclude: split_masks("*"),
            ..ScanOptions::default()
        };
        assert!(scan_root(dir.path(), &options).unwrap().is_empty());
    }

    #[test]
    fn recursion_is_opt_in() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("top.dll"));
        touch(&dir.path().join("sub/nested.dll"));

        let flat = scan_root(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(flat, vec!["top.dll"]);

        let options = ScanOptions {
            recursive: true,
            ..ScanOptions::default()
        };
        let deep = scan_root(dir.path(), &options).unwrap();
        assert_eq!(deep, vec!["sub/nested.dll", "top.dll"]);
    }
}
