//! Layered TOML configuration.
//!
//! Files are read in order and merged key by key, later files winning:
//! the global `~/.config/comic2pdf/config.toml`, then `./.comic2pdf.toml`.
//! Missing files are ignored. CLI flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use comic_core::options::ConversionOptions;

const APP_DIR: &str = "comic2pdf";
const GLOBAL_FILE: &str = "config.toml";
const LOCAL_FILE: &str = ".comic2pdf.toml";

/// Config files in the order they are applied.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join(APP_DIR).join(GLOBAL_FILE));
    }
    paths.push(PathBuf::from(LOCAL_FILE));
    paths
}

/// Options built from `paths`, plus one message per file that could not be
/// used. Logging is not set up yet when this runs, so problems are returned.
pub fn load_config(paths: &[PathBuf]) -> (ConversionOptions, Vec<String>) {
    let mut merged = toml::Table::new();
    let mut problems = Vec::new();

    for path in paths {
        match read_table(path) {
            Ok(Some(table)) => merge_tables(&mut merged, table),
            Ok(None) => {}
            Err(e) => problems.push(format!("Failed to parse {}: {}", path.display(), e)),
        }
    }

    match toml::Value::Table(merged).try_into::<ConversionOptions>() {
        Ok(options) => (options, problems),
        Err(e) => {
            problems.push(format!("Invalid configuration, using defaults: {}", e));
            (ConversionOptions::default(), problems)
        }
    }
}

fn read_table(path: &Path) -> Result<Option<toml::Table>, String> {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return Ok(None);
    };
    contents
        .parse::<toml::Table>()
        .map(Some)
        .map_err(|e| e.to_string())
}

/// Merge `from` into `base`. Nested tables merge recursively; any other
/// value replaces what was there.
fn merge_tables(base: &mut toml::Table, from: toml::Table) {
    for (key, value) in from {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, toml::Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comic_core::options::{PageOrder, RarDecoderKind};

    #[test]
    fn test_later_file_wins_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let local = dir.path().join("local.toml");
        std::fs::write(&global, "jpeg_quality = 70\npage_order = \"lexical\"\n").unwrap();
        std::fs::write(&local, "jpeg_quality = 85\n").unwrap();

        let (options, problems) = load_config(&[global, local]);
        assert!(problems.is_empty());
        assert_eq!(options.jpeg_quality, 85);
        assert_eq!(options.page_order, PageOrder::Lexical);
        assert_eq!(
            options.rar_decoders,
            vec![RarDecoderKind::Unrar, RarDecoderKind::SevenZip]
        );
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (options, problems) = load_config(&[dir.path().join("absent.toml")]);
        assert!(problems.is_empty());
        assert_eq!(options.jpeg_quality, 90);
        assert_eq!(options.required_tools, vec!["pdfimages"]);
    }

    #[test]
    fn test_broken_file_is_reported_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        let good = dir.path().join("good.toml");
        std::fs::write(&broken, "jpeg_quality = ").unwrap();
        std::fs::write(&good, "dry_run = true\n").unwrap();

        let (options, problems) = load_config(&[broken, good]);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("broken.toml"));
        assert!(options.dry_run);
    }

    #[test]
    fn test_wrong_type_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.toml");
        std::fs::write(&path, "jpeg_quality = \"high\"\n").unwrap();
        let (options, problems) = load_config(&[path]);
        assert_eq!(problems.len(), 1);
        assert_eq!(options.jpeg_quality, 90);
    }

    #[test]
    fn test_merge_nested_tables() {
        let mut base: toml::Table = "[a]\nx = 1\ny = 2\n".parse().unwrap();
        let from: toml::Table = "[a]\ny = 3\n".parse().unwrap();
        merge_tables(&mut base, from);
        let a = base["a"].as_table().unwrap();
        assert_eq!(a["x"].as_integer(), Some(1));
        assert_eq!(a["y"].as_integer(), Some(3));
    }
}
