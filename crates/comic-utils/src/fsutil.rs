//! Filesystem helpers for flat working directories.

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Join the normal components of a relative entry path with `_`.
///
/// `ch1/01.jpg` becomes `ch1_01.jpg`. Root, `.` and `..` components are
/// dropped so the result never escapes the directory it is joined onto.
/// Returns `None` when nothing usable remains.
pub fn flatten_name(rel: &Path) -> Option<String> {
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("_"))
    }
}

/// A path for `name` inside `dir` that does not exist yet.
///
/// Appends `~1`, `~2`, ... to the stem on collision.
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    };
    let mut n = 1u32;
    loop {
        let candidate = dir.join(format!("{}~{}{}", stem, n, ext));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Regular files directly inside `dir`, in filesystem enumeration order.
pub fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    Ok(files)
}

/// Move every file below `root` up into `root` itself, naming each after its
/// relative path (see [`flatten_name`]), and remove the emptied directories.
///
/// Returns the final paths of all files now in `root`.
pub fn flatten_tree(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut nested = Vec::new();
    let mut dirs = Vec::new();
    collect_nested(root, root, &mut nested, &mut dirs)?;
    nested.sort_by(|a, b| natural_cmp_paths(&a.0, &b.0));

    for (rel, path) in nested {
        let Some(name) = flatten_name(&rel) else {
            continue;
        };
        let target = unique_path(root, &name);
        fs::rename(&path, &target)?;
    }

    // Deepest first so parents are empty by the time they are removed.
    dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));
    for dir in dirs {
        if let Err(e) = fs::remove_dir_all(&dir) {
            log::debug!("Could not remove {}: {}", dir.display(), e);
        }
    }

    list_files(root)
}

fn collect_nested(
    root: &Path,
    dir: &Path,
    files: &mut Vec<(PathBuf, PathBuf)>,
    dirs: &mut Vec<PathBuf>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            dirs.push(path.clone());
            collect_nested(root, &path, files, dirs)?;
        } else if file_type.is_file() && dir != root {
            let rel = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            files.push((rel, path));
        }
    }
    Ok(())
}

/// Compare two names so that runs of ASCII digits order by numeric value.
///
/// `p2.jpg` sorts before `p10.jpg`; ties on value (`p01` vs `p1`) fall back
/// to byte order so the ordering stays total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (ab, bb) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);
    while i < ab.len() && j < bb.len() {
        if ab[i].is_ascii_digit() && bb[j].is_ascii_digit() {
            let si = i;
            while i < ab.len() && ab[i].is_ascii_digit() {
                i += 1;
            }
            let sj = j;
            while j < bb.len() && bb[j].is_ascii_digit() {
                j += 1;
            }
            let da = trim_zeros(&ab[si..i]);
            let db = trim_zeros(&bb[sj..j]);
            let ord = da.len().cmp(&db.len()).then_with(|| da.cmp(db));
            if ord != Ordering::Equal {
                return ord;
            }
        } else {
            let ord = ab[i].cmp(&bb[j]);
            if ord != Ordering::Equal {
                return ord;
            }
            i += 1;
            j += 1;
        }
    }
    (ab.len() - i).cmp(&(bb.len() - j)).then_with(|| ab.cmp(bb))
}

fn trim_zeros(digits: &[u8]) -> &[u8] {
    let first = digits.iter().position(|&d| d != b'0').unwrap_or(digits.len());
    &digits[first..]
}

/// [`natural_cmp`] over the lossy string form of two paths.
pub fn natural_cmp_paths(a: &Path, b: &Path) -> Ordering {
    natural_cmp(&a.to_string_lossy(), &b.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_name() {
        assert_eq!(flatten_name(Path::new("ch1/01.jpg")).as_deref(), Some("ch1_01.jpg"));
        assert_eq!(flatten_name(Path::new("01.jpg")).as_deref(), Some("01.jpg"));
        assert_eq!(
            flatten_name(Path::new("../../etc/passwd")).as_deref(),
            Some("etc_passwd")
        );
        assert_eq!(flatten_name(Path::new("/")), None);
    }

    #[test]
    fn test_unique_path() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(unique_path(dir.path(), "a.jpg"), dir.path().join("a.jpg"));
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        assert_eq!(unique_path(dir.path(), "a.jpg"), dir.path().join("a~1.jpg"));
        fs::write(dir.path().join("a~1.jpg"), b"x").unwrap();
        assert_eq!(unique_path(dir.path(), "a.jpg"), dir.path().join("a~2.jpg"));
    }

    #[test]
    fn test_natural_cmp() {
        let mut names = vec!["p10.jpg", "p2.jpg", "p1.jpg", "cover.jpg", "p02.jpg"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["cover.jpg", "p1.jpg", "p02.jpg", "p2.jpg", "p10.jpg"]);
        assert_eq!(natural_cmp("a", "a"), Ordering::Equal);
        assert_eq!(natural_cmp("a", "ab"), Ordering::Less);
        assert_eq!(natural_cmp("img-999", "img-1000"), Ordering::Less);
    }

    #[test]
    fn test_flatten_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("ch1")).unwrap();
        fs::create_dir_all(root.join("ch2/extra")).unwrap();
        fs::write(root.join("cover.jpg"), b"c").unwrap();
        fs::write(root.join("ch1/01.jpg"), b"1").unwrap();
        fs::write(root.join("ch2/01.jpg"), b"2").unwrap();
        fs::write(root.join("ch2/extra/notes.txt"), b"n").unwrap();

        let mut files: Vec<String> = flatten_tree(root)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        files.sort();
        assert_eq!(
            files,
            vec!["ch1_01.jpg", "ch2_01.jpg", "ch2_extra_notes.txt", "cover.jpg"]
        );
        assert!(!root.join("ch1").exists());
        assert!(!root.join("ch2").exists());
        assert_eq!(fs::read(root.join("ch2_01.jpg")).unwrap(), b"2");
    }

    #[test]
    fn test_list_files_skips_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.bin"), b"a").unwrap();
        let files = list_files(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("a.bin")]);
    }
}
