//! Installed-game discovery and launching
//!
//! Scans the standard Steam and Epic install roots; each game directory
//! is represented by its largest executable, which in practice is the
//! game binary rather than a crash handler or updater.

use gm_core::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameEntry {
    pub name: String,
    pub path: PathBuf,
    pub platform: &'static str,
}

/// The install roots scanned by default.
pub fn default_roots() -> Vec<(PathBuf, &'static str)> {
    vec![
        (
            PathBuf::from(r"C:\Program Files (x86)\Steam\steamapps\common"),
            "Steam",
        ),
        (
            PathBuf::from(r"C:\Program Files\Steam\steamapps\common"),
            "Steam",
        ),
        (PathBuf::from(r"C:\Program Files\Epic Games"), "Epic"),
        (PathBuf::from(r"C:\Program Files (x86)\Epic Games"), "Epic"),
    ]
}

pub fn scan() -> Vec<GameEntry> {
    scan_roots(&default_roots())
}

/// One entry per game directory under each existing root.
pub fn scan_roots(roots: &[(PathBuf, &'static str)]) -> Vec<GameEntry> {
    let mut games = Vec::new();
    for (root, platform) in roots {
        if !root.is_dir() {
            continue;
        }
        let Ok(entries) = fs::read_dir(root) else {
            continue;
        };
        for entry in entries.flatten() {
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            if let Some(exe) = largest_exe(&dir) {
                games.push(GameEntry {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    path: exe,
                    platform,
                });
            }
        }
    }
    games
}

/// The biggest `.exe` directly inside `dir`, if any.
fn largest_exe(dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut best: Option<(u64, PathBuf)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_exe = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("exe"))
            .unwrap_or(false);
        if !is_exe || !path.is_file() {
            continue;
        }
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if best.as_ref().map(|(s, _)| size > *s).unwrap_or(true) {
            best = Some((size, path));
        }
    }
    best.map(|(_, path)| path)
}

/// Launch an executable, detached.
pub fn launch(path: &str) -> Result<()> {
    if path.is_empty() || !Path::new(path).exists() {
        return Err(Error::bad_request("invalid path"));
    }
    std::process::Command::new(path).spawn()?;
    info!(path, "launched");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(path: &Path, len: usize) {
        let mut f = fs::File::create(path).unwrap();
        f.write_all(&vec![0u8; len]).unwrap();
    }

    #[test]
    fn picks_the_largest_exe_per_game_dir() {
        let root = tempfile::tempdir().unwrap();
        let game = root.path().join("SomeGame");
        fs::create_dir(&game).unwrap();
        write_file(&game.join("launcher.exe"), 100);
        write_file(&game.join("game.exe"), 5000);
        write_file(&game.join("readme.txt"), 9000);

        let games = scan_roots(&[(root.path().to_path_buf(), "Steam")]);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].name, "SomeGame");
        assert_eq!(games[0].path, game.join("game.exe"));
        assert_eq!(games[0].platform, "Steam");
    }

    #[test]
    fn directories_without_exes_are_skipped() {
        let root = tempfile::tempdir().unwrap();
        let empty = root.path().join("Soundtrack");
        fs::create_dir(&empty).unwrap();
        write_file(&empty.join("track.mp3"), 10);

        assert!(scan_roots(&[(root.path().to_path_buf(), "Epic")]).is_empty());
    }

    #[test]
    fn missing_roots_are_ignored() {
        let missing = PathBuf::from("/definitely/not/here");
        assert!(scan_roots(&[(missing, "Steam")]).is_empty());
    }

    #[test]
    fn launch_rejects_a_bad_path() {
        assert!(launch("/definitely/not/here.exe").is_err());
        assert!(launch("").is_err());
    }
}
