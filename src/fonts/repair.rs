//! Font repair hook.
//!
//! Some embedded programs are broken or use outlines the hasher cannot
//! read. A [`FontRepair`] gets one chance to rewrite such a program before
//! the font is given up on. [`FontForgeRepair`] runs the FontForge
//! executable, which re-generates the font as TrueType.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Rewrites an unreadable font program into a readable one.
pub trait FontRepair {
    /// Return repaired bytes, or `None` when repair is not possible.
    fn repair(&self, data: &[u8]) -> Option<Vec<u8>>;
}

impl<F> FontRepair for F
where
    F: Fn(&[u8]) -> Option<Vec<u8>>,
{
    fn repair(&self, data: &[u8]) -> Option<Vec<u8>> {
        self(data)
    }
}

/// Repair that never succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRepair;

impl FontRepair for NoRepair {
    fn repair(&self, _data: &[u8]) -> Option<Vec<u8>> {
        None
    }
}

const REPAIR_SCRIPT: &str = "Open($1)\nGenerate($2)\nClose()\nQuit()\n";

/// Repair through an external FontForge executable.
#[derive(Debug, Clone)]
pub struct FontForgeRepair {
    executable: PathBuf,
}

impl FontForgeRepair {
    /// Use an explicit executable path.
    pub fn with_executable(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Look for `fontforge` on `PATH`.
    pub fn detect() -> Option<Self> {
        let path = std::env::var_os("PATH")?;
        std::env::split_paths(&path)
            .map(|dir| dir.join("fontforge"))
            .find(|candidate| candidate.is_file())
            .map(Self::with_executable)
    }

    /// Path of the executable used.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Run in a scratch directory that is removed on drop, error paths
    /// included.
    fn run(&self, data: &[u8]) -> io::Result<Option<Vec<u8>>> {
        let workdir = tempfile::Builder::new().prefix("deduff-repair-").tempdir()?;
        self.run_in(workdir.path(), data)
    }

    fn run_in(&self, workdir: &Path, data: &[u8]) -> io::Result<Option<Vec<u8>>> {
        let script = workdir.join("repair.pe");
        let input = workdir.join("input.ttf");
        let output = workdir.join("output.ttf");
        fs::write(&script, REPAIR_SCRIPT)?;
        fs::write(&input, data)?;

        let status = Command::new(&self.executable)
            .arg("-lang=ff")
            .arg("-script")
            .arg(&script)
            .arg(&input)
            .arg(&output)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if !status.success() || !output.exists() {
            log::debug!("FontForge repair failed with {}", status);
            return Ok(None);
        }
        fs::read(&output).map(Some)
    }
}

impl FontRepair for FontForgeRepair {
    fn repair(&self, data: &[u8]) -> Option<Vec<u8>> {
        match self.run(data) {
            Ok(repaired) => repaired,
            Err(e) => {
                log::warn!("FontForge repair could not run: {}", e);
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_repair() {
        assert!(NoRepair.repair(b"abc").is_none());
    }

    #[test]
    fn test_closure_repair() {
        let repair = |data: &[u8]| Some(data.iter().rev().copied().collect::<Vec<u8>>());
        assert_eq!(repair.repair(b"abc"), Some(b"cba".to_vec()));
    }

    #[test]
    fn test_missing_executable_yields_none() {
        let repair = FontForgeRepair::with_executable("/nonexistent/deduff/fontforge");
        assert!(repair.repair(b"data").is_none());
    }

    /// Stand-in executable that records the scratch directory it ran in.
    #[cfg(unix)]
    fn fake_fontforge(dir: &Path, name: &str, record: &Path, action: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let exe = dir.join(name);
        let script = format!(
            "#!/bin/sh\ndirname \"$4\" > '{}'\n{}\n",
            record.display(),
            action
        );
        fs::write(&exe, script).unwrap();
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
        exe
    }

    #[cfg(unix)]
    #[test]
    fn test_scratch_dir_removed_after_repair() {
        let dir = tempfile::TempDir::new().unwrap();
        let ok_record = dir.path().join("ok.txt");
        let failed_record = dir.path().join("failed.txt");
        let ok = fake_fontforge(dir.path(), "ok", &ok_record, "cp \"$4\" \"$5\"");
        let failed = fake_fontforge(dir.path(), "failed", &failed_record, "exit 1");

        let repair = FontForgeRepair::with_executable(ok);
        assert_eq!(repair.repair(b"font bytes"), Some(b"font bytes".to_vec()));
        let workdir = fs::read_to_string(&ok_record).unwrap();
        assert!(!Path::new(workdir.trim()).exists());

        let repair = FontForgeRepair::with_executable(failed);
        assert!(repair.repair(b"font bytes").is_none());
        let workdir = fs::read_to_string(&failed_record).unwrap();
        assert!(!Path::new(workdir.trim()).exists());
    }
}
