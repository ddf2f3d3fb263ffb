#![allow(dead_code)]
//! A stand-in `send_nsca` script that records its arguments and input.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct FakeSendNsca {
    dir: TempDir,
    pub bin: PathBuf,
}

impl FakeSendNsca {
    /// A script that records its input and exits with `exit_code`.
    pub fn exiting_with(exit_code: i32) -> Self {
        Self::with_body(true, &format!("exit {}", exit_code))
    }

    /// A script that exits with `exit_code` without touching stdin.
    pub fn exiting_without_reading(exit_code: i32) -> Self {
        Self::with_body(false, &format!("exit {}", exit_code))
    }

    /// A script that reads its input and then never finishes.
    pub fn hanging() -> Self {
        Self::with_body(true, "sleep 30")
    }

    /// A script that never reads stdin and never finishes.
    pub fn stalled() -> Self {
        Self::with_body(false, "sleep 30")
    }

    fn with_body(reads_input: bool, body: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("send_nsca");
        let args_log = dir.path().join("args.log");
        let input_log = dir.path().join("input.log");
        let read = if reads_input {
            format!("cat >> '{}'\n", input_log.display())
        } else {
            String::new()
        };
        let script = format!(
            "#!/bin/sh\necho \"$@\" >> '{}'\n{}{}\n",
            args_log.display(),
            read,
            body
        );
        fs::write(&bin, script).unwrap();
        fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir, bin }
    }

    /// Everything written to the script's stdin so far.
    pub fn input(&self) -> String {
        fs::read_to_string(self.dir.path().join("input.log")).unwrap_or_default()
    }

    /// One line of arguments per invocation.
    pub fn invocations(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("args.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn remove(&self) {
        fs::remove_file(&self.bin).unwrap();
    }
}
