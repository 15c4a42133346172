//! Generates a coverage profile by running `go test`.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::error::{CovriskError, Result};
use crate::model::Profile;
use crate::parsers::gocover;

/// Runs `<program> test -coverprofile=<tmp> <patterns...>` in `root`.
#[derive(Debug, Clone)]
pub struct GoTestRunner {
    pub program: OsString,
    pub root: PathBuf,
    pub patterns: Vec<String>,
}

impl GoTestRunner {
    pub fn new(root: impl Into<PathBuf>, patterns: Vec<String>) -> Self {
        Self {
            program: OsString::from("go"),
            root: root.into(),
            patterns,
        }
    }

    fn command(&self, profile: &Path) -> Command {
        let mut flag = OsString::from("-coverprofile=");
        flag.push(profile);

        let mut cmd = Command::new(&self.program);
        cmd.arg("test")
            .arg(flag)
            .args(&self.patterns)
            .current_dir(&self.root);
        cmd
    }

    /// Spawn the test run with stdout and stderr sharing one pipe, so the
    /// captured text keeps the order in which the child wrote it.
    fn run_combined(&self, profile: &Path) -> Result<(ExitStatus, String)> {
        let (mut reader, writer) = std::io::pipe()?;
        let mut cmd = self.command(profile);
        cmd.stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer);
        let mut child = cmd.spawn()?;
        // The parent's copies of the write end live in `cmd`; the read
        // below only sees EOF once they are closed.
        drop(cmd);

        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        let status = child.wait()?;
        Ok((status, String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Run the tests and parse the resulting profile. The temporary
    /// profile is removed whether or not the run succeeds.
    pub fn run(&self) -> Result<Profile> {
        let tmp = tempfile::Builder::new()
            .prefix("covrisk-")
            .suffix(".out")
            .tempfile()?;

        tracing::info!(
            "Running {} test {} in {}",
            self.program.to_string_lossy(),
            self.patterns.join(" "),
            self.root.display()
        );
        let (status, output) = self.run_combined(tmp.path())?;

        if !status.success() {
            return Err(CovriskError::Subprocess { status, output });
        }

        gocover::parse_file(tmp.path())
    }
}
