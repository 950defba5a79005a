//! Pseudo-terminal process capability.
//!
//! Recording only depends on [`PtySpawner`] and [`PtyHandle`]; the native
//! implementation over `portable-pty` is behind the `pty` feature.

use crate::config::RecordingConfig;
use crate::result::{ReelError, ReelResult};
use std::io::{Read, Write};
use std::path::PathBuf;

/// What to spawn and how the terminal is sized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtySpec {
    pub program: String,
    pub args: Vec<String>,
    pub cols: u16,
    pub rows: u16,
    pub cwd: Option<PathBuf>,
    /// Added on top of the inherited environment; these win
    pub env: Vec<(String, String)>,
}

impl PtySpec {
    /// Build from a normalized recording config
    pub fn from_config(config: &RecordingConfig) -> ReelResult<Self> {
        let command = config
            .command
            .as_deref()
            .ok_or_else(|| ReelError::invalid_config("no command to record"))?;
        let mut words = split_command(command)?.into_iter();
        let program = words
            .next()
            .ok_or_else(|| ReelError::invalid_config("command is empty"))?;
        let (cols, rows) = config.size();
        Ok(Self {
            program,
            args: words.collect(),
            cols,
            rows,
            cwd: config.cwd.as_ref().map(PathBuf::from),
            env: config.env_vars(),
        })
    }
}

/// A running child attached to a pseudo-terminal
pub trait PtyHandle: Send {
    /// Reader for the terminal output; callable once
    fn take_reader(&mut self) -> ReelResult<Box<dyn Read + Send>>;

    /// Writer for the terminal input; callable once
    fn take_writer(&mut self) -> ReelResult<Box<dyn Write + Send>>;

    /// Block until the child exits, returning its exit code
    fn wait(&mut self) -> ReelResult<u32>;

    /// Terminate the child
    fn kill(&mut self) -> ReelResult<()>;
}

/// Spawns processes inside pseudo-terminals
pub trait PtySpawner: Send + Sync {
    fn spawn(&self, spec: &PtySpec) -> ReelResult<Box<dyn PtyHandle>>;
}

/// Split a command line into words.
///
/// Whitespace separates words. Single quotes are literal, double quotes allow
/// `\"` and `\\`, and a backslash outside quotes escapes the next character.
pub fn split_command(command: &str) -> ReelResult<Vec<String>> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Quote {
        None,
        Single,
        Double,
    }

    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote = Quote::None;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Quote::None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (Quote::None, '\'') => {
                quote = Quote::Single;
                in_word = true;
            }
            (Quote::None, '"') => {
                quote = Quote::Double;
                in_word = true;
            }
            (Quote::None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_word = true;
            }
            (Quote::Single, '\'') | (Quote::Double, '"') => quote = Quote::None,
            (Quote::Double, '\\') => match chars.next() {
                Some(next @ ('"' | '\\')) => current.push(next),
                Some(next) => {
                    current.push('\\');
                    current.push(next);
                }
                None => current.push('\\'),
            },
            (_, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote != Quote::None {
        return Err(ReelError::invalid_config(format!(
            "unterminated quote in command `{command}`"
        )));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(feature = "pty")]
pub use native::NativePtySpawner;

#[cfg(feature = "pty")]
mod native {
    use super::{PtyHandle, PtySpawner, PtySpec};
    use crate::result::{ReelError, ReelResult};
    use portable_pty::{Child, ChildKiller, CommandBuilder, MasterPty, NativePtySystem, PtySize, PtySystem};
    use std::io::{Read, Write};
    use tracing::debug;

    /// Spawner over the platform pseudo-terminal
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NativePtySpawner;

    struct NativePty {
        master: Box<dyn MasterPty + Send>,
        child: Box<dyn Child + Send + Sync>,
    }

    impl std::fmt::Debug for NativePty {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("NativePty")
                .field("pid", &self.child.process_id())
                .finish_non_exhaustive()
        }
    }

    impl PtySpawner for NativePtySpawner {
        fn spawn(&self, spec: &PtySpec) -> ReelResult<Box<dyn PtyHandle>> {
            let pair = NativePtySystem::default()
                .openpty(PtySize {
                    rows: spec.rows,
                    cols: spec.cols,
                    pixel_width: 0,
                    pixel_height: 0,
                })
                .map_err(|e| ReelError::spawn(format!("Failed to open PTY: {e}")))?;

            let mut cmd = CommandBuilder::new(&spec.program);
            cmd.args(&spec.args);
            if let Some(cwd) = &spec.cwd {
                cmd.cwd(cwd);
            }
            for (key, value) in &spec.env {
                cmd.env(key, value);
            }

            let child = pair
                .slave
                .spawn_command(cmd)
                .map_err(|e| ReelError::spawn(format!("{}: {e}", spec.program)))?;
            // The reader only sees EOF once no slave handle is left open here
            drop(pair.slave);

            debug!(program = %spec.program, pid = ?child.process_id(), "spawned process");
            Ok(Box::new(NativePty {
                master: pair.master,
                child,
            }))
        }
    }

    impl PtyHandle for NativePty {
        fn take_reader(&mut self) -> ReelResult<Box<dyn Read + Send>> {
            self.master
                .try_clone_reader()
                .map_err(|e| ReelError::spawn(format!("Failed to clone PTY reader: {e}")))
        }

        fn take_writer(&mut self) -> ReelResult<Box<dyn Write + Send>> {
            self.master
                .take_writer()
                .map_err(|e| ReelError::spawn(format!("Failed to take PTY writer: {e}")))
        }

        fn wait(&mut self) -> ReelResult<u32> {
            Ok(self.child.wait()?.exit_code())
        }

        fn kill(&mut self) -> ReelResult<()> {
            ChildKiller::kill(&mut *self.child)?;
            Ok(())
        }
    }
}
