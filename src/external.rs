//! Whole-image mutation by an external byte mutator such as radamsa.
//!
//! The tool is run as `<program> <source> [-s <seed>]` and its standard
//! output becomes the mutated image.

use log::*;
use rand::{CryptoRng, RngCore};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};
use crate::image::temp_beside;

pub const DEFAULT_TOOL: &str = "radamsa";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTool {
    pub program: PathBuf,
    /// pass a seed so the run can be replayed
    pub deterministic: bool,
    /// seed to replay; a fresh one is drawn when unset
    pub seed: Option<u64>,
}

impl Default for ExternalTool {
    fn default() -> Self {
        ExternalTool::new(DEFAULT_TOOL)
    }
}

impl ExternalTool {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        ExternalTool {
            program: program.into(),
            deterministic: false,
            seed: None,
        }
    }

    pub fn command(&self, source: &Path, seed: Option<u64>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(source);
        if let Some(seed) = seed {
            cmd.arg("-s").arg(seed.to_string());
        }
        cmd
    }

    /// Run the tool on `source`, writing its output to `output`.
    ///
    /// Returns the seed used, if any.
    pub fn run<R: RngCore + CryptoRng>(
        &self,
        source: &Path,
        output: &Path,
        rng: &mut R,
    ) -> Result<Option<u64>> {
        let seed = match (self.deterministic, self.seed) {
            (_, Some(seed)) => Some(seed),
            (true, None) => Some(rng.next_u64()),
            (false, None) => None,
        };
        if let Some(seed) = seed {
            info!("{:?} seed: {}", self.program, seed);
        }

        // replaced only once the tool succeeded
        let out = temp_beside(output)?;
        let mut cmd = self.command(source, seed);
        debug!("running {:?} {:?}", cmd.get_program(), cmd.get_args().collect::<Vec<_>>());

        let status = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::from(out.reopen()?))
            .status()
            .map_err(|e| Error::MutationFailure(format!("cannot run {:?}: {}", self.program, e)))?;
        if !status.success() {
            return Err(Error::MutationFailure(format!(
                "{:?} exited with {}",
                self.program, status
            )));
        }
        out.persist(output).map_err(|e| e.error)?;
        Ok(seed)
    }
}
