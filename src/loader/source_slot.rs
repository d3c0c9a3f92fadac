use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::loader::CancelFlag;
use crate::utils::line_source::{LineSource, Progress};

enum State {
    Unloaded,
    Loaded(LineSource),
    Closed,
}

/// The line source of a loader together with its life cycle:
/// `Unloaded -> Loaded -> Closed`, where `Closed` is terminal.
/// Progress counters and the cancel flag outlive reloads,
/// so handles taken before `load` keep working.
pub struct SourceSlot {
    state: State,
    progress: Progress,
    cancel: CancelFlag,
}

impl SourceSlot {
    pub fn new() -> Self {
        Self {
            state: State::Unloaded,
            progress: Progress::default(),
            cancel: CancelFlag::default(),
        }
    }

    /// Bind to `path`. A failed load leaves the slot unloaded.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        if let State::Closed = self.state {
            return Err(Error::Closed);
        }

        self.state = State::Unloaded;
        let source = LineSource::open_with_progress(path, self.progress.clone())?;
        debug!(path = %path.display(), "Loaded database file");
        self.state = State::Loaded(source);
        Ok(())
    }

    pub fn source_mut(&mut self) -> Result<&mut LineSource> {
        match &mut self.state {
            State::Loaded(source) => Ok(source),
            State::Unloaded => Err(Error::NotLoaded),
            State::Closed => Err(Error::Closed),
        }
    }

    pub fn reset(&mut self) -> Result<()> {
        self.source_mut()?.reset()
    }

    /// Release the file; later calls are no-ops
    pub fn close(&mut self) {
        if let State::Loaded(source) = &mut self.state {
            source.close();
            debug!(path = %source.path().display(), "Closed database file");
        }
        self.state = State::Closed;
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, State::Loaded(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    pub fn progress(&self) -> Progress {
        self.progress.clone()
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }
}

impl Default for SourceSlot {
    fn default() -> Self {
        Self::new()
    }
}
