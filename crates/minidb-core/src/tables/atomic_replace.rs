//! Crash-safe replacement of a table file.
//!
//! The protocol is always the same:
//! 1. open the current file for streaming reads, if it exists
//! 2. stream the transformed records into a staging file beside it
//! 3. close both handles and rename the staging file over the target
//!
//! The staging file is only ever renamed as the very last step, so the target
//! is always either the complete old file or the complete new file.

use std::fs;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::error::Error;
use crate::tables::wire::{RecordWriter, Records, WireFormat};

/// What to do with the staging file once a transform has finished
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum Staged<T> {
    /// Rename the staging file over the target
    Commit(T),
    /// Throw the staging file away, leaving the target as it was
    Abort(T),
}

/// Replaces a file through a staging file
#[derive(Debug, Clone)]
pub struct AtomicReplace {
    target: PathBuf,
    staging: PathBuf,
    format: WireFormat,
    sync: bool,
}

impl AtomicReplace {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        target: P,
        staging: Q,
        format: WireFormat,
    ) -> Self {
        Self {
            target: target.as_ref().to_path_buf(),
            staging: staging.as_ref().to_path_buf(),
            format,
            sync: false,
        }
    }

    /// Whether to fsync the staging file before it is renamed
    pub fn sync_before_rename(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Runs a transform over the target file.
    ///
    /// The transform receives the records of the current file (`None` if there
    /// is no file yet) and a writer into the staging file. Any error, or a
    /// [`Staged::Abort`], leaves the target untouched and removes the staging file.
    #[instrument(level = "debug", skip_all, fields(target = %self.target.display()), err)]
    pub fn run<T, F>(&self, transform: F) -> Result<T, Error>
    where
        F: FnOnce(Option<Records<File>>, &mut RecordWriter<File>) -> Result<Staged<T>, Error>,
    {
        match self.stage(transform) {
            Ok(Staged::Commit(out)) => {
                if let Err(e) = fs::rename(&self.staging, &self.target) {
                    self.discard();
                    return Err(e.into());
                }
                debug!("replaced {:?} with {:?}", self.target, self.staging);
                Ok(out)
            }
            Ok(Staged::Abort(out)) => {
                debug!("transform of {:?} aborted", self.target);
                self.discard();
                Ok(out)
            }
            Err(e) => {
                self.discard();
                Err(e)
            }
        }
    }

    /// Writes the staging file. Both handles are closed when this returns.
    fn stage<T, F>(&self, transform: F) -> Result<Staged<T>, Error>
    where
        F: FnOnce(Option<Records<File>>, &mut RecordWriter<File>) -> Result<Staged<T>, Error>,
    {
        let source = match File::open(&self.target) {
            Ok(file) => Some(self.format.reader(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        if let Some(parent) = self.staging.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = self.format.writer(File::create(&self.staging)?);
        let staged = transform(source, &mut writer)?;
        if let Staged::Commit(_) = staged {
            let file = writer.finish()?;
            if self.sync {
                file.sync_all()?;
            }
        }
        Ok(staged)
    }

    fn discard(&self) {
        if let Err(e) = fs::remove_file(&self.staging) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("could not remove staging file {:?}: {e}", self.staging);
            }
        }
    }
}
