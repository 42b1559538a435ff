pub mod append_log;
pub mod row;

pub use append_log::{AppendLog, FileLog, LogError};
pub use row::{format_row, CSV_HEADER};

use log::{info, warn};

use crate::config::RecordingConfig;
use crate::types::SensorSample;

/// Gated CSV recorder over an append-only log
pub struct Recorder<L: AppendLog> {
    log: L,
    armed: bool,
    rows_recorded: u64,
}

impl<L: AppendLog> Recorder<L> {
    /// Prepares the log before any recording can happen.
    ///
    /// Unless `preserve_history` is set, an existing log is deleted and a
    /// fresh header written, so history does not survive a restart.
    pub fn start(mut log: L, config: &RecordingConfig) -> Result<Self, LogError> {
        let keep = config.preserve_history && Self::has_matching_header(&log);

        if keep {
            info!("Continuing existing recording log {}", log.location());
        } else {
            log.reset(CSV_HEADER)?;
            info!("Recording log {} initialised", log.location());
        }

        Ok(Self {
            log,
            armed: config.start_armed,
            rows_recorded: 0,
        })
    }

    fn has_matching_header(log: &L) -> bool {
        match log.read_all() {
            Ok(content) => content.lines().next() == Some(CSV_HEADER),
            Err(_) => false,
        }
    }

    pub fn arm(&mut self) {
        if !self.armed {
            info!("Recording armed");
        }
        self.armed = true;
    }

    pub fn disarm(&mut self) {
        if self.armed {
            info!("Recording disarmed after {} rows", self.rows_recorded);
        }
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn rows_recorded(&self) -> u64 {
        self.rows_recorded
    }

    /// Appends one row. A disarmed recorder writes nothing.
    pub fn record(&mut self, sample: &SensorSample) -> Result<(), LogError> {
        if !self.armed {
            return Ok(());
        }
        let row = format_row(sample);
        match self.log.append(&row) {
            Err(e) if e.is_not_found() => {
                warn!("Recording log {} disappeared, starting it again", self.log.location());
                self.log.reset(CSV_HEADER)?;
                self.log.append(&row)?;
            }
            result => result?,
        }
        self.rows_recorded += 1;
        Ok(())
    }

    /// Raw log content for download
    pub fn contents(&self) -> Result<String, LogError> {
        self.log.read_all().map_err(|e| {
            warn!("Failed to read recording log: {}", e);
            e
        })
    }

    #[cfg(test)]
    pub fn log(&self) -> &L {
        &self.log
    }
}
