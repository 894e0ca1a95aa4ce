use crate::IdGenerator;
use crate::clock::{Clock, SystemClock};
use crate::error::Error;
use crate::generator::{
    BIT_LEN_TIME, DEFAULT_EPOCH_MILLIS, Internals, MAX_WORKER_ID, SharedIdGenerator,
    to_epoch_millis,
};
use chrono::prelude::*;
use std::env;
use std::sync::{Arc, Mutex};

/// Environment variable consulted by [`worker_id_from_env`].
///
/// [`worker_id_from_env`]: struct.Builder.html#method.worker_id_from_env
pub const WORKER_ID_ENV: &str = "SNOWKEY_WORKER_ID";

/// A builder for building the [`IdGenerator`].
///
/// [`IdGenerator`]: struct.IdGenerator.html
pub struct Builder {
    start_time: Option<DateTime<Utc>>,
    worker_id: Option<u16>,
    worker_id_from_env: bool,
    clock: Option<Box<dyn Clock>>,
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl Builder {
    /// Construct a new builder for the build of [`IdGenerator`].
    ///
    /// [`IdGenerator`]: struct.IdGenerator.html
    pub fn new() -> Self {
        Self {
            start_time: None,
            worker_id: None,
            worker_id_from_env: false,
            clock: None,
        }
    }

    /// Set the epoch the timestamp field is measured from.
    /// If the time is set later than the current time, `finalize` will fail.
    pub fn start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Set the worker id identifying this instance.
    /// Values outside `0..=1023` make `finalize` fail; each concurrently
    /// running instance must be given a distinct value, which is the only
    /// thing uniqueness across instances rests on.
    pub fn worker_id(mut self, worker_id: u16) -> Self {
        self.worker_id = Some(worker_id);
        self
    }

    /// Read the worker id from the [`WORKER_ID_ENV`] environment variable at
    /// `finalize` time. An unset variable means worker id 0; a value that
    /// does not parse or is outside `0..=1023` makes `finalize` fail.
    /// An explicit [`worker_id`] takes precedence.
    ///
    /// [`worker_id`]: struct.Builder.html#method.worker_id
    pub fn worker_id_from_env(mut self) -> Self {
        self.worker_id_from_env = true;
        self
    }

    /// Replace the system clock with a scripted one.
    #[cfg(test)]
    pub(crate) fn clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Finish building and create an IdGenerator instance.
    /// This method will return an error if the configuration is invalid;
    /// a generator that failed validation must never start.
    pub fn finalize(self) -> Result<IdGenerator, Error> {
        let epoch_millis = if let Some(start_time) = self.start_time {
            let now = Utc::now();
            if start_time > now {
                return Err(Error::StartTimeAheadOfCurrentTime(start_time));
            }
            // The timestamp field is 41 bits wide; an epoch so old that the
            // current delta no longer fits would set the sign bit.
            if now.timestamp_millis() - start_time.timestamp_millis() >= 1 << BIT_LEN_TIME {
                return Err(Error::StartTimeTooFarInPast(start_time));
            }
            to_epoch_millis(start_time)
        } else {
            DEFAULT_EPOCH_MILLIS
        };

        let worker_id = match self.worker_id {
            Some(worker_id) => validate_worker_id(i64::from(worker_id))?,
            None if self.worker_id_from_env => worker_id_from_env()?,
            None => 0,
        };

        let shared = Arc::new(SharedIdGenerator {
            epoch_millis,
            worker_id,
            clock: self.clock.unwrap_or(Box::new(SystemClock)),
            internals: Mutex::new(Internals {
                last_timestamp: -1,
                sequence: 0,
            }),
        });
        Ok(IdGenerator::new_inner(shared))
    }
}

fn validate_worker_id(worker_id: i64) -> Result<u16, Error> {
    if (0..=i64::from(MAX_WORKER_ID)).contains(&worker_id) {
        Ok(worker_id as u16)
    } else {
        Err(Error::InvalidWorkerId(worker_id))
    }
}

fn worker_id_from_env() -> Result<u16, Error> {
    match env::var(WORKER_ID_ENV) {
        Ok(raw) => {
            let worker_id = raw
                .parse::<i64>()
                .map_err(|e| Error::WorkerIdEnvFailed(Box::new(e)))?;
            validate_worker_id(worker_id)
        }
        Err(env::VarError::NotPresent) => Ok(0),
        Err(e) => Err(Error::WorkerIdEnvFailed(Box::new(e))),
    }
}
