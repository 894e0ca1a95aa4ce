// Copyright 2023 snowkey contributors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use chrono::{DateTime, Utc};
use std::error::Error as StdError;
use thiserror::Error;

/// Convenience type alias for usage within snowkey.
pub(crate) type BoxDynError = Box<dyn StdError + 'static + Send + Sync>;

/// The error type for this crate.
///
/// Every variant is a construction-time configuration failure except
/// [`MutexPoisoned`], which can only surface if a caller panicked while
/// holding the generator lock.
///
/// [`MutexPoisoned`]: Error::MutexPoisoned
#[derive(Error, Debug)]
pub enum Error {
    #[error("worker_id `{0}` is out of range, must be within 0..=1023")]
    InvalidWorkerId(i64),
    #[error("reading worker_id from the environment failed: {0}")]
    WorkerIdEnvFailed(#[source] BoxDynError),
    #[error("start_time `{0}` is ahead of current time")]
    StartTimeAheadOfCurrentTime(DateTime<Utc>),
    #[error("start_time `{0}` is too far in the past, the current timestamp would not fit in 41 bits")]
    StartTimeTooFarInPast(DateTime<Utc>),
    #[error("mutex is poisoned (i.e. a panic happened while it was locked)")]
    MutexPoisoned,
}
