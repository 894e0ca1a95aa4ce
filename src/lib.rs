//! A coordination-free, time-ordered unique id generator in the style of
//! [Twitter's Snowflake], used to mint primary keys for domain records.
//!
//! Each id is a 63-bit non-negative integer packing a 41-bit millisecond
//! timestamp measured from a fixed epoch, a 10-bit worker id and a 12-bit
//! per-millisecond sequence. Uniqueness across independently deployed
//! instances rests purely on each instance being provisioned a distinct
//! worker id; no datastore round-trip or cross-instance lock is involved.
//!
//! ## Quickstart
//!
//! Add the following to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! snowkey = "0.1"
//! ```
//!
//! Use the library like this:
//!
//! ```
//! use snowkey::IdGenerator;
//!
//! let generator = IdGenerator::builder().worker_id(1).finalize().unwrap();
//! let next_id = generator.next_id().unwrap();
//! println!("{}", next_id);
//! ```
//!
//! The persistence layer typically wants the id rendered with a per-entity
//! tag, ready to assign as a record's primary key:
//!
//! ```
//! use snowkey::IdGenerator;
//!
//! let generator = IdGenerator::new().unwrap();
//! let key = generator.next_key("BO_").unwrap();
//! assert!(key.starts_with("BO_"));
//! ```
//!
//! ## Concurrent use
//!
//! IdGenerator is thread-safe. `clone` it before moving to another thread;
//! clones share the same state and the monotonicity guarantee holds across
//! all of them:
//! ```
//! use snowkey::IdGenerator;
//! use std::thread;
//!
//! let generator = IdGenerator::new().unwrap();
//!
//! let mut children = Vec::new();
//! for _ in 0..10 {
//!     let thread_generator = generator.clone();
//!     children.push(thread::spawn(move || {
//!         println!("{}", thread_generator.next_id().unwrap());
//!     }));
//! }
//!
//! for child in children {
//!     child.join().unwrap();
//! }
//! ```
//!
//! [Twitter's Snowflake]: https://blog.twitter.com/2010/announcing-snowflake
#![doc(html_root_url = "https://docs.rs/snowkey/*")]

mod builder;
mod clock;
mod error;
mod generator;

pub use crate::generator::*;
pub use builder::*;
pub use error::*;
