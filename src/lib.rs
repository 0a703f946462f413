//! rdb-decode - stream a Redis RDB dump into JSON lines
//!
//! The dump is framed into one [`InputRecord`] per key by the [`Loader`],
//! decoded in parallel by a pool of workers and flattened into one JSON
//! object per value element, which a single writer appends to the output.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::fs::File;
//! use std::io::{self, BufReader};
//!
//! use rdb_decode::{filter, pipeline, RdbValueDecoder};
//!
//! let file = File::open("dump.rdb")?;
//! let config = pipeline::PipelineConfig {
//!     parallel: 4,
//!     ..Default::default()
//! };
//!
//! let summary = pipeline::run(
//!     BufReader::new(file),
//!     io::stdout(),
//!     filter::Simple::new(),
//!     &RdbValueDecoder,
//!     &config,
//!     pipeline::Stats::new(),
//! )?;
//! eprintln!("{} keys decoded", summary.records);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod constants;
pub mod decoder;
pub mod filter;
pub mod formatter;
pub mod loader;
pub mod pipeline;
pub mod types;

pub use decoder::{decode_value, RdbValueDecoder, ValueDecoder};
pub use loader::Loader;
pub use pipeline::{run, PipelineConfig, Summary};
pub use types::{DecodedValue, InputRecord, RdbError, RdbOk, RdbResult, Type};
