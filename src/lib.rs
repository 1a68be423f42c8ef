//! Dotted key path access into nested sequence/mapping trees, plus the small
//! service bootstraps (logging, metrics, service metadata) that sit around it.
pub mod access;
pub mod cli;
pub mod config;
pub mod error;
pub mod keypath;
pub mod logging;
pub mod metadata;
pub mod metrics;
pub mod path_de;
pub mod value;

pub use access::{Accessor, KeyPathAccess};
pub use config::{AccessPolicy, MissingPolicy};
pub use error::{KeyPathError, Result};
pub use keypath::{KeyPath, Segment};
pub use value::{Kind, Mapping, Scalar, Value};
