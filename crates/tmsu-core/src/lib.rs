#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod database;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod locate;
pub mod path;
pub mod schema;
pub mod setting;
pub mod upgrade;
pub mod value;
pub mod version;

pub use database::{Database, Tx};
pub use driver::{BackendKind, Registry, Session};
pub use error::{Error, Result};
pub use path::{has_scheme, Location};
pub use value::{Row, SqlValue};
pub use version::{SchemaVersion, LATEST};
