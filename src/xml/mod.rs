//! XML event layer
//!
//! - `scanner`: memchr-backed byte cursor
//! - `entities`: predefined and numeric entity decoding
//! - `tag`: borrowed start-tag view
//! - `event_scanner`: resumable push scanner and the `ScanHandler` trait

pub mod entities;
pub mod event_scanner;
pub mod scanner;
pub mod tag;

pub use event_scanner::{EventScanner, ScanHandler};
pub use tag::{Attribute, Tag};
