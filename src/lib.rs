//! Zero-copy reader for ISO Base Media File Format (MP4/QuickTime family)
//! box trees.
//!
//! The whole file must be in memory. [`read_boxes`] walks it once and returns
//! an [`IsoFile`] whose boxes borrow from the input. A buffer cut short is not
//! an error; it is reported through [`IsoFile::is_incomplete`] and the
//! `incomplete` flag of the box that ran off the end.
//!
//! Every box records `size` and `type` (plus `largesize` when present) in its
//! [`Fields`]. Only `mdhd` and `prft` decode anything beyond that; all other
//! boxes are containers or opaque payloads. The remaining [`FieldValue`]
//! kinds (signed, fixed-point, text, byte spans) are produced by
//! [`reader::FieldReader`] for callers decoding payloads themselves.

pub mod api;
pub mod boxes;
pub mod cursor;
pub mod error;
pub mod fields;
pub mod file;
pub mod known_boxes;
pub mod parser;
pub mod reader;
pub mod util;

pub use api::{HexDump, JsonBox, JsonFile, hex_range, read_boxes, read_boxes_with, read_path};
pub use boxes::{FourCC, IsoBox, NodeKind, select_by_path};
pub use cursor::{Cursor, CursorError};
pub use error::Error;
pub use fields::{FieldValue, Fields};
pub use file::IsoFile;
pub use known_boxes::{KnownBox, MediaHeader, ProducerReferenceTime};
pub use parser::{OpenEnded, ParseError, ParseOptions};
