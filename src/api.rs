use crate::{
    boxes::{IsoBox, NodeKind},
    error::Error,
    file::IsoFile,
    known_boxes::{KnownBox, MediaHeader, ProducerReferenceTime},
    parser::ParseOptions,
    util::{clamp_range, hex_dump},
};
use serde::Serialize;
use std::path::Path;

/// Leaf payloads longer than this are cut in the JSON preview.
pub const PAYLOAD_PREVIEW_LEN: usize = 32;

/// Parse a fully loaded ISOBMFF/MP4 buffer with default options.
///
/// A truncated buffer is not an error: the returned file reports
/// `is_incomplete()` and keeps every box read before the cut.
///
/// ```
/// let mut data = Vec::new();
/// data.extend_from_slice(&16u32.to_be_bytes());
/// data.extend_from_slice(b"free");
/// data.extend_from_slice(&[0u8; 8]);
///
/// let file = isobox::read_boxes(&data)?;
/// assert_eq!(file.boxes()[0].typ.to_string(), "free");
/// assert!(!file.is_incomplete());
/// # Ok::<(), isobox::Error>(())
/// ```
pub fn read_boxes(data: &[u8]) -> Result<IsoFile<'_>, Error> {
    read_boxes_with(data, ParseOptions::default())
}

pub fn read_boxes_with(data: &[u8], options: ParseOptions) -> Result<IsoFile<'_>, Error> {
    if options.max_depth == 0 {
        return Err(Error::InvalidParameter(
            "max_depth must be at least 1".to_string(),
        ));
    }

    let mut file = IsoFile::with_options(data, options);
    file.parse()
        .map_err(|e| Error::InvalidIsoFile(e.to_string()))?;
    Ok(file)
}

/// Load a file into memory and return its box tree in serializable form.
pub fn read_path(path: impl AsRef<Path>, options: ParseOptions) -> Result<JsonFile, Error> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| {
        Error::InvalidParameter(format!("cannot read {}: {}", path.display(), e))
    })?;
    let file = read_boxes_with(&data, options)?;
    Ok(JsonFile::from(&file))
}

/// A JSON-serializable box tree, detached from the parse buffer.
#[derive(Serialize)]
pub struct JsonFile {
    pub incomplete: bool,
    pub boxes: Vec<JsonBox>,
}

impl From<&IsoFile<'_>> for JsonFile {
    fn from(file: &IsoFile<'_>) -> Self {
        Self {
            incomplete: file.is_incomplete(),
            boxes: file.boxes().iter().map(JsonBox::from).collect(),
        }
    }
}

/// A JSON-serializable representation of a single box.
#[derive(Serialize)]
pub struct JsonBox {
    /// Absolute byte offset of the box
    pub offset: u64,
    /// Total size including the header
    pub size: u64,
    /// 8, or 16 with a largesize
    pub header_size: u64,
    pub payload_offset: u64,
    pub payload_size: u64,

    /// Four-character type (e.g. "ftyp", "moov")
    pub typ: String,
    /// "container", "decoded", "leaf" or "truncated"
    pub kind: String,
    /// Human-readable name (e.g. "Media Header Box")
    pub full_name: String,
    pub incomplete: bool,
    /// Header fields in decode order
    pub fields: serde_json::Map<String, serde_json::Value>,
    /// One-line summary for decoded header boxes
    pub decoded: Option<String>,
    /// Hex of the first bytes of a leaf payload
    pub payload_preview: Option<String>,
    pub children: Option<Vec<JsonBox>>,
}

impl From<&IsoBox<'_>> for JsonBox {
    fn from(b: &IsoBox<'_>) -> Self {
        let fields = b
            .fields
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
                )
            })
            .collect();

        let (kind, payload_preview, children) = match &b.kind {
            NodeKind::Container(kids) => (
                "container",
                None,
                Some(kids.iter().map(JsonBox::from).collect()),
            ),
            NodeKind::Decoded => ("decoded", None, None),
            NodeKind::Leaf(data) => (
                "leaf",
                data.map(|d| hex::encode(&d[..d.len().min(PAYLOAD_PREVIEW_LEN)])),
                None,
            ),
            NodeKind::Truncated => ("truncated", None, None),
        };

        JsonBox {
            offset: b.start as u64,
            size: b.size,
            header_size: b.header_size as u64,
            payload_offset: b.payload_offset() as u64,
            payload_size: b.payload_size(),
            typ: b.typ.to_string(),
            kind: kind.to_string(),
            full_name: KnownBox::from(b.typ).full_name().to_string(),
            incomplete: b.incomplete,
            fields,
            decoded: summarize(b),
            payload_preview,
            children,
        }
    }
}

fn summarize(b: &IsoBox<'_>) -> Option<String> {
    if let Some(mdhd) = MediaHeader::from_box(b) {
        return Some(format!(
            "timescale={} duration={} language={}",
            mdhd.timescale,
            mdhd.duration,
            mdhd.language_code()
        ));
    }
    ProducerReferenceTime::from_box(b).map(|prft| {
        format!(
            "track_id={} ntp={:.6} media_time={}",
            prft.reference_track_id,
            prft.ntp_seconds(),
            prft.media_time
        )
    })
}

/// Result of a hex dump operation containing the formatted hex output.
#[derive(Serialize)]
pub struct HexDump {
    /// Starting offset of the dumped data
    pub offset: u64,
    /// Number of bytes actually dumped
    pub length: u64,
    /// Formatted dump with addresses and ASCII column
    pub hex: String,
}

/// Hex-dump up to `max_len` bytes of `data` starting at `offset`.
///
/// Never reads past the end of `data`; the returned length may be smaller
/// than requested, and is zero when `offset` is past the end.
pub fn hex_range(data: &[u8], offset: u64, max_len: u64) -> HexDump {
    let range = clamp_range(data.len(), offset, max_len);
    HexDump {
        offset,
        length: range.len() as u64,
        hex: hex_dump(&data[range], offset),
    }
}
