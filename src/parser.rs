use crate::boxes::{FourCC, IsoBox, NodeKind};
use crate::cursor::{Cursor, CursorError};
use crate::fields::{FieldValue, Fields};
use crate::known_boxes::KnownBox;
use crate::reader::{FieldError, FieldReader};
use log::{debug, trace, warn};

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("invalid box size {size} for '{typ}' at offset {offset}")]
    InvalidSize { offset: usize, typ: FourCC, size: u64 },
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Cursor(#[from] CursorError),
}

pub type Result<T> = std::result::Result<T, ParseError>;

pub const HEADER_SIZE: usize = 8;
pub const LARGE_HEADER_SIZE: usize = 16;

/// Where a box declaring size 0 ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenEnded {
    /// End of the whole buffer, even for a box nested inside a container.
    #[default]
    BufferEnd,
    /// End of the enclosing container (end of the buffer at top level).
    ParentEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Containers nested this deep or deeper are kept as opaque leaves.
    /// Top-level boxes are at depth 0. Must be at least 1.
    pub max_depth: usize,
    pub open_ended: OpenEnded,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            open_ended: OpenEnded::BufferEnd,
        }
    }
}

/// State shared by every box of one parse pass.
pub struct ParseContext<'a> {
    pub data: &'a [u8],
    pub options: ParseOptions,
    /// Set once any box runs past the end of the buffer.
    pub incomplete: bool,
}

impl<'a> ParseContext<'a> {
    pub fn new(data: &'a [u8], options: ParseOptions) -> Self {
        Self {
            data,
            options,
            incomplete: false,
        }
    }
}

impl<'a> IsoBox<'a> {
    /// Parse the box that starts at `parent`'s cursor.
    ///
    /// On return `parent` points past the box. When the box is truncated it
    /// points at `parent_end` instead, so the caller's loop ends there.
    /// Containers come back with an empty child list; their children are
    /// filled in by [`parse_boxes`].
    ///
    /// Returns `None` when the buffer has no room for a box header.
    pub fn parse(
        ctx: &mut ParseContext<'a>,
        parent: &mut Cursor,
        parent_end: usize,
        depth: usize,
    ) -> Result<Option<IsoBox<'a>>> {
        let data = ctx.data;
        let start = parent.offset();

        if data.len().saturating_sub(start) < HEADER_SIZE {
            warn!(
                "{} trailing bytes at offset {} cannot hold a box header",
                data.len().saturating_sub(start),
                start
            );
            ctx.incomplete = true;
            parent.set_offset(parent_end.max(start));
            return Ok(None);
        }

        let mut cursor = Cursor::new(start);
        let mut fields = Fields::new();
        let mut r = FieldReader::new(data, start..data.len(), &mut cursor);

        // 32 and 64 are always supported widths
        let size = r.read_uint(32)?.unwrap_or_default();
        let typ_text = r.read_string(4)?;
        let typ = FourCC::from_prefix(&data[start + 4..]);
        fields.insert("size", FieldValue::UInt(size));
        fields.insert("type", FieldValue::Text(typ_text));

        let mut header_size = HEADER_SIZE;
        let mut declared = size;
        let mut truncated = false;
        if size == 1 {
            if r.remaining() < 8 {
                truncated = true;
            } else {
                let large = r.read_uint(64)?.unwrap_or_default();
                fields.insert("largesize", FieldValue::UInt(large));
                declared = large;
                header_size = LARGE_HEADER_SIZE;
            }
        }

        if size == 0 {
            let end = match ctx.options.open_ended {
                OpenEnded::BufferEnd => data.len(),
                OpenEnded::ParentEnd => parent_end,
            };
            declared = end.saturating_sub(start) as u64;
            // a parent that ends inside this header leaves no room for the box
            if declared < HEADER_SIZE as u64 {
                truncated = true;
            }
        }

        if !truncated && declared < header_size as u64 {
            return Err(ParseError::InvalidSize {
                offset: start,
                typ,
                size: declared,
            });
        }

        let end = (start as u64)
            .checked_add(declared)
            .filter(|&end| end <= data.len() as u64);
        let end = match end {
            Some(end) if !truncated => end,
            _ => {
                warn!(
                    "box '{}' at offset {} declares {} bytes, only {} available",
                    typ,
                    start,
                    declared,
                    data.len() - start
                );
                ctx.incomplete = true;
                parent.set_offset(parent_end.max(start));
                return Ok(Some(IsoBox {
                    start,
                    size: declared,
                    header_size,
                    typ,
                    fields,
                    kind: NodeKind::Truncated,
                    incomplete: true,
                }));
            }
        };
        parent.try_set_offset(end)?;

        debug!(
            "box '{}' at offset {}: {} bytes, header {}, depth {}",
            typ, start, declared, header_size, depth
        );

        let mut r = FieldReader::new(data, start..end as usize, &mut cursor);
        let known = KnownBox::from(typ);
        let kind = if known.is_decoded() {
            match known {
                KnownBox::Mdhd => decode_mdhd(&mut r, &mut fields)?,
                _ => decode_prft(&mut r, &mut fields)?,
            }
            NodeKind::Decoded
        } else if known.is_container() && depth < ctx.options.max_depth {
            NodeKind::Container(Vec::new())
        } else {
            if known.is_container() {
                warn!(
                    "container '{}' at offset {} exceeds depth limit {}, kept as leaf",
                    typ, start, ctx.options.max_depth
                );
            }
            NodeKind::Leaf(r.read_data(None)?)
        };

        Ok(Some(IsoBox {
            start,
            size: declared,
            header_size,
            typ,
            fields,
            kind,
            incomplete: false,
        }))
    }
}

fn put_uint<'a>(
    r: &mut FieldReader<'a, '_>,
    fields: &mut Fields<'a>,
    name: &'static str,
    bits: u32,
) -> Result<Option<u64>> {
    let v = r.read_uint(bits)?;
    if let Some(v) = v {
        fields.insert(name, FieldValue::UInt(v));
    }
    Ok(v)
}

/// version (8) + flags (24); returns the version.
fn full_box_header<'a>(r: &mut FieldReader<'a, '_>, fields: &mut Fields<'a>) -> Result<u64> {
    let version = put_uint(r, fields, "version", 8)?.unwrap_or_default();
    put_uint(r, fields, "flags", 24)?;
    Ok(version)
}

// ISO/IEC 14496-12 8.4.2 Media Header Box
fn decode_mdhd<'a>(r: &mut FieldReader<'a, '_>, fields: &mut Fields<'a>) -> Result<()> {
    let wide = if full_box_header(r, fields)? == 1 { 64 } else { 32 };
    put_uint(r, fields, "creation_time", wide)?;
    put_uint(r, fields, "modification_time", wide)?;
    put_uint(r, fields, "timescale", 32)?;
    put_uint(r, fields, "duration", wide)?;
    put_uint(r, fields, "language", 16)?;
    put_uint(r, fields, "pre_defined", 16)?;
    Ok(())
}

// ISO/IEC 14496-12 8.16.5 Producer Reference Time Box
fn decode_prft<'a>(r: &mut FieldReader<'a, '_>, fields: &mut Fields<'a>) -> Result<()> {
    let wide = if full_box_header(r, fields)? == 1 { 64 } else { 32 };
    put_uint(r, fields, "reference_track_id", 32)?;
    put_uint(r, fields, "ntp_timestamp_sec", 32)?;
    put_uint(r, fields, "ntp_timestamp_frac", 32)?;
    put_uint(r, fields, "media_time", wide)?;
    Ok(())
}

/// A container whose children are still being read.
struct Frame<'a> {
    node: IsoBox<'a>,
    cursor: Cursor,
    end: usize,
    depth: usize,
}

/// Parse boxes from `cursor` up to `end`, descending into containers.
///
/// Descent runs on an explicit stack of open containers rather than the call
/// stack, so hostile nesting cannot overflow it.
pub fn parse_boxes<'a>(
    ctx: &mut ParseContext<'a>,
    cursor: &mut Cursor,
    end: usize,
) -> Result<Vec<IsoBox<'a>>> {
    let mut top = Vec::new();
    let mut stack: Vec<Frame<'a>> = Vec::new();

    loop {
        let (parent, parent_end, depth) = match stack.last_mut() {
            Some(f) => (&mut f.cursor, f.end, f.depth + 1),
            None => (&mut *cursor, end, 0),
        };

        if parent.offset() >= parent_end {
            match stack.pop() {
                Some(frame) => {
                    trace!(
                        "leaving '{}' with {} children",
                        frame.node.typ,
                        frame.node.children().len()
                    );
                    attach(&mut stack, &mut top, frame.node);
                    continue;
                }
                None => break,
            }
        }

        let Some(node) = IsoBox::parse(ctx, parent, parent_end, depth)? else {
            continue;
        };

        if node.is_container() {
            trace!("entering '{}' at depth {}", node.typ, depth);
            let cursor = Cursor::new(node.payload_offset());
            let end = node.end() as usize;
            stack.push(Frame {
                node,
                cursor,
                end,
                depth,
            });
        } else {
            attach(&mut stack, &mut top, node);
        }
    }

    Ok(top)
}

fn attach<'a>(stack: &mut [Frame<'a>], top: &mut Vec<IsoBox<'a>>, node: IsoBox<'a>) {
    match stack.last_mut() {
        Some(Frame {
            node: IsoBox {
                kind: NodeKind::Container(kids),
                ..
            },
            ..
        }) => kids.push(node),
        Some(_) => unreachable!("only containers are pushed on the parse stack"),
        None => top.push(node),
    }
}
