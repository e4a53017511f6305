use crate::boxes::{FourCC, IsoBox, Walk, select_by_path};
use crate::cursor::Cursor;
use crate::parser::{ParseContext, ParseOptions, Result, parse_boxes};
use log::debug;

/// Root of a parsed box tree.
///
/// Borrows the buffer it was built from; every box and payload in the tree
/// points back into it.
#[derive(Debug, Clone)]
pub struct IsoFile<'a> {
    data: &'a [u8],
    cursor: Cursor,
    boxes: Vec<IsoBox<'a>>,
    incomplete: bool,
    options: ParseOptions,
}

impl<'a> IsoFile<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_options(data, ParseOptions::default())
    }

    pub fn with_options(data: &'a [u8], options: ParseOptions) -> Self {
        Self {
            data,
            cursor: Cursor::default(),
            boxes: Vec::new(),
            incomplete: false,
            options,
        }
    }

    /// Parse the whole buffer from offset 0, replacing any earlier result.
    ///
    /// Truncation is not an error: whatever was read before it is kept and
    /// [`IsoFile::is_incomplete`] reports `true`.
    pub fn parse(&mut self) -> Result<&mut Self> {
        self.cursor.set_offset(0);
        self.boxes.clear();
        self.incomplete = false;

        let mut ctx = ParseContext::new(self.data, self.options);
        let parsed = parse_boxes(&mut ctx, &mut self.cursor, self.data.len());
        self.incomplete = ctx.incomplete;
        self.boxes = parsed?;

        debug!(
            "parsed {} top-level boxes from {} bytes (incomplete: {})",
            self.boxes.len(),
            self.data.len(),
            self.incomplete
        );
        Ok(self)
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn boxes(&self) -> &[IsoBox<'a>] {
        &self.boxes
    }

    pub fn into_boxes(self) -> Vec<IsoBox<'a>> {
        self.boxes
    }

    pub fn is_incomplete(&self) -> bool {
        self.incomplete
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// See [`select_by_path`].
    pub fn find(&self, path: &str) -> Vec<&IsoBox<'a>> {
        select_by_path(&self.boxes, path)
    }

    /// Every box of the given type, in document order.
    pub fn find_all(&self, typ: FourCC) -> Vec<&IsoBox<'a>> {
        self.walk()
            .filter(|(_, b)| b.typ == typ)
            .map(|(_, b)| b)
            .collect()
    }

    pub fn walk(&self) -> Walk<'_, 'a> {
        Walk::new(&self.boxes)
    }
}
