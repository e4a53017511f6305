use crate::fields::Fields;
use std::fmt;
use std::ops::Range;

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let b = s.as_bytes();
        if b.len() == 4 {
            Some(FourCC([b[0], b[1], b[2], b[3]]))
        } else {
            None
        }
    }

    /// Panics unless `b` holds at least four bytes.
    pub(crate) fn from_prefix(b: &[u8]) -> Self {
        FourCC([b[0], b[1], b[2], b[3]])
    }

    pub fn as_str_lossy(&self) -> String {
        self.0
            .iter()
            .map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect()
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind<'a> {
    /// Child boxes, in file order.
    Container(Vec<IsoBox<'a>>),
    /// Header box whose values were decoded into the field map (`mdhd`, `prft`).
    Decoded,
    /// Opaque payload after the header, `None` when the box is empty.
    Leaf(Option<&'a [u8]>),
    /// The declared size runs past the end of the buffer; nothing after the
    /// header was read.
    Truncated,
}

/// One box of the parsed tree.
///
/// All byte spans borrow from the buffer the file was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct IsoBox<'a> {
    /// Absolute offset of the size field.
    pub start: usize,
    /// Resolved length including the header. For a truncated box this is the
    /// length the box declared, which does not fit in the buffer.
    pub size: u64,
    /// 8, or 16 when a largesize follows the type.
    pub header_size: usize,
    pub typ: FourCC,
    pub fields: Fields<'a>,
    pub kind: NodeKind<'a>,
    pub incomplete: bool,
}

impl<'a> IsoBox<'a> {
    /// Offset one past the last byte of the box.
    pub fn end(&self) -> u64 {
        self.start as u64 + self.size
    }

    /// Byte range of the whole box, `None` when it does not fit in the buffer.
    pub fn range(&self) -> Option<Range<usize>> {
        if self.incomplete {
            return None;
        }
        Some(self.start..self.start + self.size as usize)
    }

    pub fn payload_offset(&self) -> usize {
        self.start + self.header_size
    }

    pub fn payload_size(&self) -> u64 {
        self.size.saturating_sub(self.header_size as u64)
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container(_))
    }

    pub fn children(&self) -> &[IsoBox<'a>] {
        match &self.kind {
            NodeKind::Container(kids) => kids,
            _ => &[],
        }
    }

    /// Opaque leaf payload.
    pub fn data(&self) -> Option<&'a [u8]> {
        match self.kind {
            NodeKind::Leaf(data) => data,
            _ => None,
        }
    }

    /// First direct child of the given type.
    pub fn child(&self, typ: FourCC) -> Option<&IsoBox<'a>> {
        self.children().iter().find(|c| c.typ == typ)
    }

    pub fn walk(&self) -> Walk<'_, 'a> {
        Walk::new(std::slice::from_ref(self))
    }
}

/// Depth-first, document-order traversal yielding `(depth, box)`.
pub struct Walk<'b, 'a> {
    stack: Vec<(usize, &'b IsoBox<'a>)>,
}

impl<'b, 'a> Walk<'b, 'a> {
    pub fn new(roots: &'b [IsoBox<'a>]) -> Self {
        Self {
            stack: roots.iter().rev().map(|b| (0, b)).collect(),
        }
    }
}

impl<'b, 'a> Iterator for Walk<'b, 'a> {
    type Item = (usize, &'b IsoBox<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, b) = self.stack.pop()?;
        self.stack
            .extend(b.children().iter().rev().map(|c| (depth + 1, c)));
        Some((depth, b))
    }
}

/// Select boxes by a dotted path such as `moov.trak[1].mdia.mdhd`.
///
/// The first segment matches among `roots`, each later one among the children
/// of the previous matches. `[n]` keeps the n-th match under each parent.
pub fn select_by_path<'b, 'a>(roots: &'b [IsoBox<'a>], path: &str) -> Vec<&'b IsoBox<'a>> {
    let mut current: Vec<&'b IsoBox<'a>> = Vec::new();

    for (depth, seg) in path.split('.').enumerate() {
        let (name, idx) = parse_segment(seg);
        let Some(fourcc) = FourCC::from_str(name) else {
            return Vec::new();
        };

        current = if depth == 0 {
            nth_or_all(roots.iter().filter(|b| b.typ == fourcc).collect(), idx)
        } else {
            current
                .iter()
                .flat_map(|b| {
                    nth_or_all(b.children().iter().filter(|c| c.typ == fourcc).collect(), idx)
                })
                .collect()
        };
        if current.is_empty() {
            break;
        }
    }

    current
}

fn nth_or_all<T: Copy>(matches: Vec<T>, idx: Option<usize>) -> Vec<T> {
    match idx {
        Some(i) => matches.get(i).copied().into_iter().collect(),
        None => matches,
    }
}

fn parse_segment(seg: &str) -> (&str, Option<usize>) {
    match seg.split_once('[') {
        Some((name, index)) => (
            name,
            index.strip_suffix(']').and_then(|i| i.parse().ok()),
        ),
        None => (seg, None),
    }
}
