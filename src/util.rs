use std::fmt::Write;
use std::ops::Range;

/// Sixteen bytes per row: address, hex column, then printable ASCII.
/// Addresses start at `start_offset`.
pub fn hex_dump(bytes: &[u8], start_offset: u64) -> String {
    const ROW: usize = 16;
    let mut out = String::with_capacity(bytes.len().div_ceil(ROW) * 78);
    let mut addr = start_offset;
    for row in bytes.chunks(ROW) {
        let _ = write!(out, "{addr:08x}  ");
        for b in row {
            let _ = write!(out, "{b:02x} ");
        }
        // short last row keeps the ASCII column aligned
        out.extend(std::iter::repeat_n(' ', (ROW - row.len()) * 3));
        out.push_str("  |");
        out.extend(row.iter().map(|&c| {
            if c.is_ascii_graphic() || c == b' ' {
                c as char
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
        addr += ROW as u64;
    }
    out
}

/// `offset..offset + max_len`, cut down to fit inside `len` bytes.
pub fn clamp_range(len: usize, offset: u64, max_len: u64) -> Range<usize> {
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(len);
    let take = usize::try_from(max_len).unwrap_or(usize::MAX);
    start..start.saturating_add(take).min(len)
}
