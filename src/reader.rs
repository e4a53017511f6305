use crate::cursor::Cursor;
use byteorder::{BigEndian, ByteOrder};
use std::ops::Range;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("read of {len} bytes at offset {offset} leaves range {start}..{end}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        start: usize,
        end: usize,
    },
}

pub type Result<T> = std::result::Result<T, FieldError>;

/// Big-endian field decoders over one box's byte range.
///
/// Each read starts at the cursor and moves it forward by the width of the
/// field. Widths the format does not define decode to `None`, but the cursor
/// still advances by `bits / 8` so later fields stay aligned.
pub struct FieldReader<'a, 'c> {
    data: &'a [u8],
    range: Range<usize>,
    cursor: &'c mut Cursor,
}

impl<'a, 'c> FieldReader<'a, 'c> {
    /// `range` is the absolute byte range of the box being decoded.
    pub fn new(data: &'a [u8], range: Range<usize>, cursor: &'c mut Cursor) -> Self {
        Self { data, range, cursor }
    }

    pub fn position(&self) -> usize {
        self.cursor.offset()
    }

    /// Bytes left between the cursor and the end of the range.
    pub fn remaining(&self) -> usize {
        self.range.end.saturating_sub(self.cursor.offset())
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let offset = self.cursor.offset();
        let end = offset
            .checked_add(len)
            .filter(|&end| {
                offset >= self.range.start && end <= self.range.end && end <= self.data.len()
            })
            .ok_or(FieldError::OutOfBounds {
                offset,
                len,
                start: self.range.start,
                end: self.range.end,
            })?;
        self.cursor.advance(len);
        Ok(&self.data[offset..end])
    }

    fn skip_bits(&mut self, bits: u32) {
        self.cursor.advance((bits >> 3) as usize);
    }

    pub fn read_uint(&mut self, bits: u32) -> Result<Option<u64>> {
        let v = match bits {
            8 => self.take(1)?[0] as u64,
            16 => BigEndian::read_u16(self.take(2)?) as u64,
            24 => BigEndian::read_u24(self.take(3)?) as u64,
            32 => BigEndian::read_u32(self.take(4)?) as u64,
            64 => BigEndian::read_u64(self.take(8)?),
            _ => {
                self.skip_bits(bits);
                return Ok(None);
            }
        };
        Ok(Some(v))
    }

    /// Signed integers. 24-bit signed fields are not supported.
    pub fn read_int(&mut self, bits: u32) -> Result<Option<i64>> {
        let v = match bits {
            8 => self.take(1)?[0] as i8 as i64,
            16 => BigEndian::read_i16(self.take(2)?) as i64,
            32 => BigEndian::read_i32(self.take(4)?) as i64,
            64 => BigEndian::read_i64(self.take(8)?),
            _ => {
                self.skip_bits(bits);
                return Ok(None);
            }
        };
        Ok(Some(v))
    }

    /// Fixed-point number made of an integer half and a fractional half,
    /// each `bits / 2` wide (e.g. 16.16 for `bits == 32`).
    pub fn read_fixed(&mut self, bits: u32) -> Result<Option<f64>> {
        let half = bits / 2;
        let int = self.read_uint(half)?;
        let frac = self.read_uint(half)?;
        Ok(match (int, frac) {
            (Some(i), Some(f)) => Some(i as f64 + f as f64 / 2f64.powi(half as i32)),
            _ => None,
        })
    }

    /// Exactly `len` bytes, one character per byte.
    pub fn read_string(&mut self, len: usize) -> Result<String> {
        Ok(self.take(len)?.iter().map(|&b| b as char).collect())
    }

    /// Characters up to a NUL byte or the end of the range. The NUL is
    /// consumed but not returned.
    pub fn read_terminated_string(&mut self) -> Result<String> {
        let mut s = String::new();
        while self.cursor.offset() < self.range.end {
            let c = self.take(1)?[0];
            if c == 0 {
                break;
            }
            s.push(c as char);
        }
        Ok(s)
    }

    /// `len` bytes, or everything left in the range when `len` is `None`.
    /// Returns `None` when that comes to zero bytes.
    pub fn read_data(&mut self, len: Option<usize>) -> Result<Option<&'a [u8]>> {
        let len = len.unwrap_or_else(|| self.remaining());
        if len == 0 {
            return Ok(None);
        }
        self.take(len).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader<'a, 'c>(data: &'a [u8], cursor: &'c mut Cursor) -> FieldReader<'a, 'c> {
        FieldReader::new(data, 0..data.len(), cursor)
    }

    #[test]
    fn uint_widths() {
        let data = [
            0x01, // u8
            0x02, 0x03, // u16
            0x04, 0x05, 0x06, // u24
            0x00, 0x00, 0x01, 0x00, // u32
            0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, // u64
        ];
        let mut c = Cursor::default();
        let mut r = reader(&data, &mut c);
        assert_eq!(r.read_uint(8).unwrap(), Some(1));
        assert_eq!(r.read_uint(16).unwrap(), Some(0x0203));
        assert_eq!(r.read_uint(24).unwrap(), Some(0x040506));
        assert_eq!(r.read_uint(32).unwrap(), Some(256));
        assert_eq!(r.read_uint(64).unwrap(), Some((1u64 << 32) + 2));
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn uint64_beyond_double_precision_is_exact() {
        let v: u64 = (1 << 60) + 1;
        let data = v.to_be_bytes();
        let mut c = Cursor::default();
        assert_eq!(reader(&data, &mut c).read_uint(64).unwrap(), Some(v));
    }

    #[test]
    fn int_widths_are_sign_extended() {
        let data = [0xff, 0xff, 0xfe, 0xff, 0xff, 0xff, 0xfd];
        let mut c = Cursor::default();
        let mut r = reader(&data, &mut c);
        assert_eq!(r.read_int(8).unwrap(), Some(-1));
        assert_eq!(r.read_int(16).unwrap(), Some(-2));
        assert_eq!(r.read_int(32).unwrap(), Some(-3));
    }

    #[test]
    fn int64_negative() {
        let data = (-5i64).to_be_bytes();
        let mut c = Cursor::default();
        assert_eq!(reader(&data, &mut c).read_int(64).unwrap(), Some(-5));
    }

    #[test]
    fn unsupported_width_still_advances() {
        let data = [0u8; 8];
        let mut c = Cursor::default();
        {
            let mut r = reader(&data, &mut c);
            assert_eq!(r.read_int(24).unwrap(), None);
            assert_eq!(r.read_uint(12).unwrap(), None);
        }
        assert_eq!(c.offset(), 4);
    }

    #[test]
    fn fixed_point_16_16() {
        // 1.5
        let data = [0x00, 0x01, 0x80, 0x00];
        let mut c = Cursor::default();
        assert_eq!(reader(&data, &mut c).read_fixed(32).unwrap(), Some(1.5));
        assert_eq!(c.offset(), 4);
    }

    #[test]
    fn fixed_point_8_8() {
        let data = [0x02, 0x40];
        let mut c = Cursor::default();
        assert_eq!(reader(&data, &mut c).read_fixed(16).unwrap(), Some(2.25));
    }

    #[test]
    fn strings() {
        let data = b"isomab\0cd";
        let mut c = Cursor::default();
        let mut r = reader(data, &mut c);
        assert_eq!(r.read_string(4).unwrap(), "isom");
        assert_eq!(r.read_terminated_string().unwrap(), "ab");
        assert_eq!(r.position(), 7);
        // runs into the end of the range without a terminator
        assert_eq!(r.read_terminated_string().unwrap(), "cd");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn terminated_string_stops_at_range_end() {
        let data = b"abcdef";
        let mut c = Cursor::default();
        let mut r = FieldReader::new(data, 0..3, &mut c);
        assert_eq!(r.read_terminated_string().unwrap(), "abc");
    }

    #[test]
    fn data_spans_are_views() {
        let data = [1u8, 2, 3, 4, 5];
        let mut c = Cursor::new(1);
        let mut r = reader(&data, &mut c);
        let two = r.read_data(Some(2)).unwrap().unwrap();
        assert_eq!(two, &[2, 3]);
        assert_eq!(two.as_ptr(), data[1..].as_ptr());
        assert_eq!(r.read_data(None).unwrap(), Some(&[4u8, 5][..]));
        assert_eq!(r.read_data(None).unwrap(), None);
        assert_eq!(r.read_data(Some(0)).unwrap(), None);
    }

    #[test]
    fn reads_past_range_fail() {
        let data = [0u8; 8];
        let mut c = Cursor::new(2);
        let mut r = FieldReader::new(&data, 0..4, &mut c);
        let err = r.read_uint(32).unwrap_err();
        assert_eq!(
            err,
            FieldError::OutOfBounds {
                offset: 2,
                len: 4,
                start: 0,
                end: 4
            }
        );
        // failed read leaves the cursor alone
        assert_eq!(r.position(), 2);
    }
}
