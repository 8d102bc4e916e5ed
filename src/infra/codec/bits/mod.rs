//! Low-level components dedicated to bit manipulation for CAN payloads.
//! NMEA 2000 packs fields LSB first: bit 0 of a field is the lowest bit of
//! its first byte, and fields seldom align with byte boundaries.
use crate::error::{BitReaderError, BitWriterError};

/// Read `bit_length` bits at `bit_offset`, masking directly inside the
/// byte when the field does not cross a byte boundary.
pub fn read_bits(buffer: &[u8], bit_offset: usize, bit_length: u32) -> Result<u64, BitReaderError> {
    let bit_start = bit_offset % 8;
    if bit_length > 0 && bit_start + bit_length as usize <= 8 {
        let byte = *buffer
            .get(bit_offset / 8)
            .ok_or(BitReaderError::OutOfBounds {
                asked: bit_length as usize,
                available: (buffer.len() * 8).saturating_sub(bit_offset),
            })?;
        let mask = ((1u16 << bit_length) - 1) as u8;
        return Ok(((byte >> bit_start) & mask) as u64);
    }
    BitReader::at(buffer, bit_offset).read_u64(bit_length)
}

/// Write the low `bit_length` bits of `value` at `bit_offset`.
pub fn write_bits(
    buffer: &mut [u8],
    bit_offset: usize,
    value: u64,
    bit_length: u32,
) -> Result<(), BitWriterError> {
    BitWriter::at(buffer, bit_offset).write_u64(value, bit_length)
}

/// Part of a bit window that falls inside a single byte.
struct ByteSpan {
    index: usize,
    shift: usize,
    len: usize,
    mask: u8,
}

impl ByteSpan {
    /// Span starting at absolute bit `position`, at most `left` bits long.
    fn at(position: usize, left: usize) -> Self {
        let shift = position % 8;
        let len = (8 - shift).min(left);
        Self {
            index: position / 8,
            shift,
            len,
            mask: ((1u16 << len) - 1) as u8,
        }
    }
}

/// Reader that extracts bit segments from a `&[u8]`
/// without extra allocation or copies.
pub struct BitReader<'a> {
    /// Shared source buffer (a frame or a reassembled payload).
    buffer: &'a [u8],
    /// Current index expressed as number of bits from the beginning.
    bit_cursor: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at the start of the provided buffer.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::at(buffer, 0)
    }

    /// Create a reader positioned at `bit_cursor`.
    pub fn at(buffer: &'a [u8], bit_cursor: usize) -> Self {
        Self { buffer, bit_cursor }
    }

    pub fn bit_cursor(&self) -> usize {
        self.bit_cursor
    }

    /// Bits left between the cursor and the end of the buffer.
    pub fn remaining_bits(&self) -> usize {
        (self.buffer.len() * 8).saturating_sub(self.bit_cursor)
    }

    /// Move the cursor to an absolute bit position.
    pub fn seek(&mut self, bit_cursor: usize) -> Result<(), BitReaderError> {
        let buffer_len_bits = self.buffer.len() * 8;
        if bit_cursor > buffer_len_bits {
            return Err(BitReaderError::OutOfBounds {
                asked: bit_cursor,
                available: buffer_len_bits,
            });
        }
        self.bit_cursor = bit_cursor;
        Ok(())
    }

    /// Read `num_bits` bits starting at the cursor and return a `u64`.
    /// `num_bits` must stay in the [1, 64] range.
    pub fn read_u64(&mut self, num_bits: u32) -> Result<u64, BitReaderError> {
        if !(1..=64).contains(&num_bits) {
            return Err(BitReaderError::TooLongForType {
                max: 64,
                asked: num_bits,
            });
        }

        let available = self.remaining_bits();
        if num_bits as usize > available {
            return Err(BitReaderError::OutOfBounds {
                asked: num_bits as usize,
                available,
            });
        }

        let num_bits = num_bits as usize;
        let mut value: u64 = 0;
        let mut done = 0;
        while done < num_bits {
            let span = ByteSpan::at(self.bit_cursor + done, num_bits - done);
            let bits = (self.buffer[span.index] >> span.shift) & span.mask;
            value |= (bits as u64) << done;
            done += span.len;
        }
        self.bit_cursor += num_bits;
        Ok(value)
    }

    /// Read `num_bits` bits into bytes, eight bits per byte, whatever the
    /// cursor alignment. The last byte holds the leftover bits.
    pub fn read_bytes(&mut self, num_bits: usize) -> Result<Vec<u8>, BitReaderError> {
        let available = self.remaining_bits();
        if num_bits > available {
            return Err(BitReaderError::OutOfBounds {
                asked: num_bits,
                available,
            });
        }
        if self.bit_cursor % 8 == 0 && num_bits % 8 == 0 {
            return self.read_slice(num_bits / 8).map(<[u8]>::to_vec);
        }
        let mut bytes = Vec::with_capacity(num_bits.div_ceil(8));
        let mut left = num_bits;
        while left > 0 {
            let chunk = left.min(8);
            bytes.push(self.read_u64(chunk as u32)? as u8);
            left -= chunk;
        }
        Ok(bytes)
    }

    /// Return a slice of `len` bytes from the current position.
    /// Cursor must be aligned on an octet boundary.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], BitReaderError> {
        if self.bit_cursor % 8 != 0 {
            return Err(BitReaderError::NonAlignedBit {
                cursor: self.bit_cursor,
            });
        }

        let byte_start = self.bit_cursor / 8;
        let byte_end = byte_start + len;
        if byte_end > self.buffer.len() {
            return Err(BitReaderError::OutOfBounds {
                asked: byte_end,
                available: self.buffer.len(),
            });
        }
        let slice = &self.buffer[byte_start..byte_end];
        self.bit_cursor += len * 8;
        Ok(slice)
    }
}
//==================================================================================BITWRITER

/// Writer able to lay bit segments into a `&mut [u8]` without assuming
/// byte alignment. Bits outside the written window are preserved.
pub struct BitWriter<'a> {
    /// Target buffer (the payload under construction).
    buffer: &'a mut [u8],
    /// Current position expressed in bits.
    bit_cursor: usize,
}

impl<'a> BitWriter<'a> {
    /// Create a writer positioned at the start of the buffer.
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self::at(buffer, 0)
    }

    /// Create a writer positioned at `bit_cursor`.
    pub fn at(buffer: &'a mut [u8], bit_cursor: usize) -> Self {
        Self { buffer, bit_cursor }
    }

    /// Expose the cursor position in bits (useful to derive final length).
    pub fn bit_cursor(&self) -> usize {
        self.bit_cursor
    }

    fn remaining_bits(&self) -> usize {
        (self.buffer.len() * 8).saturating_sub(self.bit_cursor)
    }

    /// Write the low `num_bits` bits of `value`.
    pub fn write_u64(&mut self, value: u64, num_bits: u32) -> Result<(), BitWriterError> {
        if !(1..=64).contains(&num_bits) {
            return Err(BitWriterError::TooLongForType {
                max: 64,
                asked: num_bits,
            });
        }

        let available = self.remaining_bits();
        if num_bits as usize > available {
            return Err(BitWriterError::OutOfBounds {
                asked: num_bits as usize,
                available,
            });
        }

        let num_bits = num_bits as usize;
        let mut rest = value;
        let mut done = 0;
        while done < num_bits {
            let span = ByteSpan::at(self.bit_cursor + done, num_bits - done);
            let target = &mut self.buffer[span.index];
            *target = (*target & !(span.mask << span.shift)) | ((rest as u8 & span.mask) << span.shift);
            rest = rest.checked_shr(span.len as u32).unwrap_or(0);
            done += span.len;
        }
        self.bit_cursor += num_bits;
        Ok(())
    }

    /// Write bytes eight bits at a time, whatever the cursor alignment.
    /// Only the low bits of the last byte are used when `num_bits` is not a
    /// multiple of eight; missing bytes are written as ones.
    pub fn write_bytes(&mut self, bytes: &[u8], num_bits: usize) -> Result<(), BitWriterError> {
        let available = self.remaining_bits();
        if num_bits > available {
            return Err(BitWriterError::OutOfBounds {
                asked: num_bits,
                available,
            });
        }
        let mut left = num_bits;
        let mut source = bytes.iter().copied().chain(std::iter::repeat(0xFF));
        while left > 0 {
            let chunk = left.min(8);
            let byte = source.next().unwrap_or(0xFF);
            self.write_u64(byte as u64, chunk as u32)?;
            left -= chunk;
        }
        Ok(())
    }

    /// Copy an already-aligned byte slice into the buffer.
    pub fn write_slice(&mut self, slice: &[u8]) -> Result<(), BitWriterError> {
        if self.bit_cursor % 8 != 0 {
            return Err(BitWriterError::NonAlignedBit {
                cursor: self.bit_cursor,
            });
        }
        let byte_start = self.bit_cursor / 8;
        let byte_end = byte_start + slice.len();
        if byte_end > self.buffer.len() {
            return Err(BitWriterError::OutOfBounds {
                asked: byte_end,
                available: self.buffer.len(),
            });
        }
        self.buffer[byte_start..byte_end].copy_from_slice(slice);
        self.bit_cursor += slice.len() * 8;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
