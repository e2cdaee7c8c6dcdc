//! Bit packing for the coded part of the file.
//!
//! Bits are packed MSB first.  The final byte is padded with zeros in its
//! low order bits.  The reader knows nothing about padding, the caller has to
//! stop asking for bits once it has decoded the number of symbols it expects.

use bit_vec::BitVec;
use std::io::{Read,Write};

/// pending bits are written out once this many have accumulated
const FLUSH_BITS: usize = 4096;

/// Packs variable length codes into bytes.
pub struct BitWriter {
    bits: BitVec,
    count: u64
}

/// Unpacks bits from a byte source, one byte at a time as needed.
pub struct BitReader {
    bits: BitVec,
    ptr: usize,
    count: u64
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            bits: BitVec::new(),
            count: 0
        }
    }
    /// Append all the bits of `code`, whole bytes may be written to `writer`.
    pub fn put_code<W: Write>(&mut self,code: &BitVec,writer: &mut W) -> Result<(),std::io::Error> {
        self.bits.extend(code.iter());
        self.count += code.len() as u64;
        if self.bits.len() >= FLUSH_BITS {
            self.write_whole_bytes(writer)?;
        }
        Ok(())
    }
    /// write out every complete byte, keep the leftover bits
    fn write_whole_bytes<W: Write>(&mut self,writer: &mut W) -> Result<(),std::io::Error> {
        let whole = self.bits.len() / 8;
        let bytes = self.bits.to_bytes();
        writer.write_all(&bytes[0..whole])?;
        let mut tail = BitVec::new();
        for i in whole*8..self.bits.len() {
            tail.push(self.bits[i]);
        }
        self.bits = tail;
        Ok(())
    }
    /// Write whatever is pending, a partial byte is padded with zeros.
    pub fn finish<W: Write>(&mut self,writer: &mut W) -> Result<(),std::io::Error> {
        writer.write_all(&self.bits.to_bytes())?;
        self.bits = BitVec::new();
        Ok(())
    }
    /// total bits accepted so far, not counting padding
    pub fn bits_written(&self) -> u64 {
        self.count
    }
}

impl BitReader {
    pub fn new() -> Self {
        Self {
            bits: BitVec::new(),
            ptr: 0,
            count: 0
        }
    }
    /// Get the next bit, reading another byte from `reader` if none are buffered.
    /// Running out of bytes is an `UnexpectedEof` error.
    pub fn get_bit<R: Read>(&mut self,reader: &mut R) -> Result<bool,std::io::Error> {
        match self.bits.get(self.ptr) {
            Some(bit) => {
                self.ptr += 1;
                Ok(bit)
            },
            None => {
                let mut by: [u8;1] = [0];
                reader.read_exact(&mut by)?;
                self.bits = BitVec::from_bytes(&by);
                self.ptr = 0;
                self.count += 1;
                self.get_bit(reader)
            }
        }
    }
    /// bits of the current byte that have not been consumed
    pub fn bits_buffered(&self) -> usize {
        self.bits.len() - self.ptr
    }
    /// bytes pulled from the source so far
    pub fn bytes_read(&self) -> u64 {
        self.count
    }
}

#[cfg(test)]
fn code(s: &str) -> BitVec {
    s.chars().map(|c| c=='1').collect()
}

#[test]
fn padding_works() {
    let mut writer = BitWriter::new();
    let mut ans: Vec<u8> = Vec::new();
    for c in ["0","0","0","1"] {
        writer.put_code(&code(c),&mut ans).expect("write failed");
    }
    writer.finish(&mut ans).expect("write failed");
    assert_eq!(ans,vec![0b00010000]);
    assert_eq!(writer.bits_written(),4);
}

#[test]
fn codes_span_bytes() {
    let mut writer = BitWriter::new();
    let mut ans: Vec<u8> = Vec::new();
    for c in ["101","11110000","1","0011"] {
        writer.put_code(&code(c),&mut ans).expect("write failed");
    }
    writer.finish(&mut ans).expect("write failed");
    assert_eq!(ans,vec![0b10111110,0b00010011]);
    assert_eq!(writer.bits_written(),16);
}

#[test]
fn nothing_to_finish() {
    let mut writer = BitWriter::new();
    let mut ans: Vec<u8> = Vec::new();
    writer.finish(&mut ans).expect("write failed");
    assert!(ans.is_empty());
}

#[test]
fn large_flush_keeps_order() {
    // enough bits to trigger intermediate flushes with a leftover
    let mut writer = BitWriter::new();
    let mut ans: Vec<u8> = Vec::new();
    for _i in 0..3000 {
        writer.put_code(&code("110"),&mut ans).expect("write failed");
    }
    writer.finish(&mut ans).expect("write failed");
    assert_eq!(ans.len(),1125);
    let mut reader = BitReader::new();
    let mut src = std::io::Cursor::new(ans);
    for _i in 0..3000 {
        assert!(reader.get_bit(&mut src).unwrap());
        assert!(reader.get_bit(&mut src).unwrap());
        assert!(!reader.get_bit(&mut src).unwrap());
    }
}

#[test]
fn reader_is_msb_first() {
    let mut reader = BitReader::new();
    let mut src = std::io::Cursor::new(vec![0b10010000,0b01000000]);
    let mut got = Vec::new();
    for _i in 0..10 {
        got.push(reader.get_bit(&mut src).expect("read failed"));
    }
    assert_eq!(got,vec![true,false,false,true,false,false,false,false,false,true]);
    assert_eq!(reader.bits_buffered(),6);
    assert_eq!(reader.bytes_read(),2);
}

#[test]
fn reader_end_of_input() {
    let mut reader = BitReader::new();
    let mut src = std::io::Cursor::new(vec![0xff]);
    for _i in 0..8 {
        assert!(reader.get_bit(&mut src).expect("read failed"));
    }
    assert_eq!(reader.bits_buffered(),0);
    let err = reader.get_bit(&mut src).expect_err("expected end of input");
    assert_eq!(err.kind(),std::io::ErrorKind::UnexpectedEof);
}
