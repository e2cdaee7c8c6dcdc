//! Static Huffman Compression
//!
//! The whole input is scanned once to count symbols, the code tree is built from
//! the counts, and then the input is scanned again to write the codes.
//! The compressed file is laid out as follows:
//! * 4 byte big endian signed integer giving the expanded length
//! * the code tree, see `tools::tree_codec` (absent if the length is 0)
//! * the packed codes, MSB first, the last byte padded with zeros
//!
//! Expansion stops as soon as the expected number of symbols has been produced,
//! so the padding bits are never decoded.

use std::io::{Cursor,Read,Write,Seek,SeekFrom,BufReader,BufWriter};
use crate::tools::frequency::FrequencyTable;
use crate::tools::prefix_tree::PrefixTree;
use crate::tools::tree_codec;
use crate::tools::bit_stream::{BitWriter,BitReader};
use crate::DYNERR;

/// Options controlling compression
#[derive(Clone)]
pub struct Options {
    /// starting position in the input file
    pub in_offset: u64,
    /// starting position in the output file
    pub out_offset: u64,
    /// return error if file is larger, the header cannot go beyond `i32::MAX`
    pub max_file_size: u64
}

pub const STD_OPTIONS: Options = Options {
    in_offset: 0,
    out_offset: 0,
    max_file_size: i32::MAX as u64
};

/// Main compression function.
/// `expanded_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `compressed_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.
pub fn compress<R,W>(expanded_in: &mut R, compressed_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    let mut reader = BufReader::new(expanded_in);
    let mut writer = BufWriter::new(compressed_out);

    let mut expanded_length = reader.seek(SeekFrom::End(0))?;
    if opt.in_offset > expanded_length {
        return Err(Box::new(crate::Error::FileFormatMismatch));
    }
    expanded_length -= opt.in_offset;
    if expanded_length > opt.max_file_size || expanded_length > i32::MAX as u64 {
        return Err(Box::new(crate::Error::FileTooLarge));
    }
    reader.seek(SeekFrom::Start(opt.in_offset))?;
    writer.seek(SeekFrom::Start(opt.out_offset))?;

    log::debug!("counting symbols");
    let freq = FrequencyTable::scan(&mut reader)?;
    writer.write_all(&i32::to_be_bytes(freq.total() as i32))?;
    let tree = match PrefixTree::build(&freq) {
        Some(tree) => tree,
        None => {
            log::debug!("empty input, writing header only");
            writer.flush()?;
            return Ok((expanded_length,writer.stream_position()? - opt.out_offset));
        }
    };
    let codes = tree.code_table();
    tree_codec::write_tree(&tree,&mut writer)?;
    log::debug!("wrote header with {} of {} symbols coded",codes.len(),freq.distinct());

    log::debug!("encoding symbols");
    reader.seek(SeekFrom::Start(opt.in_offset))?;
    let mut bits = BitWriter::new();
    for maybe_byte in reader.by_ref().take(freq.total()).bytes() {
        let byte = maybe_byte?;
        match codes.get(byte) {
            Some(code) => bits.put_code(code,&mut writer)?,
            None => {
                log::error!("symbol {} was not counted",byte);
                return Err(Box::new(crate::Error::MissingCode(byte)));
            }
        }
    }
    bits.finish(&mut writer)?;
    log::debug!("wrote {} bits of code",bits.bits_written());
    writer.flush()?;
    Ok((expanded_length,writer.stream_position()? - opt.out_offset))
}

/// Main decompression function.
/// `compressed_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `expanded_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.
pub fn expand<R,W>(compressed_in: &mut R, expanded_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    let mut reader = BufReader::new(compressed_in);
    let mut writer = BufWriter::new(expanded_out);
    let mut compressed_size = reader.seek(SeekFrom::End(0))?;
    if opt.in_offset > compressed_size {
        return Err(Box::new(crate::Error::FileFormatMismatch));
    }
    compressed_size -= opt.in_offset;
    reader.seek(SeekFrom::Start(opt.in_offset))?;
    writer.seek(SeekFrom::Start(opt.out_offset))?;

    let mut header: [u8;4] = [0;4];
    reader.read_exact(&mut header)?;
    let textsize = i32::from_be_bytes(header);
    if textsize < 0 {
        log::error!("header has negative size {}",textsize);
        return Err(Box::new(crate::Error::InvalidSize(textsize)));
    }
    if textsize == 0 {
        log::debug!("empty file, nothing to expand");
        writer.flush()?;
        return Ok((compressed_size,0));
    }
    log::debug!("reading tree");
    let tree = tree_codec::read_tree(&mut reader)?;
    log::debug!("tree has {} leaves, expanding {} symbols",tree.root().leaf_count(),textsize);
    let mut bits = BitReader::new();
    let mut buf: Vec<u8> = Vec::with_capacity(4096);
    for _i in 0..textsize {
        buf.push(tree.decode_symbol(&mut bits,&mut reader)?);
        if buf.len() == buf.capacity() {
            writer.write_all(&buf)?;
            buf.clear();
        }
    }
    writer.write_all(&buf)?;
    log::debug!("consumed {} bytes of code, {} padding bits left",bits.bytes_read(),bits.bits_buffered());
    writer.flush()?;
    Ok((compressed_size,writer.stream_position()? - opt.out_offset))
}

/// Convenience function, calls `compress` with a slice returning a Vec
pub fn compress_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    compress(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}

/// Convenience function, calls `expand` with a slice returning a Vec
pub fn expand_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    expand(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}

// *************** TESTS *****************

#[test]
fn compression_works() {
    let test_data = "AAAB".as_bytes();
    let huff_str = "00 00 00 04 00 01 00 41 01 00 42 10";
    let compressed = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    assert_eq!(compressed,hex::decode(huff_str.replace(" ","")).unwrap());

    // ties between b and c go to the lower symbol on the right,
    // so a=0, c=10, b=11, stream is 0 11 10 0 0 padded
    let test_data = "abcaa".as_bytes();
    let huff_str = "00 00 00 05 00 01 00 61 00 01 00 63 01 00 62 70";
    let compressed = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    assert_eq!(compressed,hex::decode(huff_str.replace(" ","")).unwrap());
}

#[test]
fn empty_input() {
    let compressed = compress_slice(&[],&STD_OPTIONS).expect("compression failed");
    assert_eq!(compressed,vec![0,0,0,0]);
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert!(expanded.is_empty());
}

#[test]
fn single_symbol() {
    let test_data = vec![0xff;1000];
    let compressed = compress_slice(&test_data,&STD_OPTIONS).expect("compression failed");
    // header, one leaf, 1000 zero bits
    assert_eq!(compressed[0..7],[0x00,0x00,0x03,0xe8,0x01,0x00,0xff]);
    assert_eq!(compressed.len(),7 + 125);
    assert!(compressed[7..].iter().all(|b| *b==0));
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(expanded,test_data);
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);

    let test_data = "1234567".as_bytes();
    let compressed = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);
}

#[test]
fn invertibility_all_symbols() {
    let test_data: Vec<u8> = (0..=255).collect();
    let compressed = compress_slice(&test_data,&STD_OPTIONS).expect("compression failed");
    // 256 leaves at 3 bytes, 255 internal nodes at 1 byte, 256 codes of 8 bits
    assert_eq!(compressed.len(),4 + 768 + 255 + 256);
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn invertibility_large() {
    // skewed distribution, long enough to flush the bit writer many times
    let test_data: Vec<u8> = (0..100000u64).map(|i| ((i*i) % 97 % 23) as u8 ^ (i % 3) as u8).collect();
    let compressed = compress_slice(&test_data,&STD_OPTIONS).expect("compression failed");
    assert!(compressed.len() < test_data.len());
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn deterministic_output() {
    let test_data = "the quick brown fox jumps over the lazy dog".as_bytes();
    let c1 = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    let c2 = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    assert_eq!(c1,c2);
}

#[test]
fn size_field_controls_output() {
    // padding bits would decode as 'A' if expansion did not stop at the size
    let compressed = compress_slice("AAAB".as_bytes(),&STD_OPTIONS).expect("compression failed");
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(expanded.len(),4);
    // trailing garbage after the padded byte is not touched
    let mut extended = compressed.clone();
    extended.extend_from_slice(&[0xde,0xad]);
    let expanded = expand_slice(&extended,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(expanded,"AAAB".as_bytes().to_vec());
}

#[test]
fn offsets_work() {
    let mut opt = STD_OPTIONS;
    opt.in_offset = 3;
    opt.out_offset = 2;
    let test_data = "XYZabracadabra".as_bytes();
    let mut src = Cursor::new(test_data);
    let mut dst: Cursor<Vec<u8>> = Cursor::new(vec![0xee,0xee]);
    let (in_size,out_size) = compress(&mut src,&mut dst,&opt).expect("compression failed");
    assert_eq!(in_size,11);
    let compressed = dst.into_inner();
    assert_eq!(compressed[0..2],[0xee,0xee]);
    assert_eq!(out_size,compressed.len() as u64 - 2);
    assert_eq!(compressed[2..],compress_slice("abracadabra".as_bytes(),&STD_OPTIONS).unwrap()[..]);

    let mut opt = STD_OPTIONS;
    opt.in_offset = 2;
    let expanded = expand_slice(&compressed,&opt).expect("expansion failed");
    assert_eq!(expanded,"abracadabra".as_bytes().to_vec());

    opt.in_offset = 1000;
    assert!(expand_slice(&compressed,&opt).is_err());
}

#[test]
fn file_too_large() {
    let mut opt = STD_OPTIONS;
    opt.max_file_size = 10;
    let err = compress_slice(&[0;11],&opt).expect_err("large file accepted");
    assert!(matches!(err.downcast_ref::<crate::Error>(),Some(crate::Error::FileTooLarge)));
}

#[test]
fn negative_size() {
    let err = expand_slice(&[0xff,0xff,0xff,0xff,1,0,0],&STD_OPTIONS).expect_err("negative size accepted");
    assert!(matches!(err.downcast_ref::<crate::Error>(),Some(crate::Error::InvalidSize(-1))));
}

#[test]
fn corrupt_tree() {
    let mut compressed = compress_slice("AAAB".as_bytes(),&STD_OPTIONS).expect("compression failed");
    compressed[4] = 5;
    let err = expand_slice(&compressed,&STD_OPTIONS).expect_err("bad flag accepted");
    assert!(matches!(err.downcast_ref::<crate::Error>(),Some(crate::Error::InvalidTreeFlag(5))));
}

#[test]
fn truncated_stream() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    let err = expand_slice(&compressed[0..compressed.len()-2],&STD_OPTIONS).expect_err("truncation accepted");
    let io_err = err.downcast_ref::<std::io::Error>().expect("not an I/O error");
    assert_eq!(io_err.kind(),std::io::ErrorKind::UnexpectedEof);
}
