//! # Static Huffman Compression
//!
//! This crate compresses and expands files using order-0 Huffman coding with a
//! code tree that is built once from the frequencies of the whole input.
//! The tree is stored in the compressed file, so no side information is needed
//! to expand it.
//!
//! The main entry points are in the `static_huff` module:
//! ```
//! use huffcompressor::static_huff;
//! let compressed = static_huff::compress_slice(b"abracadabra",&static_huff::STD_OPTIONS).expect("compression failed");
//! let expanded = static_huff::expand_slice(&compressed,&static_huff::STD_OPTIONS).expect("expansion failed");
//! assert_eq!(expanded,b"abracadabra".to_vec());
//! ```

mod tools;
pub mod static_huff;

pub type DYNERR = Box<dyn std::error::Error>;
pub type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Codec Errors
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("file format mismatch")]
    FileFormatMismatch,
    #[error("file too large")]
    FileTooLarge,
    #[error("invalid size in header: {0}")]
    InvalidSize(i32),
    #[error("invalid tree format: flag byte {0}")]
    InvalidTreeFlag(u8),
    #[error("invalid tree format: leaf value {0} is not a byte")]
    LeafOutOfRange(u16),
    #[error("invalid tree format: nesting too deep")]
    TreeTooDeep,
    #[error("symbol {0} has no code, was the input modified?")]
    MissingCode(u8)
}
