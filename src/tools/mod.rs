//! Building blocks shared by the codec, none of these do any file handling.

pub mod frequency;
pub mod prefix_tree;
pub mod tree_codec;
pub mod bit_stream;
