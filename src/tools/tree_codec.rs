//! Serialization of the code tree.
//!
//! The tree is written in pre-order with no node count or terminator:
//! * internal node: flag byte 0, then the left subtree, then the right subtree
//! * leaf: flag byte 1, then the symbol as a 2-byte big endian value
//!
//! A truncated tree shows up as an `UnexpectedEof` from the reader.

use std::io::{Read,Write};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use super::prefix_tree::{Node,PrefixTree};
use crate::DYNERR;

/// No tree over 256 symbols can nest deeper than this
const MAX_DEPTH: usize = 255;

#[derive(FromPrimitive,Clone,Copy,PartialEq,Debug)]
enum NodeFlag {
    Internal = 0,
    Leaf = 1
}

pub fn write_tree<W: Write>(tree: &PrefixTree,writer: &mut W) -> Result<(),std::io::Error> {
    write_node(tree.root(),writer)
}

fn write_node<W: Write>(node: &Node,writer: &mut W) -> Result<(),std::io::Error> {
    match node {
        Node::Leaf { value, .. } => {
            writer.write_all(&[NodeFlag::Leaf as u8])?;
            writer.write_all(&u16::to_be_bytes(*value as u16))
        },
        Node::Internal { left, right, .. } => {
            writer.write_all(&[NodeFlag::Internal as u8])?;
            write_node(left,writer)?;
            write_node(right,writer)
        }
    }
}

pub fn read_tree<R: Read>(reader: &mut R) -> Result<PrefixTree,DYNERR> {
    Ok(PrefixTree::from_root(read_node(reader,0)?))
}

fn read_node<R: Read>(reader: &mut R,depth: usize) -> Result<Node,DYNERR> {
    let mut flag: [u8;1] = [0];
    reader.read_exact(&mut flag)?;
    match NodeFlag::from_u8(flag[0]) {
        Some(NodeFlag::Leaf) => {
            let mut val: [u8;2] = [0;2];
            reader.read_exact(&mut val)?;
            let value = u16::from_be_bytes(val);
            match u8::try_from(value) {
                Ok(value) => Ok(Node::leaf(value)),
                Err(_) => {
                    log::error!("leaf value {} is out of range",value);
                    Err(Box::new(crate::Error::LeafOutOfRange(value)))
                }
            }
        },
        Some(NodeFlag::Internal) => {
            if depth >= MAX_DEPTH {
                log::error!("tree nesting exceeds {}",MAX_DEPTH);
                return Err(Box::new(crate::Error::TreeTooDeep));
            }
            let left = read_node(reader,depth+1)?;
            let right = read_node(reader,depth+1)?;
            Ok(Node::internal(left,right))
        },
        None => {
            log::error!("bad tree flag {}",flag[0]);
            Err(Box::new(crate::Error::InvalidTreeFlag(flag[0])))
        }
    }
}

// *************** TESTS *****************

#[cfg(test)]
fn serialize(tree: &PrefixTree) -> Vec<u8> {
    let mut ans = Vec::new();
    write_tree(tree,&mut ans).expect("write failed");
    ans
}

#[test]
fn format_works() {
    let tree = PrefixTree::from_root(Node::internal(Node::leaf(b'A'),Node::leaf(b'B')));
    let expected = hex::decode("00 01 0041 01 0042".replace(" ","")).unwrap();
    assert_eq!(serialize(&tree),expected);
    let tree = PrefixTree::from_root(Node::leaf(0xff));
    assert_eq!(serialize(&tree),vec![1,0,0xff]);
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let freq = crate::tools::frequency::FrequencyTable::from_slice(test_data);
    let tree = PrefixTree::build(&freq).expect("no tree");
    let ser = serialize(&tree);
    let restored = read_tree(&mut std::io::Cursor::new(&ser)).expect("read failed");
    assert_eq!(tree,restored);
    assert_eq!(restored.root().freq(),0);
    // 3 bytes per leaf and 1 byte per internal node
    let leaves = tree.root().leaf_count();
    assert_eq!(ser.len(),3*leaves + leaves - 1);
}

#[test]
fn all_symbols() {
    let all: Vec<u8> = (0..=255).rev().collect();
    let freq = crate::tools::frequency::FrequencyTable::from_slice(&all);
    let tree = PrefixTree::build(&freq).expect("no tree");
    let restored = read_tree(&mut std::io::Cursor::new(serialize(&tree))).expect("read failed");
    assert_eq!(tree,restored);
}

#[test]
fn reads_only_the_tree() {
    let dat = vec![0,1,0,7,1,0,9,0xaa,0xbb];
    let mut src = std::io::Cursor::new(&dat);
    let tree = read_tree(&mut src).expect("read failed");
    assert_eq!(tree.root(),&Node::internal(Node::leaf(7),Node::leaf(9)));
    assert_eq!(src.position(),7);
}

#[test]
fn bad_flag() {
    let dat = vec![0,1,0,7,2,0,9];
    let err = read_tree(&mut std::io::Cursor::new(&dat)).expect_err("bad flag accepted");
    assert!(matches!(err.downcast_ref::<crate::Error>(),Some(crate::Error::InvalidTreeFlag(2))));
}

#[test]
fn bad_leaf_value() {
    let dat = vec![1,1,0];
    let err = read_tree(&mut std::io::Cursor::new(&dat)).expect_err("bad leaf accepted");
    assert!(matches!(err.downcast_ref::<crate::Error>(),Some(crate::Error::LeafOutOfRange(256))));
}

#[test]
fn truncated_tree() {
    let dat = vec![0,1,0,7,1,0];
    let err = read_tree(&mut std::io::Cursor::new(&dat)).expect_err("truncation accepted");
    let io_err = err.downcast_ref::<std::io::Error>().expect("not an I/O error");
    assert_eq!(io_err.kind(),std::io::ErrorKind::UnexpectedEof);
}

#[test]
fn runaway_nesting() {
    let dat = vec![0;1000];
    let err = read_tree(&mut std::io::Cursor::new(&dat)).expect_err("deep tree accepted");
    assert!(matches!(err.downcast_ref::<crate::Error>(),Some(crate::Error::TreeTooDeep)));
}
