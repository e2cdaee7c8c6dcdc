//! Module to build the static Huffman tree and derive the prefix codes.
//! This is used by the `static_huff` module.
//!
//! The tree is an owned recursive structure, every internal node owns exactly
//! two children.  The merge order is fully determined by (frequency, sequence),
//! where the sequence number is assigned as nodes are created: leaves first in
//! ascending symbol order, then each merged node in turn.  When two nodes are
//! merged, the lighter one (first out of the heap) becomes the right branch.
//! As a result the same input always produces the same tree.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::io::Read;
use bit_vec::BitVec;
use super::frequency::{FrequencyTable,NUM_SYMBOLS};
use super::bit_stream::BitReader;

/// Node of the code tree.  The frequency is only meaningful while
/// the tree is being built, trees restored from a file carry 0.
#[derive(Clone,Debug)]
pub enum Node {
    Leaf {
        value: u8,
        freq: u64
    },
    Internal {
        left: Box<Node>,
        right: Box<Node>,
        freq: u64
    }
}

impl Node {
    pub fn leaf(value: u8) -> Self {
        Self::Leaf { value, freq: 0 }
    }
    /// join two subtrees, frequency is the sum of the children
    pub fn internal(left: Node, right: Node) -> Self {
        let freq = left.freq() + right.freq();
        Self::Internal {
            left: Box::new(left),
            right: Box::new(right),
            freq
        }
    }
    pub fn freq(&self) -> u64 {
        match self {
            Self::Leaf { freq, .. } => *freq,
            Self::Internal { freq, .. } => *freq
        }
    }
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Internal { left, right, .. } => left.leaf_count() + right.leaf_count()
        }
    }
    pub fn internal_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Internal { left, right, .. } => 1 + left.internal_count() + right.internal_count()
        }
    }
}

/// Structural equality, the construction frequency is ignored.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self,other) {
            (Self::Leaf { value: a, .. }, Self::Leaf { value: b, .. }) => a == b,
            (Self::Internal { left: l1, right: r1, .. }, Self::Internal { left: l2, right: r2, .. }) => l1 == l2 && r1 == r2,
            _ => false
        }
    }
}

impl Eq for Node {}

/// Heap entry, ordered so that `BinaryHeap` pops the smallest (freq,seq) first.
struct Pending {
    node: Node,
    seq: usize
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        other.node.freq().cmp(&self.node.freq()).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.node.freq() == other.node.freq() && self.seq == other.seq
    }
}

impl Eq for Pending {}

/// Map from symbols to codes, only symbols that are present have a code.
#[derive(Clone,Debug)]
pub struct CodeTable {
    codes: Vec<Option<BitVec>>
}

impl CodeTable {
    fn new() -> Self {
        Self {
            codes: vec![None;NUM_SYMBOLS]
        }
    }
    fn set(&mut self,symbol: u8,code: BitVec) {
        log::trace!("code for {}: {:?}",symbol,code);
        self.codes[symbol as usize] = Some(code);
    }
    pub fn get(&self,symbol: u8) -> Option<&BitVec> {
        self.codes[symbol as usize].as_ref()
    }
    /// number of symbols with a code
    pub fn len(&self) -> usize {
        self.codes.iter().filter(|c| c.is_some()).count()
    }
    /// iterate over (symbol,code) in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item=(u8,&BitVec)> + '_ {
        self.codes.iter().enumerate().filter_map(|(s,c)| c.as_ref().map(|code| (s as u8,code)))
    }
}

/// The static Huffman tree
#[derive(Clone,Debug,PartialEq)]
pub struct PrefixTree {
    root: Node
}

impl PrefixTree {
    pub fn from_root(root: Node) -> Self {
        Self { root }
    }
    pub fn root(&self) -> &Node {
        &self.root
    }
    /// Greedy merge of the two lightest nodes until one remains.
    /// Returns `None` if no symbol has a positive count.
    pub fn build(freq: &FrequencyTable) -> Option<Self> {
        let mut heap = BinaryHeap::new();
        let mut seq = 0;
        for (value,count) in freq.present() {
            heap.push(Pending { node: Node::Leaf { value, freq: count }, seq });
            seq += 1;
        }
        while heap.len() > 1 {
            let right = heap.pop()?.node;
            let left = heap.pop()?.node;
            heap.push(Pending { node: Node::internal(left,right), seq });
            seq += 1;
        }
        let root = heap.pop()?.node;
        log::debug!("tree has {} leaves with root frequency {}",root.leaf_count(),root.freq());
        Some(Self { root })
    }
    /// Walk the tree to find the code for every leaf, left is 0 and right is 1.
    /// If the tree is a single leaf, that symbol gets the 1-bit code `0`.
    pub fn code_table(&self) -> CodeTable {
        let mut table = CodeTable::new();
        match &self.root {
            Node::Leaf { value, .. } => table.set(*value,BitVec::from_elem(1,false)),
            root => Self::collect_codes(root,&mut BitVec::new(),&mut table)
        }
        table
    }
    fn collect_codes(node: &Node,prefix: &mut BitVec,table: &mut CodeTable) {
        match node {
            Node::Leaf { value, .. } => table.set(*value,prefix.clone()),
            Node::Internal { left, right, .. } => {
                prefix.push(false);
                Self::collect_codes(left,prefix,table);
                prefix.pop();
                prefix.push(true);
                Self::collect_codes(right,prefix,table);
                prefix.pop();
            }
        }
    }
    /// Descend from the root one bit at a time until a leaf is reached.
    /// A single-leaf tree consumes exactly one (placeholder) bit.
    pub fn decode_symbol<R: Read>(&self,bits: &mut BitReader,reader: &mut R) -> Result<u8,std::io::Error> {
        if let Node::Leaf { value, .. } = &self.root {
            bits.get_bit(reader)?;
            return Ok(*value);
        }
        let mut curs = &self.root;
        loop {
            curs = match curs {
                Node::Internal { left, right, .. } => match bits.get_bit(reader)? {
                    false => left,
                    true => right
                },
                Node::Leaf { value, .. } => return Ok(*value)
            };
        }
    }
}

// *************** TESTS *****************

#[cfg(test)]
fn is_prefix(a: &BitVec,b: &BitVec) -> bool {
    a.len() <= b.len() && a.iter().zip(b.iter()).all(|(x,y)| x==y)
}

#[cfg(test)]
fn assert_prefix_free(table: &CodeTable) {
    for (s1,c1) in table.iter() {
        assert!(c1.len() > 0,"symbol {} has an empty code",s1);
        for (s2,c2) in table.iter() {
            if s1 != s2 {
                assert!(!is_prefix(c1,c2),"code for {} is a prefix of code for {}",s1,s2);
            }
        }
    }
}

#[test]
fn two_symbols() {
    let freq = FrequencyTable::from_slice("AAAB".as_bytes());
    let tree = PrefixTree::build(&freq).expect("no tree");
    assert_eq!(tree.root(),&Node::internal(Node::leaf(b'A'),Node::leaf(b'B')));
    assert_eq!(tree.root().freq(),4);
    let table = tree.code_table();
    assert_eq!(table.len(),2);
    assert_eq!(table.get(b'A'),Some(&BitVec::from_elem(1,false)));
    assert_eq!(table.get(b'B'),Some(&BitVec::from_elem(1,true)));
    assert_eq!(table.get(b'C'),None);
}

#[test]
fn empty_alphabet() {
    let freq = FrequencyTable::from_slice(&[]);
    assert!(PrefixTree::build(&freq).is_none());
}

#[test]
fn single_symbol_gets_placeholder() {
    let freq = FrequencyTable::from_slice(&[0xff;1000]);
    let tree = PrefixTree::build(&freq).expect("no tree");
    assert!(tree.root().is_leaf());
    assert_eq!(tree.root().internal_count(),0);
    let table = tree.code_table();
    assert_eq!(table.len(),1);
    assert_eq!(table.get(0xff),Some(&BitVec::from_elem(1,false)));
}

#[test]
fn node_counts() {
    let all: Vec<u8> = (0..=255).collect();
    let tree = PrefixTree::build(&FrequencyTable::from_slice(&all)).expect("no tree");
    assert_eq!(tree.root().leaf_count(),256);
    assert_eq!(tree.root().internal_count(),255);
    let table = tree.code_table();
    assert_eq!(table.len(),256);
    // uniform counts over a power of 2 give a balanced tree
    for (_,code) in table.iter() {
        assert_eq!(code.len(),8);
    }
    assert_prefix_free(&table);
}

#[test]
fn skewed_codes_are_prefix_free() {
    // Fibonacci counts produce the deepest possible tree
    let mut test_data = Vec::new();
    let (mut a,mut b) = (1,1);
    for sym in 0..20 {
        for _i in 0..a {
            test_data.push(sym as u8);
        }
        (a,b) = (b,a+b);
    }
    let tree = PrefixTree::build(&FrequencyTable::from_slice(&test_data)).expect("no tree");
    let table = tree.code_table();
    assert_eq!(table.len(),20);
    assert_eq!(table.iter().map(|(_,c)| c.len()).max(),Some(19));
    assert_prefix_free(&table);
}

#[test]
fn frequent_symbols_have_short_codes() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let freq = FrequencyTable::from_slice(test_data);
    let table = PrefixTree::build(&freq).expect("no tree").code_table();
    assert_prefix_free(&table);
    for (s1,c1) in table.iter() {
        for (s2,c2) in table.iter() {
            if freq.get(s1) > freq.get(s2) {
                assert!(c1.len() <= c2.len());
            }
        }
    }
}

#[test]
fn build_is_deterministic() {
    let test_data = "abcdefgh abcd ab a".as_bytes();
    let freq = FrequencyTable::from_slice(test_data);
    let t1 = PrefixTree::build(&freq).expect("no tree");
    let t2 = PrefixTree::build(&freq.clone()).expect("no tree");
    assert_eq!(t1,t2);
}

#[test]
fn decode_walks_tree() {
    let tree = PrefixTree::from_root(Node::internal(
        Node::leaf(b'x'),
        Node::internal(Node::leaf(b'y'),Node::leaf(b'z'))
    ));
    // x=0, y=10, z=11, stream is z x y x padded
    let mut src = std::io::Cursor::new(vec![0b11010000]);
    let mut bits = BitReader::new();
    let mut ans = Vec::new();
    for _i in 0..4 {
        ans.push(tree.decode_symbol(&mut bits,&mut src).expect("decode failed"));
    }
    assert_eq!(ans,"zxyx".as_bytes().to_vec());
    assert_eq!(bits.bits_buffered(),2);
}

#[test]
fn decode_single_leaf_consumes_one_bit() {
    let tree = PrefixTree::from_root(Node::leaf(7));
    let mut src = std::io::Cursor::new(vec![0,0]);
    let mut bits = BitReader::new();
    for _i in 0..9 {
        assert_eq!(tree.decode_symbol(&mut bits,&mut src).expect("decode failed"),7);
    }
    assert_eq!(bits.bytes_read(),2);
    assert_eq!(bits.bits_buffered(),7);
}
