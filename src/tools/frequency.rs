//! Symbol statistics for the first pass of compression.

use std::io::{Read,ErrorKind};

/// Number of distinct symbols, i.e., byte values
pub const NUM_SYMBOLS: usize = 256;

/// Occurrence count of every byte value, along with the total count.
#[derive(Clone,Debug,PartialEq)]
pub struct FrequencyTable {
    counts: [u64;NUM_SYMBOLS],
    total: u64
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self {
            counts: [0;NUM_SYMBOLS],
            total: 0
        }
    }
    /// Count every byte of `dat`
    pub fn from_slice(dat: &[u8]) -> Self {
        let mut ans = Self::new();
        ans.add(dat);
        ans
    }
    /// Count every byte from `reader` until EOF, this is a single pass.
    /// I/O errors other than an interruption are passed up.
    pub fn scan<R: Read>(reader: &mut R) -> Result<Self,std::io::Error> {
        let mut ans = Self::new();
        let mut buf: [u8;4096] = [0;4096];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => ans.add(&buf[0..n]),
                Err(e) if e.kind()==ErrorKind::Interrupted => continue,
                Err(e) => return Err(e)
            }
        }
        Ok(ans)
    }
    fn add(&mut self,dat: &[u8]) {
        for b in dat {
            self.counts[*b as usize] += 1;
        }
        self.total += dat.len() as u64;
    }
    pub fn get(&self,symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }
    /// total number of symbols counted
    pub fn total(&self) -> u64 {
        self.total
    }
    /// number of symbols that occur at least once
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|c| **c > 0).count()
    }
    /// iterate over (symbol,count) for symbols that occur, in ascending symbol order
    pub fn present(&self) -> impl Iterator<Item=(u8,u64)> + '_ {
        self.counts.iter().enumerate().filter(|(_,c)| **c > 0).map(|(s,c)| (s as u8,*c))
    }
}

#[test]
fn counts_work() {
    let freq = FrequencyTable::from_slice("AAAB".as_bytes());
    assert_eq!(freq.get(b'A'),3);
    assert_eq!(freq.get(b'B'),1);
    assert_eq!(freq.get(b'C'),0);
    assert_eq!(freq.total(),4);
    assert_eq!(freq.distinct(),2);
    assert_eq!(freq.present().collect::<Vec<(u8,u64)>>(),vec![(b'A',3),(b'B',1)]);
}

#[test]
fn scan_matches_slice() {
    let test_data: Vec<u8> = (0..10000).map(|i| (i*7 % 251) as u8).collect();
    let mut src = std::io::Cursor::new(&test_data);
    let scanned = FrequencyTable::scan(&mut src).expect("scan failed");
    assert_eq!(scanned,FrequencyTable::from_slice(&test_data));
    assert_eq!(scanned.total(),10000);
    assert_eq!(scanned.distinct(),251);
}

#[test]
fn empty_input() {
    let freq = FrequencyTable::from_slice(&[]);
    assert_eq!(freq.total(),0);
    assert_eq!(freq.distinct(),0);
}
