// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Byte-oriented Huffman coding with a per-stream code table.
//!
//! The tree is rebuilt for every input from its symbol frequencies. Ties
//! between equal frequencies are broken by node creation order, so the same
//! input always yields the same table and bitstream.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap, hash_map::Entry},
};

use crate::{
    bit_reader::BitReader,
    bit_writer::BitWriter,
    error::{Error, Result},
    util::tracing_wrappers::*,
};

pub const HUFFMAN_MAX_BITS: u32 = 64;
const ALPHABET_SIZE: usize = 256;

/// A code word: the low `length` bits of `bits`, first bit most significant.
///
/// Both fields take part in equality, so `0` and `00` are different codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HuffmanCode {
    pub length: u32,
    pub bits: u64,
}

impl HuffmanCode {
    pub const EMPTY: HuffmanCode = HuffmanCode { length: 0, bits: 0 };

    pub fn new(bits: u64, length: u32) -> HuffmanCode {
        HuffmanCode { length, bits }
    }

    fn append(self, bit: bool) -> Result<HuffmanCode> {
        if self.length >= HUFFMAN_MAX_BITS {
            return Err(Error::HuffmanCodeTooLong(self.length + 1));
        }
        Ok(HuffmanCode {
            length: self.length + 1,
            bits: (self.bits << 1) | bit as u64,
        })
    }
}

/// Symbol to code mapping used by the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeTable([Option<HuffmanCode>; ALPHABET_SIZE]);

impl EncodeTable {
    pub fn get(&self, symbol: u8) -> Option<HuffmanCode> {
        self.0[symbol as usize]
    }

    pub fn to_decode_table(&self) -> DecodeTable {
        let mut table = DecodeTable::default();
        for (symbol, code) in self.0.iter().enumerate() {
            if let Some(code) = code {
                table.codes.insert(*code, symbol as u8);
                table.max_length = table.max_length.max(code.length);
            }
        }
        table
    }
}

/// Code to symbol mapping needed to decode a stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeTable {
    codes: HashMap<HuffmanCode, u8>,
    max_length: u32,
}

impl DecodeTable {
    /// Builds a table from persisted entries, rejecting ambiguous ones.
    pub fn try_from_entries(
        entries: impl IntoIterator<Item = (HuffmanCode, u8)>,
    ) -> Result<DecodeTable> {
        let mut table = DecodeTable::default();
        for (code, symbol) in entries {
            if code.length > HUFFMAN_MAX_BITS {
                return Err(Error::HuffmanCodeTooLong(code.length));
            }
            match table.codes.entry(code) {
                Entry::Occupied(_) => return Err(Error::DuplicateHuffmanCode(code.length)),
                Entry::Vacant(e) => {
                    e.insert(symbol);
                }
            }
            table.max_length = table.max_length.max(code.length);
        }
        Ok(table)
    }

    pub fn get(&self, code: &HuffmanCode) -> Option<u8> {
        self.codes.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Length of the longest code in the table.
    pub fn max_length(&self) -> u32 {
        self.max_length
    }

    /// Entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (HuffmanCode, u8)> + '_ {
        self.codes.iter().map(|(code, symbol)| (*code, *symbol))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanEncoded {
    pub bytes: Vec<u8>,
    pub decode_table: DecodeTable,
    /// Number of meaningful bits in `bytes`; the rest of the last byte is
    /// zero padding.
    pub bit_count: u64,
}

enum Node {
    Leaf(u8),
    Internal { left: usize, right: usize },
}

fn histogram(data: &[u8]) -> [u64; ALPHABET_SIZE] {
    let mut counts = [0u64; ALPHABET_SIZE];
    for &byte in data {
        counts[byte as usize] += 1;
    }
    counts
}

/// Builds the tree and returns its nodes, root last. Node ids are indices
/// into the returned vector: leaves in symbol order, then internal nodes in
/// creation order.
fn build_tree(counts: &[u64; ALPHABET_SIZE]) -> Vec<Node> {
    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = BinaryHeap::new();
    let mut nodes: Vec<Node> = Vec::new();

    for (symbol, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        heap.push(Reverse((count, nodes.len())));
        nodes.push(Node::Leaf(symbol as u8));
    }

    while let Some(Reverse((first_count, first))) = heap.pop() {
        let Some(Reverse((second_count, second))) = heap.pop() else {
            break;
        };
        heap.push(Reverse((first_count + second_count, nodes.len())));
        nodes.push(Node::Internal {
            left: second,
            right: first,
        });
    }
    nodes
}

fn assign_codes(nodes: &[Node]) -> Result<EncodeTable> {
    let mut table = [None; ALPHABET_SIZE];
    let Some(root) = nodes.len().checked_sub(1) else {
        return Ok(EncodeTable(table));
    };
    if let Node::Leaf(symbol) = nodes[root] {
        // A lone symbol still needs one bit per occurrence.
        table[symbol as usize] = Some(HuffmanCode::new(1, 1));
        return Ok(EncodeTable(table));
    }

    let mut stack = vec![(root, HuffmanCode::EMPTY)];
    while let Some((id, code)) = stack.pop() {
        match nodes[id] {
            Node::Leaf(symbol) => table[symbol as usize] = Some(code),
            Node::Internal { left, right } => {
                stack.push((right, code.append(false)?));
                stack.push((left, code.append(true)?));
            }
        }
    }
    Ok(EncodeTable(table))
}

/// Builds a code table for `data` and packs `data` with it.
pub fn encode(data: &[u8]) -> Result<HuffmanEncoded> {
    let counts = histogram(data);
    let encode_table = assign_codes(&build_tree(&counts))?;

    let mut total_bits = 0u64;
    for (symbol, &count) in counts.iter().enumerate() {
        if let Some(code) = encode_table.get(symbol as u8) {
            total_bits = count
                .checked_mul(code.length as u64)
                .and_then(|bits| bits.checked_add(total_bits))
                .ok_or(Error::ArithmeticOverflow)?;
        }
    }

    let mut writer = BitWriter::new();
    writer.reserve_bits(total_bits)?;
    // Every symbol present in `data` has a code.
    for code in data.iter().filter_map(|&byte| encode_table.get(byte)) {
        writer.write_long(code.length as usize, code.bits);
    }
    let (bytes, bit_count) = writer.finalize();
    debug_assert_eq!(bit_count, total_bits);

    let decode_table = encode_table.to_decode_table();
    debug!(
        input_len = data.len(),
        symbols = decode_table.len(),
        bit_count,
        "huffman encoded"
    );
    Ok(HuffmanEncoded {
        bytes,
        decode_table,
        bit_count,
    })
}

/// Decodes exactly `bit_count` bits of `bytes` with `table`.
pub fn decode(bytes: &[u8], table: &DecodeTable, bit_count: u64) -> Result<Vec<u8>> {
    let mut br = BitReader::new(bytes, bit_count)?;
    let mut out = Vec::new();
    let mut code = HuffmanCode::EMPTY;
    while br.bits_remaining() > 0 {
        code = code.append(br.read_bit()?)?;
        if code.length > table.max_length() {
            warn!(length = code.length, "no code matches the stream");
            return Err(Error::InvalidHuffmanCode(code.length));
        }
        if let Some(symbol) = table.get(&code) {
            out.push(symbol);
            code = HuffmanCode::EMPTY;
        }
    }
    if code.length > 0 {
        return Err(Error::TruncatedHuffmanStream(code.length));
    }
    trace!(bit_count, output_len = out.len(), "huffman decoded");
    Ok(out)
}
