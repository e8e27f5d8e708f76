//! Huffman prefix-code tree over words.
//!
//! The tree is built once from word frequencies by greedy merging, embedded
//! verbatim in the compressed header, and parsed back for decoding.
//!
//! # Serialized form
//!
//! Preorder, one tag byte per node:
//!
//! ```text
//! 'X'  internal node   left subtree, then right subtree
//! 'D'  leaf node       word_size raw bytes, then '/' '/'
//! '/'  absent node     (no payload)
//! ```
//!
//! An empty tree is the single byte `/`.
//!
//! Nodes live in an arena and refer to their children by index. Traversals
//! use explicit stacks, so tree depth is bounded only by memory.
//!
//! # Tie-breaking
//!
//! Entries of equal weight leave the priority queue in an unspecified order.
//! Different runs may therefore build different, equally optimal trees. The
//! tree travels inside the compressed stream, so decoding never depends on
//! which one was chosen.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::io::{self, Read, Write};

use bitvec::prelude::*;

use crate::error::{Error, Result, TreeError};
use crate::frequency::FrequencyTable;
use crate::persist::{read_up_to, PersistWrite};
use crate::word::{Word, WordCount, WordSize};

const INTERNAL_TAG: u8 = b'X';
const LEAF_TAG: u8 = b'D';
const NULL_TAG: u8 = b'/';

/// Bit sequence for one word, root to leaf (0 = left, 1 = right).
pub type Code = BitVec<u8, Msb0>;

/// Mapping from each word in a tree to its code.
pub type CodeTable = HashMap<Word, Code>;

/// Index of a node within its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A tree node. Internal nodes always have exactly two children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(Word),
    Internal { left: NodeId, right: NodeId },
}

/// Prefix-code tree with an optional root.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    word_size: WordSize,
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

/// Queue entry: a finished subtree and its cumulative weight.
///
/// Ordered by weight alone, reversed so `BinaryHeap` pops the lightest.
struct Weighted {
    weight: WordCount,
    node: NodeId,
}

impl PartialEq for Weighted {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight
    }
}

impl Eq for Weighted {}

impl PartialOrd for Weighted {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Weighted {
    fn cmp(&self, other: &Self) -> Ordering {
        other.weight.cmp(&self.weight)
    }
}

/// Parse state for a node whose children are still being read.
enum Pending {
    /// Internal node waiting for its left child
    InternalLeft,
    /// Internal node waiting for its right child
    InternalRight(NodeId),
    /// Leaf waiting for its first null marker
    LeafLeft(Word),
    /// Leaf waiting for its second null marker
    LeafRight(Word),
}

impl HuffmanTree {
    /// A tree with no nodes.
    pub fn empty(word_size: WordSize) -> Self {
        Self {
            word_size,
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Build the tree for a scanned frequency table.
    ///
    /// # Errors
    /// `Error::Overflow` if a merged weight would exceed `u64::MAX`.
    pub fn build(table: &FrequencyTable) -> Result<Self> {
        Self::from_weights(
            table.word_size(),
            table.iter().map(|(word, count)| (word.clone(), count)),
        )
    }

    /// Build the tree from `(word, weight)` pairs with greedy Huffman merging.
    ///
    /// No pairs yields an empty tree; one pair yields a single leaf root.
    ///
    /// # Errors
    /// `Error::Overflow` if a merged weight would exceed `u64::MAX`. No tree
    /// is produced in that case.
    ///
    /// # Panics
    /// If `word_size` is 0 or a word is not `word_size` bytes long.
    pub fn from_weights<I>(word_size: WordSize, weights: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Word, WordCount)>,
    {
        assert!(word_size > 0, "invalid word size: 0");

        let mut tree = Self::empty(word_size);
        let mut queue = BinaryHeap::new();
        for (word, weight) in weights {
            assert_eq!(word.len(), usize::from(word_size), "word does not match word size");
            let node = tree.push(Node::Leaf(word));
            queue.push(Weighted { weight, node });
        }

        while queue.len() > 1 {
            let (Some(first), Some(second)) = (queue.pop(), queue.pop()) else {
                break;
            };
            let weight = first
                .weight
                .checked_add(second.weight)
                .ok_or(Error::Overflow("huffman tree weight"))?;
            let node = tree.push(Node::Internal {
                left: first.node,
                right: second.node,
            });
            queue.push(Weighted { weight, node });
        }
        tree.root = queue.pop().map(|entry| entry.node);

        log::debug!("built huffman tree with {} nodes", tree.nodes.len());
        Ok(tree)
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn word_size(&self) -> WordSize {
        self.word_size
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Look up a node by id.
    ///
    /// # Panics
    /// If `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves, i.e. distinct words.
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf(_)))
            .count()
    }

    /// Derive the word → code mapping by breadth-first traversal.
    ///
    /// The root is never assigned a bit. A single-leaf tree therefore maps
    /// its only word to an empty code, which is unusable for bit encoding;
    /// callers check `len() <= 1` first.
    pub fn code_table(&self) -> CodeTable {
        let mut table = CodeTable::new();
        let Some(root) = self.root else {
            return table;
        };

        let mut queue = VecDeque::new();
        queue.push_back((root, Code::new()));
        while let Some((id, code)) = queue.pop_front() {
            match self.node(id) {
                Node::Leaf(word) => {
                    table.insert(word.clone(), code);
                }
                Node::Internal { left, right } => {
                    let mut left_code = code.clone();
                    left_code.push(false);
                    let mut right_code = code;
                    right_code.push(true);
                    queue.push_back((*left, left_code));
                    queue.push_back((*right, right_code));
                }
            }
        }
        table
    }

    /// Serialize to the tagged preorder form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.nodes.len() * (3 + usize::from(self.word_size)));
        let mut stack = vec![self.root];
        while let Some(entry) = stack.pop() {
            let Some(id) = entry else {
                out.push(NULL_TAG);
                continue;
            };
            match self.node(id) {
                Node::Leaf(word) => {
                    out.push(LEAF_TAG);
                    out.extend_from_slice(word.as_bytes());
                    out.extend_from_slice(&[NULL_TAG, NULL_TAG]);
                }
                Node::Internal { left, right } => {
                    out.push(INTERNAL_TAG);
                    stack.push(Some(*right));
                    stack.push(Some(*left));
                }
            }
        }
        out
    }

    /// Write the serialized tree to `out`.
    ///
    /// # Errors
    /// `Error::StreamWrite` if the stream fails.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        out.write_chars(&self.to_bytes())
    }

    /// Parse a serialized tree from `reader`.
    ///
    /// Consumes exactly the bytes of one tree; anything after it is left
    /// unread.
    ///
    /// # Errors
    /// - `Error::MalformedTree` on an unknown tag, a leaf with a child, an
    ///   internal node missing a child, or a stream that ends early
    /// - `Error::StreamRead` if the stream fails
    ///
    /// # Panics
    /// If `word_size` is 0.
    pub fn parse<R: Read + ?Sized>(reader: &mut R, word_size: WordSize) -> Result<Self> {
        assert!(word_size > 0, "invalid word size: 0");

        let mut tree = Self::empty(word_size);
        let mut stack = Vec::new();
        loop {
            let mut finished = match read_tag(reader)? {
                INTERNAL_TAG => {
                    stack.push(Pending::InternalLeft);
                    continue;
                }
                LEAF_TAG => {
                    stack.push(Pending::LeafLeft(read_word(reader, word_size)?));
                    continue;
                }
                NULL_TAG => None,
                other => return Err(TreeError::UnknownTag(other).into()),
            };

            // Hand each completed subtree to its parent until one still
            // needs another child.
            loop {
                let Some(parent) = stack.pop() else {
                    tree.root = finished;
                    log::debug!("parsed huffman tree with {} nodes", tree.nodes.len());
                    return Ok(tree);
                };
                match parent {
                    Pending::InternalLeft => {
                        let left = finished.ok_or(TreeError::InternalMissingChild)?;
                        stack.push(Pending::InternalRight(left));
                        break;
                    }
                    Pending::InternalRight(left) => {
                        let right = finished.ok_or(TreeError::InternalMissingChild)?;
                        finished = Some(tree.push(Node::Internal { left, right }));
                    }
                    Pending::LeafLeft(word) => {
                        if finished.is_some() {
                            return Err(TreeError::LeafHasLeftChild.into());
                        }
                        stack.push(Pending::LeafRight(word));
                        break;
                    }
                    Pending::LeafRight(word) => {
                        if finished.is_some() {
                            return Err(TreeError::LeafHasRightChild.into());
                        }
                        finished = Some(tree.push(Node::Leaf(word)));
                    }
                }
            }
        }
    }
}

fn read_tag<R: Read + ?Sized>(reader: &mut R) -> Result<u8> {
    let mut tag = [0u8; 1];
    match read_up_to(reader, &mut tag) {
        Ok(1) => Ok(tag[0]),
        Ok(_) => Err(TreeError::NotEnoughData.into()),
        Err(e) => Err(Error::StreamRead(e)),
    }
}

fn read_word<R: Read + ?Sized>(reader: &mut R, word_size: WordSize) -> Result<Word> {
    let mut buf = vec![0u8; usize::from(word_size)];
    match reader.read_exact(&mut buf) {
        Ok(()) => Ok(Word::new(buf)),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(TreeError::TruncatedWord.into()),
        Err(e) => Err(Error::StreamRead(e)),
    }
}
