//! Operator trie with longest-match lookup.
//!
//! Holds every multi-character operator of the host language up to the
//! four-byte `>>>=`. Single punctuation with structural meaning (brackets,
//! `,`, `;`, `:`) is dispatched directly by the lexer and never reaches here.

use std::sync::OnceLock;

use crate::TokenKind;

/// Every operator the trie recognizes.
const OPERATORS: &[&str] = &[
    // 4 bytes
    ">>>=", //
    // 3 bytes
    ">>>", "<<=", ">>=", "===", "!==", "**=", "&&=", "||=", "??=", "...",
    // 2 bytes
    "=>", "==", "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=",
    "%=", "&=", "|=", "^=", "<<", ">>", "**",
    // 1 byte
    "=", "+", "-", "*", "/", "%", "&", "|", "^", "!", "~", "<", ">", "?", ".",
];

/// Operators classified as assignments.
const ASSIGNMENTS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=", ">>>=", "**=", "&&=",
    "||=", "??=",
];

#[derive(Debug, Default)]
struct Node {
    /// Outgoing edges, keyed by byte.
    children: Vec<(u8, usize)>,
    /// An operator ends at this node.
    terminal: bool,
}

#[derive(Debug)]
pub(crate) struct OperatorTrie {
    nodes: Vec<Node>,
}

impl OperatorTrie {
    fn build(operators: &[&str]) -> Self {
        let mut trie = OperatorTrie {
            nodes: vec![Node::default()],
        };
        for op in operators {
            let mut node = 0;
            for &byte in op.as_bytes() {
                node = match trie.child(node, byte) {
                    Some(next) => next,
                    None => {
                        let next = trie.nodes.len();
                        trie.nodes.push(Node::default());
                        trie.nodes[node].children.push((byte, next));
                        next
                    }
                };
            }
            trie.nodes[node].terminal = true;
        }
        trie
    }

    fn child(&self, node: usize, byte: u8) -> Option<usize> {
        self.nodes[node]
            .children
            .iter()
            .find(|&&(b, _)| b == byte)
            .map(|&(_, next)| next)
    }

    /// Length in bytes of the longest operator prefixing `input`, or 0.
    pub(crate) fn longest_match(&self, input: &[u8]) -> usize {
        let mut node = 0;
        let mut longest = 0;
        for (depth, &byte) in input.iter().enumerate() {
            match self.child(node, byte) {
                Some(next) => {
                    node = next;
                    if self.nodes[node].terminal {
                        longest = depth + 1;
                    }
                }
                None => break,
            }
        }
        longest
    }
}

/// The shared operator trie.
pub(crate) fn operator_trie() -> &'static OperatorTrie {
    static TRIE: OnceLock<OperatorTrie> = OnceLock::new();
    TRIE.get_or_init(|| OperatorTrie::build(OPERATORS))
}

/// Token kind for a matched operator.
pub(crate) fn classify(op: &str) -> TokenKind {
    match op {
        "." => TokenKind::Dot,
        "..." => TokenKind::Ellipsis,
        _ if ASSIGNMENTS.contains(&op) => TokenKind::Assign,
        _ => TokenKind::Other,
    }
}
