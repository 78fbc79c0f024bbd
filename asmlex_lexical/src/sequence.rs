//! Contains the splice-stable token list the stream engine walks.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    arena::{Arena, ID},
    token::Token,
};

static NEXT_SEQUENCE_ID: AtomicU64 = AtomicU64::new(0);

/// A single entry of the [`Sequence`].
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) token: Token,
    pub(crate) next: Option<NodeID>,
    pub(crate) prev: Option<NodeID>,

    /// The node was replaced by an empty expansion; traversal skips it.
    pub(crate) removed: bool,

    /// Names of the replacements whose expansion produced this node, outermost first.
    pub(crate) expanded_from: Vec<String>,
}

pub(crate) type NodeID = ID<Node>;

/// Is a doubly linked list of tokens stored in an [`Arena`].
///
/// Nodes never move once inserted, so a [`NodeID`] keeps denoting the same entry while other
/// tokens are linked in or out around it. Every (re)population, and every clone, gets a fresh
/// process-unique identity that positions record and are checked against.
#[derive(Debug)]
pub(crate) struct Sequence {
    id: u64,
    nodes: Arena<Node>,
    head: Option<NodeID>,
    tail: Option<NodeID>,
}

fn next_id() -> u64 { NEXT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed) }

impl Clone for Sequence {
    fn clone(&self) -> Self {
        Self {
            id: next_id(),
            nodes: self.nodes.clone(),
            head: self.head,
            tail: self.tail,
        }
    }
}

impl Sequence {
    pub(crate) fn new(tokens: impl IntoIterator<Item = Token>) -> Self {
        let mut sequence = Self {
            id: next_id(),
            nodes: Arena::default(),
            head: None,
            tail: None,
        };

        for token in tokens {
            sequence.push_back(token);
        }

        sequence
    }

    pub(crate) fn id(&self) -> u64 { self.id }

    pub(crate) fn head(&self) -> Option<NodeID> { self.head }

    pub(crate) fn tail(&self) -> Option<NodeID> { self.tail }

    pub(crate) fn next(&self, id: NodeID) -> Option<NodeID> { self.nodes[id].next }

    pub(crate) fn prev(&self, id: NodeID) -> Option<NodeID> { self.nodes[id].prev }

    pub(crate) fn node(&self, id: NodeID) -> &Node { &self.nodes[id] }

    pub(crate) fn node_mut(&mut self, id: NodeID) -> &mut Node { &mut self.nodes[id] }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> { self.nodes.iter_mut() }

    fn push_back(&mut self, token: Token) {
        let id = self.nodes.insert(Node {
            token,
            next: None,
            prev: self.tail,
            removed: false,
            expanded_from: Vec::new(),
        });

        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(id),
            None => self.head = Some(id),
        }

        self.tail = Some(id);
    }

    /// Links a new node right after `after` and returns its handle.
    pub(crate) fn insert_after(
        &mut self,
        after: NodeID,
        token: Token,
        expanded_from: Vec<String>,
    ) -> NodeID {
        let next = self.nodes[after].next;
        let id = self.nodes.insert(Node {
            token,
            next,
            prev: Some(after),
            removed: false,
            expanded_from,
        });

        self.nodes[after].next = Some(id);

        match next {
            Some(next) => self.nodes[next].prev = Some(id),
            None => self.tail = Some(id),
        }

        id
    }
}
