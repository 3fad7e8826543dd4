//! Game tree nodes.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::{Rc, Weak};

use shako::{Board, Move};

use crate::comment::{Arrow, Shape};
use crate::nag::Nag;

pub(crate) struct NodeData {
    parent: Weak<RefCell<NodeData>>,
    prev_move: Option<Move>,
    variations: Vec<GameNode>,
    comment: String,
    starting_comment: String,
    nags: BTreeSet<Nag>,
    clock: Option<f64>,
    eval: Option<f64>,
    arrows: Vec<Arrow>,
    shapes: Vec<Shape>,
    /// Only set on the root node.
    starting_fen: Option<String>,
    cached_board: Option<Board>,
}

impl NodeData {
    fn new(parent: Weak<RefCell<NodeData>>, prev_move: Option<Move>) -> NodeData {
        NodeData {
            parent,
            prev_move,
            variations: Vec::new(),
            comment: String::new(),
            starting_comment: String::new(),
            nags: BTreeSet::new(),
            clock: None,
            eval: None,
            arrows: Vec::new(),
            shapes: Vec::new(),
            starting_fen: None,
            cached_board: None,
        }
    }
}

/// A node of the game tree: the move that led here, annotations, and the
/// variations that follow.
///
/// `GameNode` is a cheap handle; cloning it clones the handle, not the
/// subtree. The parent link is a weak back-reference: ownership flows from
/// parent to children only, and a subtree detached with
/// [`GameNode::remove_variation()`] stays alive exactly as long as outside
/// handles to it do.
#[derive(Clone)]
pub struct GameNode {
    data: Rc<RefCell<NodeData>>,
}

impl PartialEq for GameNode {
    fn eq(&self, other: &GameNode) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl Eq for GameNode {}

impl GameNode {
    pub(crate) fn new_root() -> GameNode {
        GameNode {
            data: Rc::new(RefCell::new(NodeData::new(Weak::new(), None))),
        }
    }

    /// The parent node, or `None` at the root.
    pub fn parent(&self) -> Option<GameNode> {
        self.data.borrow().parent.upgrade().map(|data| GameNode { data })
    }

    /// The move leading to this node, or `None` at the root.
    pub fn prev_move(&self) -> Option<Move> {
        self.data.borrow().prev_move
    }

    /// Handles to the child nodes. The first element is the mainline
    /// continuation.
    pub fn variations(&self) -> Vec<GameNode> {
        self.data.borrow().variations.clone()
    }

    /// The mainline continuation, or `None` at the end of a line.
    pub fn next(&self) -> Option<GameNode> {
        self.data.borrow().variations.first().cloned()
    }

    /// Tests if this node has no children.
    pub fn is_end(&self) -> bool {
        self.data.borrow().variations.is_empty()
    }

    /// Tests if this node is the first variation of its parent (or the
    /// root).
    pub fn is_main_variation(&self) -> bool {
        match self.parent() {
            Some(parent) => parent
                .data
                .borrow()
                .variations
                .first()
                .map_or(false, |main| main == self),
            None => true,
        }
    }

    /// Tests if this node is on the mainline of the game.
    pub fn is_mainline(&self) -> bool {
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            if parent.next().map_or(true, |main| main != node) {
                return false;
            }
            node = parent;
        }
        true
    }

    /// Ascends to the root node.
    pub fn root(&self) -> GameNode {
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    /// Follows the mainline to the end of the game.
    pub fn end(&self) -> GameNode {
        let mut node = self.clone();
        while let Some(next) = node.next() {
            node = next;
        }
        node
    }

    /// Iterates over the nodes of the mainline that follows this node.
    pub fn mainline(&self) -> Mainline {
        Mainline { cursor: self.next() }
    }

    /// Iterates over the moves of the mainline that follows this node.
    pub fn mainline_moves(&self) -> MainlineMoves {
        MainlineMoves { inner: self.mainline() }
    }

    /// Tests if the given move continues from this node.
    pub fn has_variation(&self, m: &Move) -> bool {
        self.variation(m).is_some()
    }

    /// Finds the child node continuing with the given move.
    pub fn variation(&self, m: &Move) -> Option<GameNode> {
        self.variations()
            .into_iter()
            .find(|child| child.prev_move() == Some(*m))
    }

    /// Appends a new child node for the given move and returns it.
    pub fn add_variation(&self, m: Move) -> GameNode {
        let child = GameNode {
            data: Rc::new(RefCell::new(NodeData::new(Rc::downgrade(&self.data), Some(m)))),
        };
        self.data.borrow_mut().variations.push(child.clone());
        child
    }

    /// Inserts a new child node for the given move in front of the
    /// existing variations and returns it.
    pub fn add_main_variation(&self, m: Move) -> GameNode {
        let child = GameNode {
            data: Rc::new(RefCell::new(NodeData::new(Rc::downgrade(&self.data), Some(m)))),
        };
        self.data.borrow_mut().variations.insert(0, child.clone());
        child
    }

    /// Appends a line of moves, each as the mainline continuation of the
    /// previous one. An optional starting comment goes on the first added
    /// node, an optional comment on the last. Returns the final node.
    pub fn add_line<I>(
        &self,
        moves: I,
        comment: Option<&str>,
        starting_comment: Option<&str>,
    ) -> GameNode
    where
        I: IntoIterator<Item = Move>,
    {
        let mut node = self.clone();
        let mut first = true;
        for m in moves {
            node = node.add_variation(m);
            if first {
                if let Some(starting_comment) = starting_comment {
                    node.set_starting_comment(starting_comment);
                }
                first = false;
            }
        }
        if let Some(comment) = comment {
            node.set_comment(comment);
        }
        node
    }

    /// Splices out the given child and severs its parent pointer. Returns
    /// `false` if it is not a child of this node.
    pub fn remove_variation(&self, child: &GameNode) -> bool {
        let index = {
            let data = self.data.borrow();
            match data.variations.iter().position(|v| v == child) {
                Some(index) => index,
                None => return false,
            }
        };
        self.data.borrow_mut().variations.remove(index);
        child.data.borrow_mut().parent = Weak::new();
        true
    }

    /// Swaps this node with its preceding sibling.
    pub fn promote(&self) {
        if let Some(parent) = self.parent() {
            let mut data = parent.data.borrow_mut();
            if let Some(index) = data.variations.iter().position(|v| v == self) {
                if index > 0 {
                    data.variations.swap(index - 1, index);
                }
            }
        }
    }

    /// Swaps this node with its following sibling.
    pub fn demote(&self) {
        if let Some(parent) = self.parent() {
            let mut data = parent.data.borrow_mut();
            if let Some(index) = data.variations.iter().position(|v| v == self) {
                if index + 1 < data.variations.len() {
                    data.variations.swap(index, index + 1);
                }
            }
        }
    }

    /// Moves this node to the front of its parent's variations, making it
    /// the mainline continuation. The other variations slide back.
    pub fn promote_to_main(&self) {
        if let Some(parent) = self.parent() {
            let mut data = parent.data.borrow_mut();
            if let Some(index) = data.variations.iter().position(|v| v == self) {
                let node = data.variations.remove(index);
                data.variations.insert(0, node);
            }
        }
    }

    /// Counts the nodes of this subtree, including this node.
    pub fn count_nodes(&self) -> usize {
        1 + self.variations().iter().map(GameNode::count_nodes).sum::<usize>()
    }

    /// The distance from the root; 0 at the root.
    pub fn ply(&self) -> u32 {
        let mut plies = 0;
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            plies += 1;
            node = parent;
        }
        plies
    }

    /// The fullmove number of this node's position.
    pub fn move_number(&self) -> u32 {
        self.ply() / 2 + 1
    }

    /// The position after the move leading to this node.
    ///
    /// The board is materialized by replaying the moves from the root (or
    /// the nearest cached ancestor) and cached. The returned board is an
    /// owned copy with an empty move stack; mutating it does not affect the
    /// tree.
    pub fn board(&self) -> Board {
        if let Some(board) = self.data.borrow().cached_board.as_ref() {
            return board.copy();
        }

        let mut moves: Vec<Move> = Vec::new();
        let mut cursor = self.clone();
        let mut board = loop {
            let data = cursor.data.borrow();
            if let Some(cached) = data.cached_board.as_ref() {
                break cached.copy();
            }
            match (data.prev_move, data.parent.upgrade()) {
                (Some(m), Some(parent)) => {
                    moves.push(m);
                    drop(data);
                    cursor = GameNode { data: parent };
                }
                _ => {
                    break data
                        .starting_fen
                        .as_deref()
                        .and_then(|fen| Board::from_fen(fen).ok())
                        .unwrap_or_default();
                }
            }
        };

        for m in moves.iter().rev() {
            // Unapplicable moves (e.g. drops recorded as leaves) leave the
            // position unchanged.
            let _ = board.push(*m);
        }

        let board = board.copy();
        self.data.borrow_mut().cached_board = Some(board.copy());
        board
    }

    /// The FEN of this node's position.
    pub fn fen(&self) -> String {
        self.board().fen()
    }

    /// The SAN of the move leading to this node, in the context of the
    /// parent position. `None` at the root.
    pub fn san(&self) -> Option<String> {
        let m = self.prev_move()?;
        let parent = self.parent()?;
        Some(parent.board().san(&m))
    }

    /// The UCI of the move leading to this node. `None` at the root.
    pub fn uci(&self) -> Option<String> {
        self.prev_move().map(|m| m.uci())
    }

    /// Clears the cached boards of this subtree. Called by structural
    /// mutations that change the positions below a node.
    pub fn invalidate_board(&self) {
        self.data.borrow_mut().cached_board = None;
        for child in self.variations() {
            child.invalidate_board();
        }
    }

    /// The comment after the move, if not empty.
    pub fn comment(&self) -> Option<String> {
        let data = self.data.borrow();
        if data.comment.is_empty() {
            None
        } else {
            Some(data.comment.clone())
        }
    }

    pub fn set_comment(&self, comment: &str) {
        self.data.borrow_mut().comment = comment.to_owned();
    }

    /// The comment in front of the move, if not empty. Meaningful for
    /// nodes that begin a variation.
    pub fn starting_comment(&self) -> Option<String> {
        let data = self.data.borrow();
        if data.starting_comment.is_empty() {
            None
        } else {
            Some(data.starting_comment.clone())
        }
    }

    pub fn set_starting_comment(&self, comment: &str) {
        self.data.borrow_mut().starting_comment = comment.to_owned();
    }

    /// The numeric annotation glyphs of this node, in ascending order.
    pub fn nags(&self) -> Vec<Nag> {
        self.data.borrow().nags.iter().copied().collect()
    }

    pub fn add_nag(&self, nag: Nag) {
        self.data.borrow_mut().nags.insert(nag);
    }

    pub fn set_nags<I: IntoIterator<Item = Nag>>(&self, nags: I) {
        self.data.borrow_mut().nags = nags.into_iter().collect();
    }

    /// The remaining clock time of the side that played the move, in
    /// seconds, from a `[%clk ...]` annotation.
    pub fn clock(&self) -> Option<f64> {
        self.data.borrow().clock
    }

    pub fn set_clock(&self, clock: Option<f64>) {
        self.data.borrow_mut().clock = clock;
    }

    /// The engine evaluation from an `[%eval ...]` annotation.
    pub fn eval(&self) -> Option<f64> {
        self.data.borrow().eval
    }

    pub fn set_eval(&self, eval: Option<f64>) {
        self.data.borrow_mut().eval = eval;
    }

    /// Arrows from a `[%cal ...]` annotation.
    pub fn arrows(&self) -> Vec<Arrow> {
        self.data.borrow().arrows.clone()
    }

    pub fn set_arrows<I: IntoIterator<Item = Arrow>>(&self, arrows: I) {
        self.data.borrow_mut().arrows = arrows.into_iter().collect();
    }

    /// Highlighted squares from a `[%csl ...]` annotation.
    pub fn shapes(&self) -> Vec<Shape> {
        self.data.borrow().shapes.clone()
    }

    pub fn set_shapes<I: IntoIterator<Item = Shape>>(&self, shapes: I) {
        self.data.borrow_mut().shapes = shapes.into_iter().collect();
    }

    pub(crate) fn starting_fen(&self) -> Option<String> {
        self.data.borrow().starting_fen.clone()
    }

    pub(crate) fn set_starting_fen(&self, fen: Option<&str>) {
        let mut data = self.data.borrow_mut();
        data.starting_fen = fen.map(str::to_owned);
        data.cached_board = None;
        drop(data);
        self.invalidate_board();
    }
}

impl fmt::Debug for GameNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameNode")
            .field("prev_move", &self.prev_move())
            .field("variations", &self.variations().len())
            .finish()
    }
}

/// Iterator over the nodes of a mainline, excluding the starting node.
#[derive(Clone, Debug)]
pub struct Mainline {
    cursor: Option<GameNode>,
}

impl Iterator for Mainline {
    type Item = GameNode;

    fn next(&mut self) -> Option<GameNode> {
        let node = self.cursor.take()?;
        self.cursor = node.next();
        Some(node)
    }
}

/// Iterator over the moves of a mainline.
#[derive(Clone, Debug)]
pub struct MainlineMoves {
    inner: Mainline,
}

impl Iterator for MainlineMoves {
    type Item = Move;

    fn next(&mut self) -> Option<Move> {
        // Nodes after the root always carry a move.
        self.inner.next().and_then(|node| node.prev_move())
    }
}
