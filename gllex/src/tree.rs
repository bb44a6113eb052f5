//! Derivation trees built from a disambiguated BSR forest.

use crate::bsr::BsrSet;
use crate::input::Input;
use crate::symbol::{NtId, Symbol, Terminal};
use std::fmt;
use thiserror::Error;

/// A derivation tree. Extents are input positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree {
    Node {
        head: NtId,
        name: String,
        alt: usize,
        lext: usize,
        rext: usize,
        children: Vec<Tree>,
    },
    Leaf {
        terminal: Terminal,
        lext: usize,
        rext: usize,
        text: String,
    },
}

impl Tree {
    /// Head name of a node, or the matched text of a leaf.
    pub fn name(&self) -> &str {
        match self {
            Tree::Node { name, .. } => name,
            Tree::Leaf { text, .. } => text,
        }
    }

    /// The input range `[lext, rext)` the node covers.
    pub fn extent(&self) -> (usize, usize) {
        match self {
            Tree::Node { lext, rext, .. } | Tree::Leaf { lext, rext, .. } => (*lext, *rext),
        }
    }

    /// Children in input order; empty for leaves.
    pub fn children(&self) -> &[Tree] {
        match self {
            Tree::Node { children, .. } => children,
            Tree::Leaf { .. } => &[],
        }
    }

    /// Number of nodes and leaves.
    pub fn size(&self) -> usize {
        let mut n = 0;
        let mut work = vec![self];
        while let Some(t) = work.pop() {
            n += 1;
            work.extend(t.children());
        }
        n
    }
}

// Trees from right-recursive rules nest as deep as the input is long, so
// dropping and printing must not recurse.
impl Drop for Tree {
    fn drop(&mut self) {
        let mut work = match self {
            Tree::Node { children, .. } => std::mem::take(children),
            Tree::Leaf { .. } => return,
        };
        while let Some(mut t) = work.pop() {
            if let Tree::Node { children, .. } = &mut t {
                work.append(children);
            }
        }
    }
}

enum Step<'a> {
    Tree(&'a Tree),
    Space,
    Close,
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut work = vec![Step::Tree(self)];
        while let Some(step) = work.pop() {
            match step {
                Step::Tree(Tree::Leaf { text, .. }) => write!(f, "{text:?}")?,
                Step::Tree(Tree::Node { name, children, .. }) => {
                    write!(f, "({name}")?;
                    work.push(Step::Close);
                    for c in children.iter().rev() {
                        work.push(Step::Tree(c));
                        work.push(Step::Space);
                    }
                }
                Step::Space => f.write_str(" ")?,
                Step::Close => f.write_str(")")?,
            }
        }
        Ok(())
    }
}

/// Reasons a forest does not yield exactly one tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("no derivation of the start symbol spans the input")]
    NoRoot,

    #[error("{count} derivations of the start symbol span the input")]
    AmbiguousRoot { count: usize },

    #[error("ambiguous derivation of {name} over {lext}..{rext}")]
    Ambiguous {
        name: String,
        lext: usize,
        rext: usize,
    },

    #[error("no surviving derivation of {name} over {lext}..{rext}")]
    Missing {
        name: String,
        lext: usize,
        rext: usize,
    },
}

/// Builds the single tree of `bsr`.
///
/// The tree is assembled with an explicit stack of partly built nodes, so
/// deeply nested derivations do not grow the call stack.
///
/// # Errors
///
/// Fails if there is no root, more than one root, or any node below the
/// root has more than one derivation left.
pub fn build_tree<I: Input + ?Sized>(bsr: &BsrSet<'_>, input: &I) -> Result<Tree, TreeError> {
    let root = match bsr.roots().as_slice() {
        [] => return Err(TreeError::NoRoot),
        [root] => *root,
        roots => return Err(TreeError::AmbiguousRoot { count: roots.len() }),
    };
    let tables = bsr.tables();
    let mut stack = vec![Frame::new(bsr, root)?];
    loop {
        let Some(top) = stack.last_mut() else {
            unreachable!("tree stack emptied before the root was built");
        };
        let symbols = tables.slot_symbols(bsr.entry(top.idx).slot);
        let i = top.children.len();
        if i == symbols.len() {
            let Some(done) = stack.pop() else {
                unreachable!("tree stack emptied before the root was built");
            };
            let node = done.finish(bsr);
            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => return Ok(node),
            }
            continue;
        }
        let (l, r) = top.extents[i];
        match &symbols[i] {
            Symbol::T(t) => top.children.push(Tree::Leaf {
                terminal: t.clone(),
                lext: l,
                rext: r,
                text: input.text(l, r).to_string(),
            }),
            Symbol::Nt(x) => {
                let name = || tables.nt_name(*x).to_string();
                let child = match bsr.nt_entries(*x, l, r).as_slice() {
                    [c] => *c,
                    [] => {
                        return Err(TreeError::Missing {
                            name: name(),
                            lext: l,
                            rext: r,
                        });
                    }
                    _ => {
                        return Err(TreeError::Ambiguous {
                            name: name(),
                            lext: l,
                            rext: r,
                        });
                    }
                };
                stack.push(Frame::new(bsr, child)?);
            }
        }
    }
}

/// A node under construction: its entry, the extents of its symbols and
/// the children built so far.
struct Frame {
    idx: usize,
    extents: Vec<(usize, usize)>,
    children: Vec<Tree>,
}

impl Frame {
    fn new(bsr: &BsrSet<'_>, idx: usize) -> Result<Self, TreeError> {
        let e = *bsr.entry(idx);
        let name = || bsr.tables().nt_name(bsr.head(idx)).to_string();
        match bsr.decomposition_count(idx) {
            1 => {}
            0 => {
                return Err(TreeError::Missing {
                    name: name(),
                    lext: e.lext,
                    rext: e.rext,
                });
            }
            _ => {
                return Err(TreeError::Ambiguous {
                    name: name(),
                    lext: e.lext,
                    rext: e.rext,
                });
            }
        }
        let extents = bsr.decompositions(idx).pop().unwrap_or_default();
        Ok(Frame {
            idx,
            children: Vec::with_capacity(extents.len()),
            extents,
        })
    }

    fn finish(self, bsr: &BsrSet<'_>) -> Tree {
        let e = bsr.entry(self.idx);
        let head = bsr.head(self.idx);
        Tree::Node {
            head,
            name: bsr.tables().nt_name(head).to_string(),
            alt: bsr.alternate(self.idx),
            lext: e.lext,
            rext: e.rext,
            children: self.children,
        }
    }
}
