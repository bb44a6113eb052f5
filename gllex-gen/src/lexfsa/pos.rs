use std::fmt;

/// Position of the dot inside a possibly nested lexical rule body.
///
/// The stack reads `[p0, j1, p1, j2, p2, ...]`: `p0` indexes the rule
/// body, and every following pair selects alternate `j` of the bracket at
/// the previous position and the dot position `p` within it. The top is
/// the dot position in the innermost sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos(Vec<usize>);

impl Pos {
    /// The dot before the first symbol of the rule body.
    pub fn new() -> Self {
        Pos(vec![0])
    }

    /// Position of the dot within the innermost sequence.
    pub fn top(&self) -> usize {
        self.0[self.0.len() - 1]
    }

    /// Moves the dot past one symbol.
    pub fn inc(&mut self) {
        let last = self.0.len() - 1;
        self.0[last] += 1;
    }

    /// Enters alternate `j` of the bracket at the dot.
    pub fn push(&mut self, j: usize) {
        self.0.push(j);
        self.0.push(0);
    }

    /// Leaves the innermost bracket; the dot is left before it.
    pub fn pop(&mut self) {
        self.0.truncate(self.0.len().saturating_sub(2).max(1));
    }

    /// Number of brackets the dot is nested in.
    pub fn depth(&self) -> usize {
        (self.0.len() - 1) / 2
    }

    /// The raw path: positions and alternates interleaved, innermost position last.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// (position, alternate) pairs leading to the innermost sequence.
    pub fn path(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.chunks_exact(2).map(|c| (c[0], c[1]))
    }
}

impl Default for Pos {
    fn default() -> Self {
        Pos::new()
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_and_path() {
        let mut p = Pos::new();
        p.inc();
        p.push(2);
        p.inc();
        assert_eq!(p.to_string(), "[1,2,1]");
        assert_eq!((p.top(), p.depth()), (1, 1));
        assert_eq!(p.path().collect::<Vec<_>>(), vec![(1, 2)]);
        p.pop();
        assert_eq!(p, {
            let mut q = Pos::new();
            q.inc();
            q
        });
        assert_eq!(p.depth(), 0);
        p.pop();
        assert_eq!(p.to_string(), "[1]");
    }
}
