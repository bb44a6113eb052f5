use indexmap::IndexSet;
use smartstring::alias::String;

/// Insertion-ordered table of names; a name's index is its id.
#[derive(Default, Debug, Clone)]
pub struct Symtab {
    names: IndexSet<String>,
}

impl Symtab {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `sym` if missing and returns its index.
    pub fn add(&mut self, sym: &str) -> usize {
        if let Some(idx) = self.names.get_index_of(sym) {
            return idx;
        }
        self.names.insert_full(sym.into()).0
    }

    pub fn idx(&self, sym: &str) -> Option<usize> {
        self.names.get_index_of(sym)
    }

    pub fn sym(&self, idx: usize) -> Option<&str> {
        self.names.get_index(idx).map(|s| s.as_str())
    }

    pub fn contains(&self, sym: &str) -> bool {
        self.names.contains(sym)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|s| s.as_str())
    }

    pub fn vec(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Symtab;

    #[test]
    fn test_new_is_empty() {
        let st = Symtab::new();
        assert_eq!(st.idx("anything"), None);
        assert_eq!(st.sym(0), None);
        assert!(st.is_empty());
    }

    #[test]
    fn test_duplicate_add_returns_same_index() {
        let mut st = Symtab::new();
        let first = st.add("dup");
        assert_eq!(st.add("other"), 1);
        let second = st.add("dup");
        assert_eq!(first, second);
        assert_eq!(st.sym(first), Some("dup"));
        assert_eq!(st.sym(2), None);
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let mut st = Symtab::new();
        for name in ["S", "Expr", "S", "Term", "Expr"] {
            st.add(name);
        }
        assert_eq!(st.iter().collect::<Vec<_>>(), vec!["S", "Expr", "Term"]);
        assert!(st.contains("Term"));
        assert_eq!(st.vec().len(), 3);
    }
}
