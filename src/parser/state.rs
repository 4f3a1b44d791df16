/// A list block currently being parsed. The first item's marker column is
/// the list's indentation; sibling markers must sit at the same column.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpenList {
    pub indentation: usize,
    pub ordered: bool,
}

/// An item currently being parsed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpenItem {
    pub indentation: usize,
}

/// Mutable parsing context: the stacks of open block constructs and the
/// counters the lookahead predicates consult.
#[derive(Debug, Default)]
pub(crate) struct ParserState {
    /// Number of nested `>` contexts currently open.
    pub quote_level: usize,
    pub lists: Vec<OpenList>,
    pub items: Vec<OpenItem>,
    /// Inside a header, the text lookahead stops before trailing `#` runs.
    pub in_header: bool,
    /// Bracket nesting inside link text.
    pub bracket_depth: usize,
    /// Parenthesis nesting inside an inline link URL.
    pub paren_depth: usize,
    /// Guard against pathological nesting.
    pub nesting_depth: usize,
}

impl ParserState {
    pub fn current_item(&self) -> Option<&OpenItem> {
        self.items.last()
    }

    pub fn current_list(&self) -> Option<&OpenList> {
        self.lists.last()
    }
}
