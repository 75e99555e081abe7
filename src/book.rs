//! Opening book: a handful of recommended first moves loaded once and
//! baked into the fresh tree's priors as bonus visits, exactly the way
//! [`crate::tree::apply_priors`] bakes in capture/pattern/CFG priors. The
//! on-disk format itself is intentionally tiny (one `coord weight` pair per
//! line) — the reference engine's real book format (compressed, fuzzy
//! hash-matched against arbitrary positions) is out of scope here.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::position::{parse_coord, Point};
use crate::tree::Tree;

#[derive(Debug, Clone, Copy)]
pub struct BookEntry {
    pub coord: Point,
    pub weight: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Book {
    entries: Vec<BookEntry>,
}

impl Book {
    pub fn empty() -> Self {
        Book { entries: Vec::new() }
    }

    /// Load a book file: one `COORD WEIGHT` pair per line, blank lines and
    /// `#`-prefixed lines ignored.
    pub fn load(path: impl AsRef<Path>) -> Result<Book> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading opening book at {}", path.display()))?;

        let mut entries = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let coord_str = parts
                .next()
                .with_context(|| format!("malformed book line: {line:?}"))?;
            let weight: u32 = parts
                .next()
                .with_context(|| format!("malformed book line: {line:?}"))?
                .parse()
                .with_context(|| format!("invalid weight in book line: {line:?}"))?;
            entries.push(BookEntry { coord: parse_coord(coord_str), weight });
        }
        Ok(Book { entries })
    }

    /// Bake this book's entries into `tree`'s root children as additional
    /// prior playouts (full value, i.e. a recommended move, never a
    /// discouraged one). Only meaningful on a tree whose root hasn't been
    /// searched yet, since it mutates `prior` directly.
    pub fn apply(&self, tree: &mut Tree) {
        for entry in &self.entries {
            if let Some(child) = tree.root.children.iter_mut().find(|c| c.mv == entry.coord) {
                child.prior.playouts += entry.weight;
                child.prior.value_sum_doubled += (entry.weight * 2) as i64;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{Color, Position};
    use crate::tree::expand;

    #[test]
    fn empty_book_leaves_tree_untouched() {
        let board = Position::new();
        let mut tree = Tree::init(Color::Black);
        let mut nc = 1u64;
        expand(&mut tree.root, &board, &mut nc);
        let before: Vec<_> = tree.root.children.iter().map(|c| c.prior.playouts).collect();

        Book::empty().apply(&mut tree);

        let after: Vec<_> = tree.root.children.iter().map(|c| c.prior.playouts).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn book_entry_adds_prior_weight_to_matching_child() {
        let board = Position::new();
        let mut tree = Tree::init(Color::Black);
        let mut nc = 1u64;
        expand(&mut tree.root, &board, &mut nc);
        let mv = tree.root.children[0].mv;
        let before = tree.root.children[0].prior.playouts;

        let book = Book { entries: vec![BookEntry { coord: mv, weight: 50 }] };
        book.apply(&mut tree);

        assert_eq!(tree.root.children[0].prior.playouts, before + 50);
    }
}
