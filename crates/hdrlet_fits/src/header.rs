//! Ordered header of one extension.
//!
//! Card order is significant and duplicate keywords are allowed (`HISTORY`,
//! record-valued `DPj` cards). Lookups return the first matching card.

use crate::card::{Card, Value};

/// Ordered list of header cards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    cards: Vec<Card>,
}

impl Header {
    /// Create an empty header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a header from existing cards.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// All cards in order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Number of cards.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the header has no cards.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// First card with the given keyword.
    pub fn card(&self, keyword: &str) -> Option<&Card> {
        let keyword = keyword.to_uppercase();
        self.cards.iter().find(|c| c.keyword() == keyword)
    }

    /// All cards with the given keyword, in order.
    pub fn cards_named<'a>(&'a self, keyword: &str) -> impl Iterator<Item = &'a Card> + 'a {
        let keyword = keyword.to_uppercase();
        self.cards.iter().filter(move |c| c.keyword() == keyword)
    }

    /// All cards whose keyword starts with `prefix`, in order.
    pub fn cards_with_prefix<'a>(&'a self, prefix: &str) -> impl Iterator<Item = &'a Card> + 'a {
        let prefix = prefix.to_uppercase();
        self.cards
            .iter()
            .filter(move |c| c.keyword().starts_with(&prefix))
    }

    /// Index of the first card with the given keyword.
    pub fn index_of(&self, keyword: &str) -> Option<usize> {
        let keyword = keyword.to_uppercase();
        self.cards.iter().position(|c| c.keyword() == keyword)
    }

    /// Whether a card with the given keyword exists.
    pub fn contains(&self, keyword: &str) -> bool {
        self.index_of(keyword).is_some()
    }

    /// Value of the first card with the given keyword.
    pub fn get(&self, keyword: &str) -> Option<&Value> {
        self.card(keyword).map(|c| c.value())
    }

    /// String value of a keyword.
    pub fn get_str(&self, keyword: &str) -> Option<&str> {
        self.get(keyword).and_then(|v| v.as_str())
    }

    /// String value of a keyword, ignoring blank strings.
    pub fn get_nonblank(&self, keyword: &str) -> Option<&str> {
        self.get_str(keyword)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Integer value of a keyword.
    pub fn get_int(&self, keyword: &str) -> Option<i64> {
        self.get(keyword).and_then(|v| v.as_i64())
    }

    /// Numeric value of a keyword.
    pub fn get_float(&self, keyword: &str) -> Option<f64> {
        self.get(keyword).and_then(|v| v.as_f64())
    }

    /// Logical value of a keyword.
    pub fn get_bool(&self, keyword: &str) -> Option<bool> {
        self.get(keyword).and_then(|v| v.as_bool())
    }

    /// Set a keyword: updates the first existing card in place (keeping its
    /// position, replacing its comment when one is given), else appends.
    pub fn set(&mut self, keyword: &str, value: impl Into<Value>, comment: &str) {
        let value = value.into();
        match self.index_of(keyword) {
            Some(idx) => {
                let old_comment = self.cards[idx].comment_text().to_string();
                let comment = if comment.is_empty() {
                    old_comment.as_str()
                } else {
                    comment
                };
                self.cards[idx] = Card::new(keyword, value, comment);
            }
            None => self.cards.push(Card::new(keyword, value, comment)),
        }
    }

    /// Append a card, even if the keyword already exists.
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Insert a card at `index` (clamped to the end).
    pub fn insert(&mut self, index: usize, card: Card) {
        let index = index.min(self.cards.len());
        self.cards.insert(index, card);
    }

    /// Insert a card directly after the first card with keyword `after`,
    /// or append it when `after` is absent.
    pub fn insert_after(&mut self, after: &str, card: Card) {
        match self.index_of(after) {
            Some(idx) => self.insert(idx + 1, card),
            None => self.push(card),
        }
    }

    /// Remove the first card with the given keyword.
    pub fn remove(&mut self, keyword: &str) -> Option<Card> {
        self.index_of(keyword).map(|idx| self.cards.remove(idx))
    }

    /// Remove every card with the given keyword. Returns the number removed.
    pub fn remove_all(&mut self, keyword: &str) -> usize {
        let keyword = keyword.to_uppercase();
        let before = self.cards.len();
        self.cards.retain(|c| c.keyword() != keyword);
        before - self.cards.len()
    }

    /// Keep only the cards for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&Card) -> bool) {
        self.cards.retain(keep);
    }
}

impl<'a> IntoIterator for &'a Header {
    type Item = &'a Card;
    type IntoIter = std::slice::Iter<'a, Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.iter()
    }
}
