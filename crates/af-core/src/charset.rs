//! Active character pool and the add/remove instruction grammar.

use std::collections::BTreeSet;
use std::fmt;

/// Premier caractère imprimable accepté individuellement ('!').
pub const FIRST_PRINTABLE: char = '!';

/// Dernier caractère imprimable accepté ('~').
pub const LAST_PRINTABLE: char = '~';

/// L'espace n'est accepté que via l'instruction `space` ou `all`.
pub const SPACE: char = ' ';

/// Pool par défaut au démarrage : les chiffres.
pub const DEFAULT_POOL: &str = "0123456789";

/// True for ASCII 33..=126.
#[inline]
#[must_use]
pub fn is_printable(ch: char) -> bool {
    (FIRST_PRINTABLE..=LAST_PRINTABLE).contains(&ch)
}

/// One add/remove instruction as typed in the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolEdit {
    /// A single printable character.
    Single(char),
    /// The space character.
    Space,
    /// Space plus every printable character.
    All,
    /// Inclusive range between two printable characters, stored low..=high.
    Range(char, char),
}

impl PoolEdit {
    /// Parse `c`, `space`, `all` or `a-z`. Returns `None` on anything else.
    ///
    /// Range endpoints may be given in either order.
    ///
    /// # Example
    /// ```
    /// use af_core::charset::PoolEdit;
    /// assert_eq!(PoolEdit::parse("x"), Some(PoolEdit::Single('x')));
    /// assert_eq!(PoolEdit::parse("z-a"), Some(PoolEdit::Range('a', 'z')));
    /// assert_eq!(PoolEdit::parse("space"), Some(PoolEdit::Space));
    /// assert_eq!(PoolEdit::parse("ab"), None);
    /// ```
    #[must_use]
    pub fn parse(instruction: &str) -> Option<Self> {
        match instruction {
            "all" => return Some(Self::All),
            "space" => return Some(Self::Space),
            _ => {}
        }
        let chars: Vec<char> = instruction.chars().collect();
        match chars.as_slice() {
            [c] if is_printable(*c) => Some(Self::Single(*c)),
            [a, '-', b] if is_printable(*a) && is_printable(*b) => {
                Some(Self::Range(*a.min(b), *a.max(b)))
            }
            _ => None,
        }
    }

    /// Characters covered by this instruction, ascending.
    #[must_use]
    pub fn chars(&self) -> Vec<char> {
        match *self {
            Self::Single(c) => vec![c],
            Self::Space => vec![SPACE],
            Self::All => (SPACE..=LAST_PRINTABLE).collect(),
            Self::Range(lo, hi) => (lo..=hi).collect(),
        }
    }
}

/// The set of characters eligible for matching.
///
/// Backed by a `BTreeSet`, so iteration is always in character-code order.
///
/// # Example
/// ```
/// use af_core::charset::{CharPool, PoolEdit};
/// let mut pool = CharPool::default();
/// pool.insert_edit(PoolEdit::Range('a', 'c'));
/// pool.remove_edit(PoolEdit::Single('b'));
/// assert_eq!(pool.chars(), vec!['a', 'c']);
/// assert_eq!(pool.to_string(), "a c");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharPool {
    chars: BTreeSet<char>,
}

impl CharPool {
    /// Pool holding the accepted characters of `chars`; others are skipped.
    #[must_use]
    pub fn from_chars(chars: impl IntoIterator<Item = char>) -> Self {
        let mut pool = Self::default();
        for c in chars {
            if !pool.accept(c) {
                log::warn!("Ignoring unsupported pool character {c:?}");
            }
        }
        pool
    }

    fn accept(&mut self, ch: char) -> bool {
        if is_printable(ch) || ch == SPACE {
            self.chars.insert(ch);
            true
        } else {
            false
        }
    }

    /// Apply an add instruction. Returns the characters it covers.
    pub fn insert_edit(&mut self, edit: PoolEdit) -> Vec<char> {
        let chars = edit.chars();
        self.chars.extend(chars.iter().copied());
        chars
    }

    /// Apply a remove instruction. Returns how many characters were dropped.
    pub fn remove_edit(&mut self, edit: PoolEdit) -> usize {
        edit.chars()
            .into_iter()
            .filter(|c| self.chars.remove(c))
            .count()
    }

    #[must_use]
    pub fn contains(&self, ch: char) -> bool {
        self.chars.contains(&ch)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Characters in code order.
    #[must_use]
    pub fn chars(&self) -> Vec<char> {
        self.chars.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }
}

impl fmt::Display for CharPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.chars.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}
