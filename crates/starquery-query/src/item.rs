//! Query result items

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use starquery_core::{Assign, Call, Def, File, Load};

/// Discriminator of an [`Item`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemType {
    File,
    Def,
    Load,
    Call,
    Assign,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::File => "file",
            ItemType::Def => "def",
            ItemType::Load => "load",
            ItemType::Call => "call",
            ItemType::Assign => "assign",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fact produced by a query
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    File(Arc<File>),
    Def(Def),
    Load(Load),
    Call(Call),
    Assign(Assign),
}

/// Identity of an item for deduplication: two items with the same type,
/// file, name and line are the same fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemKey<'a> {
    pub item_type: ItemType,
    pub file: &'a str,
    pub name: &'a str,
    pub line: u32,
}

impl Item {
    pub fn item_type(&self) -> ItemType {
        match self {
            Item::File(_) => ItemType::File,
            Item::Def(_) => ItemType::Def,
            Item::Load(_) => ItemType::Load,
            Item::Call(_) => ItemType::Call,
            Item::Assign(_) => ItemType::Assign,
        }
    }

    /// Primary identifier: path, function, module label, callee or variable
    pub fn name(&self) -> &str {
        match self {
            Item::File(f) => &f.path,
            Item::Def(d) => &d.name,
            Item::Load(l) => &l.module,
            Item::Call(c) => &c.function,
            Item::Assign(a) => &a.name,
        }
    }

    /// Root-relative path the fact lives in; empty for external modules
    pub fn file(&self) -> &str {
        match self {
            Item::File(f) => &f.path,
            Item::Def(d) => &d.file,
            Item::Load(l) => &l.file,
            Item::Call(c) => &c.file,
            Item::Assign(a) => &a.file,
        }
    }

    /// 1-based line; file items are at line 1
    pub fn line(&self) -> u32 {
        match self {
            Item::File(_) => 1,
            Item::Def(d) => d.line,
            Item::Load(l) => l.line,
            Item::Call(c) => c.line,
            Item::Assign(a) => a.line,
        }
    }

    pub fn key(&self) -> ItemKey<'_> {
        ItemKey {
            item_type: self.item_type(),
            file: self.file(),
            name: self.name(),
            line: self.line(),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.item_type(),
            self.file(),
            self.name(),
            self.line()
        )
    }
}

/// Items produced by evaluating a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    items: Vec<Item>,
}

impl QueryResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect items, dropping later duplicates of the same fact
    pub fn deduped(items: Vec<Item>) -> Self {
        let keep: Vec<bool> = {
            let mut seen = HashSet::new();
            items.iter().map(|item| seen.insert(item.key())).collect()
        };
        items
            .into_iter()
            .zip(keep)
            .filter_map(|(item, keep)| keep.then_some(item))
            .collect()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Names of all items, in order
    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(Item::name).collect()
    }
}

impl From<Vec<Item>> for QueryResult {
    fn from(items: Vec<Item>) -> Self {
        Self { items }
    }
}

impl FromIterator<Item> for QueryResult {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for QueryResult {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
