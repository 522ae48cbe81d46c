//! # An ordered map on a plain binary search tree
//!
//! `cursor-bst` provides [`TreeMap`], a key-value map kept in an unbalanced
//! binary search tree and ordered by a comparator chosen at construction.
//! Alongside the usual lookups and removals, the map remembers the last entry
//! it touched and can resume an ascending walk from there with
//! [`TreeMap::next`].  The tree never rebalances, so sorted insertions degrade
//! it into a list; reach for `std::collections::BTreeMap` if that matters.

mod compare;
pub use compare::{Comparator, LessThan, Natural, Reversed};

mod error;
pub use error::TreeMapError;

mod tree_map;
pub use tree_map::{Iter, TreeMap};
