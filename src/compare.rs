//! Orderings over map keys.
//!
//! A [`TreeMap`](crate::TreeMap) never looks at its keys itself; every
//! decision goes through a [`Comparator`] fixed at construction.  Plain
//! closures of type `Fn(&K, &K) -> Ordering` are comparators, and
//! [`LessThan`] adapts a strict "is less than" predicate.

use std::cmp::Ordering::{self, *};

/// A total order over keys of type `K`.
///
/// Implementations must be consistent: if `compare(a, b)` is `Less` then
/// `compare(b, a)` is `Greater`, and the relation is transitive.  Two keys are
/// the same key exactly when `compare` returns `Equal`.
pub trait Comparator<K: ?Sized> {
    /// Three-way comparison of `a` against `b`.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// The key type's own [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Natural;

impl<K: Ord + ?Sized> Comparator<K> for Natural {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

/// Builds a three-way comparison out of a strict less-than predicate.
///
/// Keys `a` and `b` are equal when neither `a < b` nor `b < a` holds.
///
/// # Examples
/// ```
/// use cursor_bst::{Comparator, LessThan};
/// use std::cmp::Ordering;
///
/// let by_len = LessThan(|a: &&str, b: &&str| a.len() < b.len());
/// assert_eq!(by_len.compare(&"ab", &"xy"), Ordering::Equal);
/// assert_eq!(by_len.compare(&"a", &"xy"), Ordering::Less);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct LessThan<F>(pub F);

impl<K: ?Sized, F> Comparator<K> for LessThan<F>
where
    F: Fn(&K, &K) -> bool,
{
    fn compare(&self, a: &K, b: &K) -> Ordering {
        if (self.0)(a, b) {
            Less
        } else if (self.0)(b, a) {
            Greater
        } else {
            Equal
        }
    }
}

/// Flips the order of another comparator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reversed<C>(pub C);

impl<K: ?Sized, C: Comparator<K>> Comparator<K> for Reversed<C> {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self.0.compare(b, a)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn less_than_agrees_with_ord() {
        let lt = LessThan(|a: &i32, b: &i32| a < b);
        for a in -3..3 {
            for b in -3..3 {
                assert_eq!(lt.compare(&a, &b), Natural.compare(&a, &b));
            }
        }
    }

    #[test]
    fn closures_and_reversal() {
        let by_abs = |a: &i32, b: &i32| a.abs().cmp(&b.abs());
        assert_eq!(by_abs.compare(&-4, &4), Equal);
        assert_eq!(by_abs.compare(&-5, &4), Greater);
        assert_eq!(Reversed(by_abs).compare(&-5, &4), Less);
        assert_eq!(Reversed(Natural).compare("a", "b"), Greater);
    }
}
