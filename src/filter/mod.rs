//! Predicates over database entries.
//!
//! A filter looks at one kind of input: the raw text of an entry (`Filter<str>`),
//! a parsed SwissProt record (`Filter<ParsedRecord>`) or a decoded `Protein`.
//! Leaf filters take their inversion flag at construction time;
//! `FilterCollection` combines filters with AND/OR and `Not` negates any filter.

pub mod collection;
pub mod fields;
pub mod protein;
pub mod raw;
pub mod registry;

pub use collection::{CombineMode, FilterCollection};

pub trait Filter<T: ?Sized>: Send + Sync {
    fn passes(&self, input: &T) -> bool;
}

impl<T: ?Sized, F: Filter<T> + ?Sized> Filter<T> for Box<F> {
    fn passes(&self, input: &T) -> bool {
        (**self).passes(input)
    }
}

/// Passes exactly when the wrapped filter does not
#[derive(Debug, Clone)]
pub struct Not<F>(pub F);

impl<T: ?Sized, F: Filter<T>> Filter<T> for Not<F> {
    fn passes(&self, input: &T) -> bool {
        !self.0.passes(input)
    }
}

/// A filter backed by a plain predicate
pub struct FnFilter<P>(P);

pub fn from_fn<T: ?Sized, P: Fn(&T) -> bool + Send + Sync>(predicate: P) -> FnFilter<P> {
    FnFilter(predicate)
}

impl<T: ?Sized, P: Fn(&T) -> bool + Send + Sync> Filter<T> for FnFilter<P> {
    fn passes(&self, input: &T) -> bool {
        (self.0)(input)
    }
}

pub trait FilterExt<T: ?Sized>: Filter<T> + Sized {
    fn negate(self) -> Not<Self> {
        Not(self)
    }
}

impl<T: ?Sized, F: Filter<T>> FilterExt<T> for F {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_and_boxed_filters() {
        let even = from_fn(|n: &i32| n % 2 == 0);
        assert!(even.passes(&2));

        let odd = Not(even);
        assert!(odd.passes(&3));
        assert!(!odd.passes(&4));

        let boxed: Box<dyn Filter<i32>> = Box::new(odd);
        assert!(boxed.passes(&5));
        assert!(Not(boxed).passes(&6));
    }
}
