use strum_macros::{Display, EnumString};

use crate::filter::Filter;

/// How the children of a FilterCollection are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, clap::ValueEnum)]
#[strum(ascii_case_insensitive)]
pub enum CombineMode {
    #[strum(to_string = "AND")]
    And,
    #[strum(to_string = "OR")]
    Or,
}

/// A filter tree node combining its children with AND or OR
pub struct FilterCollection<T: ?Sized + 'static> {
    children: Vec<Box<dyn Filter<T>>>,
    mode: CombineMode,
    inverted: bool,
}

impl<T: ?Sized + 'static> FilterCollection<T> {
    pub fn new(mode: CombineMode, inverted: bool) -> Self {
        Self {
            children: Vec::new(),
            mode,
            inverted,
        }
    }

    pub fn and() -> Self {
        Self::new(CombineMode::And, false)
    }

    pub fn or() -> Self {
        Self::new(CombineMode::Or, false)
    }

    pub fn add(&mut self, filter: impl Filter<T> + 'static) {
        self.children.push(Box::new(filter));
    }

    pub fn add_boxed(&mut self, filter: Box<dyn Filter<T>>) {
        self.children.push(filter);
    }

    pub fn with(mut self, filter: impl Filter<T> + 'static) -> Self {
        self.add(filter);
        self
    }

    pub fn mode(&self) -> CombineMode {
        self.mode
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<T: ?Sized + 'static> Filter<T> for FilterCollection<T> {
    /// An empty AND collection passes everything and an empty OR collection passes nothing,
    /// before the inversion flag is applied
    fn passes(&self, input: &T) -> bool {
        let result = match self.mode {
            CombineMode::And => self.children.iter().all(|f| f.passes(input)),
            CombineMode::Or => self.children.iter().any(|f| f.passes(input)),
        };
        result ^ self.inverted
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::*;
    use crate::filter::{from_fn, Not};

    fn divisible_by(d: u32) -> impl Filter<u32> {
        from_fn(move |n: &u32| n % d == 0)
    }

    #[test]
    fn test_empty_collections() {
        assert!(FilterCollection::<u32>::and().passes(&1));
        assert!(!FilterCollection::<u32>::or().passes(&1));
        assert!(!FilterCollection::<u32>::new(CombineMode::And, true).passes(&1));
        assert!(FilterCollection::<u32>::new(CombineMode::Or, true).passes(&1));
    }

    #[test]
    fn test_nested_collections() {
        // (divisible by 2 AND divisible by 3) OR NOT(divisible by 5)
        let six = FilterCollection::and()
            .with(divisible_by(2))
            .with(divisible_by(3));
        let tree = FilterCollection::or()
            .with(six)
            .with(Not(divisible_by(5)));

        assert!(tree.passes(&12));
        assert!(tree.passes(&7));
        assert!(!tree.passes(&10));
        assert!(tree.passes(&30));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(CombineMode::from_str("and").unwrap(), CombineMode::And);
        assert_eq!(CombineMode::from_str("OR").unwrap(), CombineMode::Or);
        assert_eq!(CombineMode::And.to_string(), "AND");
    }

    proptest! {
        #[test]
        fn prop_composition_laws(a in 1u32..10, b in 1u32..10, x in 0u32..1000) {
            let pa = divisible_by(a).passes(&x);
            let pb = divisible_by(b).passes(&x);

            let and = FilterCollection::and().with(divisible_by(a)).with(divisible_by(b));
            let or = FilterCollection::or().with(divisible_by(a)).with(divisible_by(b));
            prop_assert_eq!(and.passes(&x), pa && pb);
            prop_assert_eq!(or.passes(&x), pa || pb);

            let inverted_and = FilterCollection::new(CombineMode::And, true)
                .with(divisible_by(a))
                .with(divisible_by(b));
            prop_assert_eq!(inverted_and.passes(&x), !(pa && pb));
            prop_assert_eq!(Not(inverted_and).passes(&x), pa && pb);
        }
    }
}
