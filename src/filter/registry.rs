use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::filter::raw::{
    FastaTaxonomyFilter, RawPatternFilter, SwissProtKeywordFilter, SwissProtTaxonomyFilter,
};
use crate::filter::Filter;
use crate::loader::DbFormat;

/// Builds a raw-entry filter from its argument text and inversion flag
pub type RawFilterFactory =
    Box<dyn Fn(&str, bool) -> Result<Box<dyn Filter<str>>> + Send + Sync>;

/// Named raw-entry filters, looked up per database format
pub struct FilterRegistry {
    factories: HashMap<(String, DbFormat), RawFilterFactory>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// `taxonomy` and `pattern` for both formats, `keyword` for SwissProt only
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register("taxonomy", DbFormat::SwissProt, |arg, inverted| {
            Ok(Box::new(SwissProtTaxonomyFilter::new(arg, inverted)))
        });
        registry.register("taxonomy", DbFormat::Fasta, |arg, inverted| {
            Ok(Box::new(FastaTaxonomyFilter::new(arg, inverted)))
        });
        registry.register("keyword", DbFormat::SwissProt, |arg, inverted| {
            Ok(Box::new(SwissProtKeywordFilter::new(arg, inverted)))
        });
        for format in [DbFormat::SwissProt, DbFormat::Fasta] {
            registry.register("pattern", format, |arg, inverted| {
                Ok(Box::new(RawPatternFilter::new(arg, inverted)?))
            });
        }

        registry
    }

    /// Register a factory, replacing any earlier one with the same name and format
    pub fn register<F>(&mut self, name: &str, format: DbFormat, factory: F)
    where
        F: Fn(&str, bool) -> Result<Box<dyn Filter<str>>> + Send + Sync + 'static,
    {
        self.factories
            .insert((name.to_lowercase(), format), Box::new(factory));
    }

    pub fn create(
        &self,
        name: &str,
        format: DbFormat,
        argument: &str,
        inverted: bool,
    ) -> Result<Box<dyn Filter<str>>> {
        let factory = self
            .factories
            .get(&(name.to_lowercase(), format))
            .ok_or_else(|| Error::UnknownFilter {
                name: name.to_string(),
                format: format.to_string(),
            })?;

        debug!(filter = name, %format, argument, inverted, "Creating filter");
        factory(argument, inverted)
    }

    /// Sorted names of the filters available for `format`
    pub fn names_for(&self, format: DbFormat) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .factories
            .keys()
            .filter(|(_, f)| *f == format)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
