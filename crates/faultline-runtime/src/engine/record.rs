//! Input records the engine can evaluate

use faultline_core::{Scenario, Value};
use std::collections::{BTreeMap, HashMap};

/// A feature lookup
pub trait Record {
    fn feature(&self, name: &str) -> Option<&Value>;
}

impl Record for BTreeMap<String, Value> {
    fn feature(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl Record for HashMap<String, Value> {
    fn feature(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl Record for Scenario {
    fn feature(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn feature(&self, name: &str) -> Option<&Value> {
        (**self).feature(name)
    }
}
