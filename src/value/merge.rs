use super::{ConfigObject, ConfigValue, ValueKind};
use crate::Origin;

impl ConfigValue {
    /// Fallback composition: self wins, `fallback` fills gaps.
    ///
    /// Objects merge key-wise (recursing where both sides are objects); a
    /// resolved non-object keeps itself; an unmergeable side defers the whole
    /// decision into a flat delayed-merge stack.
    pub fn with_fallback(&self, fallback: &ConfigValue) -> ConfigValue {
        if self.ignores_fallbacks() {
            return self.clone();
        }
        if self.is_unmergeable() || fallback.is_unmergeable() {
            let mut stack = self.unmerged_values();
            stack.extend(fallback.unmerged_values());
            let origin = Origin::merge(self.origin(), fallback.origin());
            return ConfigValue::delayed(origin, stack);
        }
        match (self.kind(), fallback.kind()) {
            (ValueKind::Object(primary), ValueKind::Object(under)) => {
                let origin = Origin::merge(self.origin(), fallback.origin());
                ConfigValue::object(origin, merge_objects(primary, under))
            }
            (ValueKind::Object(primary), _) => {
                // a non-object fallback hides anything that could come after
                // it, so the merged object can ignore further fallbacks
                let mut merged = primary.clone();
                merged.set_ignores_fallbacks(true);
                ConfigValue::object(self.origin().clone(), merged)
            }
            _ => self.clone(),
        }
    }
}

/// Key-wise merge. The fallback's keys come first in fallback order (so a
/// tree built from duplicate assignments keeps first-seen key order), then
/// primary-only keys in primary order; for a key on both sides the primary's
/// value wins, merged over the fallback's.
fn merge_objects(primary: &ConfigObject, under: &ConfigObject) -> ConfigObject {
    let mut merged = ConfigObject::new();
    for (key, under_value) in under.iter() {
        match primary.get(key) {
            Some(value) => merged.insert(key.to_string(), value.with_fallback(under_value)),
            None => merged.insert(key.to_string(), under_value.clone()),
        }
    }
    for (key, value) in primary.iter() {
        if !under.contains_key(key) {
            merged.insert(key.to_string(), value.clone());
        }
    }
    merged.set_ignores_fallbacks(under.ignores_fallbacks);
    merged
}
