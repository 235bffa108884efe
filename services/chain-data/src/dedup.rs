//! Order- and duplicate-preserving batch deduplication.

use std::collections::HashMap;

/// Deduplicate `items` while remembering, for every original position,
/// which slot in the returned unique list it maps to.
pub fn dedupe_preserve_order(items: &[String]) -> (Vec<String>, Vec<usize>) {
 let mut unique = Vec::new();
 let mut index_of: HashMap<&str, usize> = HashMap::new();
 let mut mapping = Vec::with_capacity(items.len());

 for item in items {
 let idx = *index_of.entry(item.as_str()).or_insert_with(|| {
 unique.push(item.clone());
 unique.len() - 1
 });
 mapping.push(idx);
 }

 (unique, mapping)
}
