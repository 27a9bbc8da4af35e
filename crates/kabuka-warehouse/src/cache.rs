use crate::period::Period;
use crate::symbols::SymbolMap;
use crate::table::PriceTable;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

type Key = (Period, SymbolMap);

/// Price tables memoized by the arguments that produced them.
///
/// Entries live for the lifetime of the process; nothing is ever evicted.
#[derive(Default)]
pub struct PriceCache {
    tables: Mutex<HashMap<Key, Arc<PriceTable>>>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, period: Period, symbols: &SymbolMap) -> Option<Arc<PriceTable>> {
        let tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        tables.get(&(period, symbols.clone())).cloned()
    }

    /// Store `table` unless another caller got there first, returning
    /// whichever table is now cached.
    pub fn insert(
        &self,
        period: Period,
        symbols: &SymbolMap,
        table: PriceTable,
    ) -> Arc<PriceTable> {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        tables
            .entry((period, symbols.clone()))
            .or_insert_with(|| Arc::new(table))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_on_period_and_symbols() {
        let cache = PriceCache::new();
        let symbols = SymbolMap::new([("apple", "AAPL")]).unwrap();

        let first = cache.insert(Period::OneMonth, &symbols, PriceTable::new());
        assert!(Arc::ptr_eq(&first, &cache.get(Period::OneMonth, &symbols).unwrap()));
        assert!(cache.get(Period::OneYear, &symbols).is_none());
        assert!(cache.get(Period::OneMonth, &SymbolMap::default()).is_none());

        // a later insert for the same key keeps the first table
        let second = cache.insert(Period::OneMonth, &symbols, PriceTable::new());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }
}
