use super::backend::Section;
use super::Transaction;
use crate::error::StoreError;
use crate::expectation::Expectation;

/// Expectation Store for one scope, in evaluation order (newest first).
pub struct Expectations<'t> {
    txn: &'t Transaction<'t>,
}

impl<'t> Expectations<'t> {
    pub(super) fn new(txn: &'t Transaction<'t>) -> Self {
        Self { txn }
    }

    /// Insert at the front; it is evaluated before everything registered earlier.
    pub fn prepend(&self, expectation: Expectation) -> Result<(), StoreError> {
        let mut list = self.read_all()?;
        list.insert(0, expectation);
        self.replace(list)
    }

    pub fn read_all(&self) -> Result<Vec<Expectation>, StoreError> {
        self.txn.load(Section::Expectations)
    }

    /// Overwrite the full list.
    pub fn replace(&self, list: Vec<Expectation>) -> Result<(), StoreError> {
        self.txn.save(Section::Expectations, &list)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.txn.clear(Section::Expectations)
    }
}

#[cfg(test)]
mod tests {
    use crate::expectation::{Expectation, ResponseSpec};
    use crate::state::{ScopeKey, State};

    fn expectation(status: u16) -> Expectation {
        Expectation::new(
            Vec::new(),
            ResponseSpec {
                status,
                ..Default::default()
            },
            None,
        )
    }

    #[test]
    fn test_prepend_puts_newest_first() {
        let state = State::in_memory();
        let scope = ScopeKey::new("t");
        let statuses = state
            .transaction(&scope, |txn| {
                let store = txn.expectations();
                store.prepend(expectation(201))?;
                store.prepend(expectation(202))?;
                store.prepend(expectation(203))?;
                store.read_all()
            })
            .unwrap()
            .iter()
            .map(|e| e.response.status)
            .collect::<Vec<_>>();
        assert_eq!(statuses, vec![203, 202, 201]);
    }

    #[test]
    fn test_duplicates_allowed_and_clear() {
        let state = State::in_memory();
        let scope = ScopeKey::new("t");
        state
            .transaction(&scope, |txn| {
                let store = txn.expectations();
                store.prepend(expectation(200))?;
                store.prepend(expectation(200))?;
                assert_eq!(store.read_all()?.len(), 2);
                store.clear()?;
                assert!(store.read_all()?.is_empty());
                Ok::<_, crate::error::StoreError>(())
            })
            .unwrap();
    }

    #[test]
    fn test_replace_overwrites() {
        let state = State::in_memory();
        let scope = ScopeKey::new("t");
        let list = state
            .transaction(&scope, |txn| {
                let store = txn.expectations();
                store.prepend(expectation(200))?;
                store.replace(vec![expectation(404), expectation(500)])?;
                store.read_all()
            })
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].response.status, 404);
    }
}
