use super::backend::Section;
use super::Transaction;
use crate::error::StoreError;
use crate::recording::RecordedRequest;

/// Named ends of the request queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    First,
    Last,
}

impl Position {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "first" => Some(Position::First),
            "last" => Some(Position::Last),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::First => "first",
            Position::Last => "last",
        }
    }

    /// Index this position refers to in a queue of `len` items.
    pub fn resolve(&self, len: usize) -> Option<usize> {
        match (self, len) {
            (_, 0) => None,
            (Position::First, _) => Some(0),
            (Position::Last, n) => Some(n - 1),
        }
    }
}

/// Request Queue for one scope, oldest first.
pub struct Requests<'t> {
    txn: &'t Transaction<'t>,
}

impl<'t> Requests<'t> {
    pub(super) fn new(txn: &'t Transaction<'t>) -> Self {
        Self { txn }
    }

    pub fn append(&self, request: RecordedRequest) -> Result<(), StoreError> {
        let mut list = self.read_all()?;
        list.push(request);
        self.replace(list)
    }

    pub fn read_all(&self) -> Result<Vec<RecordedRequest>, StoreError> {
        self.txn.load(Section::Requests)
    }

    /// 0-based read from the head.
    pub fn read_at(&self, index: usize) -> Result<RecordedRequest, StoreError> {
        self.read_all()?
            .into_iter()
            .nth(index)
            .ok_or_else(|| StoreError::NotFound(format!("Index {index} not found")))
    }

    /// Read without removing.
    pub fn peek(&self, position: Position) -> Result<RecordedRequest, StoreError> {
        let mut list = self.read_all()?;
        match position.resolve(list.len()) {
            Some(index) => Ok(list.swap_remove(index)),
            None => Err(StoreError::NotFound(format!(
                "{} not available",
                position.as_str()
            ))),
        }
    }

    /// Shift (`First`) or pop (`Last`), persisting the shortened queue.
    pub fn remove(&self, position: Position) -> Result<RecordedRequest, StoreError> {
        let mut list = self.read_all()?;
        let index = position.resolve(list.len()).ok_or_else(|| {
            StoreError::NotFound(format!("{} not possible", position.as_str()))
        })?;
        let request = list.remove(index);
        self.replace(list)?;
        Ok(request)
    }

    pub fn first(&self) -> Result<RecordedRequest, StoreError> {
        self.peek(Position::First)
    }

    pub fn last(&self) -> Result<RecordedRequest, StoreError> {
        self.peek(Position::Last)
    }

    pub fn remove_first(&self) -> Result<RecordedRequest, StoreError> {
        self.remove(Position::First)
    }

    pub fn remove_last(&self) -> Result<RecordedRequest, StoreError> {
        self.remove(Position::Last)
    }

    pub fn replace(&self, list: Vec<RecordedRequest>) -> Result<(), StoreError> {
        self.txn.save(Section::Requests, &list)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.txn.clear(Section::Requests)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        Ok(self.read_all()?.len())
    }
}
