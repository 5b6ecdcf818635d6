use dashmap::DashMap;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tabsplit_application::{BillRepository, RepositoryError};
use tabsplit_domain::{Bill, BillId, ChatId};

/// Process-local bill storage.
///
/// Open bills live in `active`, one per chat. Saving a bill that is no longer
/// open moves it into the chat's history, newest last.
#[derive(Clone)]
pub struct InMemoryBillRepository {
    active: Arc<DashMap<ChatId, Bill>>,
    history: Arc<DashMap<ChatId, Vec<Bill>>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryBillRepository {
    pub fn new() -> Self {
        Self {
            active: Arc::new(DashMap::new()),
            history: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn history_len(&self, chat: ChatId) -> usize {
        self.history.get(&chat).map_or(0, |bills| bills.len())
    }
}

impl Default for InMemoryBillRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl BillRepository for InMemoryBillRepository {
    fn find_active(&self, chat: ChatId) -> Result<Option<Bill>, RepositoryError> {
        Ok(self.active.get(&chat).map(|bill| bill.value().clone()))
    }

    fn save(&self, bill: &Bill) -> Result<(), RepositoryError> {
        let chat = bill.chat();
        if bill.is_open() {
            self.active.insert(chat, bill.clone());
            return Ok(());
        }

        self.active.remove_if(&chat, |_, active| active.id() == bill.id());
        let mut closed = self.history.entry(chat).or_default();
        match closed.iter_mut().find(|stored| stored.id() == bill.id()) {
            Some(stored) => *stored = bill.clone(),
            None => closed.push(bill.clone()),
        }
        tracing::debug!(chat_id = chat.0, bill_id = bill.id().0, state = %bill.state(), "Bill moved to history");
        Ok(())
    }

    fn delete(&self, chat: ChatId, bill: BillId) -> Result<(), RepositoryError> {
        self.active.remove_if(&chat, |_, active| active.id() == bill);
        if let Some(mut closed) = self.history.get_mut(&chat) {
            closed.retain(|stored| stored.id() != bill);
        }
        Ok(())
    }

    fn recent_finalized(&self, chat: ChatId, limit: usize) -> Result<Vec<Bill>, RepositoryError> {
        let Some(closed) = self.history.get(&chat) else {
            return Ok(Vec::new());
        };
        let mut bills: Vec<Bill> = closed.iter().cloned().collect();
        bills.sort_by(|a, b| b.finalized_at().cmp(&a.finalized_at()));
        bills.truncate(limit);
        Ok(bills)
    }

    fn next_id(&self) -> Result<BillId, RepositoryError> {
        Ok(BillId(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }
}
