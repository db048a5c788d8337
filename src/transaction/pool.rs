use std::collections::VecDeque;

use super::Transaction;

/// Ordered queue of transactions waiting for the next block.
///
/// The pool carries no locking of its own; the owning node keeps it behind
/// a mutex so `enqueue` and `drain_all` never interleave.
#[derive(Debug, Default)]
pub struct TransactionPool {
    pending: VecDeque<Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction and return its zero-based position in the queue.
    pub fn enqueue(&mut self, tx: Transaction) -> usize {
        self.pending.push_back(tx);
        self.pending.len() - 1
    }

    /// Remove and return everything currently queued, oldest first.
    pub fn drain_all(&mut self) -> Vec<Transaction> {
        self.pending.drain(..).collect()
    }

    /// Put transactions from an abandoned mining attempt back at the front,
    /// keeping their original order ahead of anything queued since.
    pub fn restore(&mut self, txs: Vec<Transaction>) {
        for tx in txs.into_iter().rev() {
            self.pending.push_front(tx);
        }
    }

    pub fn snapshot(&self) -> Vec<Transaction> {
        self.pending.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_reports_positions_in_order() {
        let mut pool = TransactionPool::new();
        assert_eq!(pool.enqueue(Transaction::new("Alice", "Bob", 10)), 0);
        assert_eq!(pool.enqueue(Transaction::new("Bob", "Charlie", 20)), 1);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn second_drain_is_empty() {
        let mut pool = TransactionPool::new();
        pool.enqueue(Transaction::new("Alice", "Bob", 10));
        pool.enqueue(Transaction::new("Bob", "Charlie", 20));

        let first = pool.drain_all();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].sender, "Alice");
        assert!(pool.drain_all().is_empty());
    }

    #[test]
    fn enqueue_after_drain_is_not_in_first_batch() {
        let mut pool = TransactionPool::new();
        pool.enqueue(Transaction::new("Alice", "Bob", 10));
        let first = pool.drain_all();

        pool.enqueue(Transaction::new("Carol", "Dave", 5));
        assert_eq!(first, vec![Transaction::new("Alice", "Bob", 10)]);
        assert_eq!(pool.drain_all(), vec![Transaction::new("Carol", "Dave", 5)]);
    }

    #[test]
    fn restore_puts_batch_back_in_front() {
        let mut pool = TransactionPool::new();
        pool.enqueue(Transaction::new("a", "b", 1));
        pool.enqueue(Transaction::new("c", "d", 2));
        let batch = pool.drain_all();
        pool.enqueue(Transaction::new("e", "f", 3));

        pool.restore(batch);
        let amounts: Vec<u64> = pool.snapshot().iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![1, 2, 3]);
    }
}
