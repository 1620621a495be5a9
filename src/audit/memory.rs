//! audit::memory
//!
//! In-process audit log.

use parking_lot::Mutex;

use super::{AuditEntry, AuditError, AuditLog};

/// Audit log kept in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every entry, oldest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl AuditLog for MemoryAuditLog {
    fn record(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Mode;
    use crate::core::types::Actor;

    #[test]
    fn keeps_order() {
        let log = MemoryAuditLog::new();
        assert!(log.is_empty());

        let actor = Actor::new("staff").unwrap();
        let first = AuditEntry::new(actor.clone(), "a/b/c", Mode::DryRun);
        let second = AuditEntry::new(actor, "a/b/d", Mode::Commit);
        log.record(&first).unwrap();
        log.record(&second).unwrap();

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries(), vec![first, second]);
    }
}
