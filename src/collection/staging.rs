//! Pre-commit holding area for documents.

use ahash::AHashMap;

/// Documents staged since the last commit, keyed by document id.
///
/// Staging the same id twice keeps only the later text.
#[derive(Debug, Clone, Default)]
pub struct StagingBuffer {
    documents: AHashMap<String, String>,
}

impl StagingBuffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        StagingBuffer {
            documents: AHashMap::new(),
        }
    }

    /// Insert or overwrite a document. Returns the text it replaced.
    pub fn stage(&mut self, doc_id: String, text: String) -> Option<String> {
        self.documents.insert(doc_id, text)
    }

    /// Number of staged documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Drain the buffer, leaving it empty.
    pub fn take(&mut self) -> Vec<(String, String)> {
        self.documents.drain().collect()
    }

    /// Put back documents drained by [`take`](Self::take) after a failed
    /// commit. Documents staged since the drain are newer and win.
    pub fn restore(&mut self, documents: Vec<(String, String)>) {
        for (doc_id, text) in documents {
            self.documents.entry(doc_id).or_insert(text);
        }
    }

    /// Discard everything staged.
    pub fn clear(&mut self) {
        self.documents.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut buffer = StagingBuffer::new();
        assert_eq!(buffer.stage("a".into(), "one".into()), None);
        assert_eq!(buffer.stage("a".into(), "two".into()), Some("one".into()));

        assert_eq!(buffer.take(), vec![("a".into(), "two".into())]);
    }

    #[test]
    fn test_take_drains() {
        let mut buffer = StagingBuffer::new();
        buffer.stage("a".into(), "x".into());
        buffer.stage("b".into(), "y".into());

        let mut taken = buffer.take();
        taken.sort();
        assert_eq!(
            taken,
            vec![("a".into(), "x".into()), ("b".into(), "y".into())]
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_restore_prefers_newer() {
        let mut buffer = StagingBuffer::new();
        buffer.stage("a".into(), "old".into());
        buffer.stage("b".into(), "kept".into());
        let taken = buffer.take();

        buffer.stage("a".into(), "newer".into());
        buffer.restore(taken);

        let mut restored = buffer.take();
        restored.sort();
        assert_eq!(
            restored,
            vec![("a".into(), "newer".into()), ("b".into(), "kept".into())]
        );
    }

    #[test]
    fn test_clear() {
        let mut buffer = StagingBuffer::new();
        buffer.stage("a".into(), "x".into());
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.take().is_empty());
    }
}
