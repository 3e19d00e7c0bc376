//! Publish/subscribe channel for canonical content mutations

use crate::content::BlockId;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

/// A mutation applied to the canonical content by an outside collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum ContentChange {
    /// One block's markup changed (e.g. text wrapped in a highlight marker)
    Replaced { block: BlockId, html: String },
    /// Fresh document-order snapshot of every block
    Reset { blocks: Vec<String> },
}

/// Receiving end, owned by the reader session
#[derive(Debug, Default)]
pub struct ContentChannel {
    queue: Rc<RefCell<VecDeque<ContentChange>>>,
}

impl ContentChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a publishing handle
    pub fn publisher(&self) -> ContentPublisher {
        ContentPublisher {
            queue: Rc::downgrade(&self.queue),
        }
    }

    /// Take every pending change as one batch, oldest first
    pub fn drain(&self) -> Vec<ContentChange> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.borrow().is_empty()
    }
}

/// Sending end given to the highlighting collaborator
#[derive(Debug, Clone)]
pub struct ContentPublisher {
    queue: Weak<RefCell<VecDeque<ContentChange>>>,
}

impl ContentPublisher {
    /// Queue a change. Returns false once the reader session is gone.
    pub fn publish(&self, change: ContentChange) -> bool {
        match self.queue.upgrade() {
            Some(queue) => {
                queue.borrow_mut().push_back(change);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_in_order() {
        let channel = ContentChannel::new();
        let publisher = channel.publisher();

        assert!(publisher.publish(ContentChange::Replaced {
            block: BlockId(0),
            html: "a".into(),
        }));
        assert!(publisher.publish(ContentChange::Reset {
            blocks: vec!["b".into()],
        }));
        assert!(channel.has_pending());

        let batch = channel.drain();
        assert_eq!(batch.len(), 2);
        assert!(matches!(batch[0], ContentChange::Replaced { .. }));
        assert!(!channel.has_pending());
        assert!(channel.drain().is_empty());
    }

    #[test]
    fn test_publish_after_drop() {
        let channel = ContentChannel::new();
        let publisher = channel.publisher();
        drop(channel);

        assert!(!publisher.publish(ContentChange::Reset { blocks: Vec::new() }));
    }
}
