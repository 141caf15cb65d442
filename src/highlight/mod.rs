//! Cross-widget highlight state.
//!
//! The dashboard has a single "active highlight" value: hovering an insight
//! card highlights the matching chart and fades the others. [`HighlightStore`]
//! owns that value for one session and pushes every change to subscribers over
//! `std::sync::mpsc` channels.
//!
//! Semantics:
//! - last write wins; `clear` resets to no highlight
//! - subscribers receive changes only (re-setting the current value is silent)
//! - a dropped subscription is pruned on the next publish

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::domain::HighlightTarget;

/// Identifies a subscription for `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Receiving end of a highlight subscription.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: Receiver<Option<HighlightTarget>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// All pending changes, oldest first.
    pub fn pending(&self) -> Vec<Option<HighlightTarget>> {
        self.rx.try_iter().collect()
    }

    /// The most recent pending change, discarding older ones.
    ///
    /// `None` means nothing changed since the last call (or the store is gone).
    pub fn latest(&self) -> Option<Option<HighlightTarget>> {
        let mut last = None;
        loop {
            match self.rx.try_recv() {
                Ok(v) => last = Some(v),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return last,
            }
        }
    }
}

/// How a widget should render given the active highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Highlighted,
    Faded,
    Normal,
}

pub fn emphasis(active: Option<HighlightTarget>, widget: HighlightTarget) -> Emphasis {
    match active {
        None => Emphasis::Normal,
        Some(t) if t == widget => Emphasis::Highlighted,
        Some(_) => Emphasis::Faded,
    }
}

#[derive(Debug, Default)]
pub struct HighlightStore {
    current: Option<HighlightTarget>,
    subscribers: Vec<(SubscriberId, Sender<Option<HighlightTarget>>)>,
    next_id: u64,
}

impl HighlightStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<HighlightTarget> {
        self.current
    }

    pub fn emphasis(&self, widget: HighlightTarget) -> Emphasis {
        emphasis(self.current, widget)
    }

    pub fn set(&mut self, target: Option<HighlightTarget>) {
        if self.current == target {
            return;
        }
        self.current = target;
        log::debug!(
            "highlight -> {}",
            target.map(HighlightTarget::display_name).unwrap_or("none")
        );
        self.publish(target);
    }

    /// Hover semantics: entering a widget with a target highlights it, leaving resets.
    pub fn hover(&mut self, target: Option<HighlightTarget>, active: bool) {
        self.set(if active { target } else { None });
    }

    pub fn clear(&mut self) {
        self.set(None);
    }

    pub fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, tx));
        Subscription { id, rx }
    }

    /// Returns `false` if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn publish(&mut self, value: Option<HighlightTarget>) {
        self.subscribers.retain(|(_, tx)| tx.send(value).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_and_last_write_wins() {
        let mut store = HighlightStore::new();
        assert_eq!(store.current(), None);

        store.set(Some(HighlightTarget::Price));
        store.set(Some(HighlightTarget::Driver));
        assert_eq!(store.current(), Some(HighlightTarget::Driver));

        store.clear();
        assert_eq!(store.current(), None);
    }

    #[test]
    fn subscribers_see_changes_in_order() {
        let mut store = HighlightStore::new();
        let sub = store.subscribe();

        store.set(Some(HighlightTarget::Price));
        store.set(Some(HighlightTarget::Price));
        store.set(Some(HighlightTarget::Volatility));
        store.clear();

        assert_eq!(
            sub.pending(),
            vec![
                Some(HighlightTarget::Price),
                Some(HighlightTarget::Volatility),
                None
            ]
        );
        assert!(sub.pending().is_empty());
    }

    #[test]
    fn latest_skips_intermediate_values() {
        let mut store = HighlightStore::new();
        let sub = store.subscribe();
        assert_eq!(sub.latest(), None);

        store.set(Some(HighlightTarget::Price));
        store.set(Some(HighlightTarget::Driver));
        assert_eq!(sub.latest(), Some(Some(HighlightTarget::Driver)));
        assert_eq!(sub.latest(), None);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut store = HighlightStore::new();
        let a = store.subscribe();
        let b = store.subscribe();
        assert_ne!(a.id(), b.id());

        assert!(store.unsubscribe(a.id()));
        assert!(!store.unsubscribe(a.id()));
        store.set(Some(HighlightTarget::Volatility));

        assert!(a.pending().is_empty());
        assert_eq!(b.pending(), vec![Some(HighlightTarget::Volatility)]);
    }

    #[test]
    fn dropped_subscriptions_are_pruned() {
        let mut store = HighlightStore::new();
        let keep = store.subscribe();
        drop(store.subscribe());
        assert_eq!(store.subscriber_count(), 2);

        store.set(Some(HighlightTarget::Price));
        assert_eq!(store.subscriber_count(), 1);
        assert_eq!(keep.pending().len(), 1);
    }

    #[test]
    fn hover_and_emphasis() {
        let mut store = HighlightStore::new();
        store.hover(Some(HighlightTarget::Price), true);
        assert_eq!(store.emphasis(HighlightTarget::Price), Emphasis::Highlighted);
        assert_eq!(store.emphasis(HighlightTarget::Driver), Emphasis::Faded);

        store.hover(Some(HighlightTarget::Price), false);
        assert_eq!(store.emphasis(HighlightTarget::Driver), Emphasis::Normal);

        // A card without a target never highlights anything.
        store.hover(None, true);
        assert_eq!(store.current(), None);
    }
}
