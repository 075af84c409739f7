//! Single-threaded change notification.
//!
//! A [`Broadcaster`] fans a value out to every live [`Subscription`]. A
//! subscription is a `Stream`; dropping it removes the listener, so the
//! owner of the subscription controls how long it stays registered.

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::{Stream, StreamExt};
use std::cell::{Cell, RefCell};
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};

struct Listeners<T> {
    next_id: Cell<u64>,
    senders: RefCell<Vec<(u64, UnboundedSender<T>)>>,
}

pub struct Broadcaster<T> {
    inner: Rc<Listeners<T>>,
}

impl<T> Clone for Broadcaster<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone> Default for Broadcaster<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Broadcaster<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Listeners {
                next_id: Cell::new(0),
                senders: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn subscribe(&self) -> Subscription<T> {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let (tx, rx) = mpsc::unbounded();
        self.inner.senders.borrow_mut().push((id, tx));
        Subscription {
            id,
            rx,
            source: Rc::downgrade(&self.inner),
        }
    }

    pub fn publish(&self, value: T) {
        self.inner
            .senders
            .borrow_mut()
            .retain(|(_, tx)| tx.unbounded_send(value.clone()).is_ok());
    }

    pub fn listener_count(&self) -> usize {
        self.inner.senders.borrow().len()
    }
}

pub struct Subscription<T> {
    id: u64,
    rx: UnboundedReceiver<T>,
    source: Weak<Listeners<T>>,
}

impl<T> Subscription<T> {
    /// Same as dropping the handle; spelled out for call sites that want it visible.
    pub fn unsubscribe(self) {}
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(source) = self.source.upgrade() {
            source.senders.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.rx.poll_next_unpin(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn every_subscriber_sees_published_values() {
        let hub = Broadcaster::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        hub.publish(7_u32);

        assert_eq!(block_on(a.next()), Some(7));
        assert_eq!(block_on(b.next()), Some(7));
    }

    #[test]
    fn dropping_a_subscription_unsubscribes() {
        let hub = Broadcaster::<u32>::new();
        let a = hub.subscribe();
        let b = hub.subscribe();
        assert_eq!(hub.listener_count(), 2);

        drop(a);
        assert_eq!(hub.listener_count(), 1);

        b.unsubscribe();
        assert_eq!(hub.listener_count(), 0);
        hub.publish(1);
    }

    #[test]
    fn subscription_outliving_the_hub_ends_the_stream() {
        let hub = Broadcaster::<u32>::new();
        let mut sub = hub.subscribe();
        drop(hub);
        assert_eq!(block_on(sub.next()), None);
    }
}
