//! Unit tests for tm-schedule.

#[cfg(test)]
mod event_queue {
    use tm_core::Tick;

    use crate::EventQueue;

    #[test]
    fn pops_in_tick_order() {
        let mut q = EventQueue::new();
        q.push(Tick(2.0), "step 2");
        q.push(Tick(1.1), "prep stop");
        q.push(Tick(0.9), "art");
        q.push(Tick(1.0), "step 1");

        let order: Vec<_> = std::iter::from_fn(|| q.pop_next()).map(|(_, e)| e).collect();
        assert_eq!(order, ["art", "step 1", "prep stop", "step 2"]);
        assert!(q.is_empty());
    }

    #[test]
    fn same_tick_is_fifo() {
        let mut q = EventQueue::new();
        for i in 0..5 {
            q.push(Tick(3.0), i);
        }
        q.push(Tick(1.0), 99);
        assert_eq!(q.len(), 6);
        assert_eq!(q.tick_count(), 2);
        assert_eq!(q.pop_next(), Some((Tick(1.0), 99)));
        for i in 0..5 {
            assert_eq!(q.pop_next(), Some((Tick(3.0), i)));
        }
        assert_eq!(q.pop_next(), None);
    }

    #[test]
    fn cancel_removes_only_matching() {
        let mut q = EventQueue::new();
        q.push(Tick(5.1), 1);
        q.push(Tick(5.1), 2);
        q.push(Tick(5.1), 3);
        q.push(Tick(6.1), 2);

        assert_eq!(q.cancel(Tick(5.1), |&e| e == 2), 1);
        assert_eq!(q.len(), 3);
        assert_eq!(q.events_at(Tick(5.1)).copied().collect::<Vec<_>>(), [1, 3]);
        assert_eq!(q.events_at(Tick(6.1)).count(), 1);
        assert_eq!(q.cancel(Tick(7.0), |_| true), 0);
    }

    #[test]
    fn cancel_last_event_drops_tick() {
        let mut q = EventQueue::new();
        q.push(Tick(2.1), 'a');
        q.push(Tick(4.0), 'b');
        q.cancel(Tick(2.1), |_| true);
        assert_eq!(q.next_tick(), Some(Tick(4.0)));
        assert_eq!(q.tick_count(), 1);
    }

    #[test]
    fn empty_queue() {
        let mut q: EventQueue<u8> = EventQueue::new();
        assert!(q.is_empty());
        assert_eq!(q.next_tick(), None);
        assert_eq!(q.pop_next(), None);
    }
}

#[cfg(test)]
mod art_scheduler {
    use tm_core::{PersonId, Tick};

    use crate::ArtScheduler;

    #[test]
    fn first_add_creates_batch() {
        let mut s = ArtScheduler::new();
        assert!(s.add(Tick(9.9), PersonId(4)));
        assert!(!s.add(Tick(9.9), PersonId(1)));
        assert!(s.add(Tick(12.9), PersonId(2)));
        assert_eq!(s.len(), 2);
        assert_eq!(s.batch(Tick(9.9)), [PersonId(4), PersonId(1)]);
    }

    #[test]
    fn take_empties_batch() {
        let mut s = ArtScheduler::new();
        s.add(Tick(3.9), PersonId(0));
        assert_eq!(s.take(Tick(3.9)), vec![PersonId(0)]);
        assert!(s.take(Tick(3.9)).is_empty());
        assert!(s.is_empty());
        // A later diagnosis landing on the same tick starts a fresh batch.
        assert!(s.add(Tick(3.9), PersonId(7)));
    }
}
