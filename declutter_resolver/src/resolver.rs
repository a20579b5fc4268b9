// Copyright 2025 the Declutter Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The resolver: coalesces overlap-check requests into batched passes.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use declutter_index::{
    Backend, DualTree, IntersectIndexGeneric, Intersections, MarkerFlags, MarkerKey, RectSource,
};

use crate::pending::Pending;

/// Handle returned by [`Resolver::on_intersect`], used to unsubscribe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(usize);

type HandlerSlot<P> = Option<Box<dyn FnMut(&Intersections<P>)>>;

/// Owns an overlap index and decouples "a marker moved" from "run a pass".
///
/// Marker animation updates coordinates far more often than an overlap pass
/// is worth running, so mutations only accumulate pending work. The host loop
/// calls [`commit`](Self::commit) once per tick; however many markers moved
/// since the last tick, exactly one pass runs, and one [`Intersections`]
/// event reaches the subscribers.
///
/// Two kinds of work are tracked: a set of individually scheduled markers
/// (movement), or the check-everything sentinel (zoom, which invalidates
/// every icon extent). The sentinel absorbs individual requests until the
/// next commit.
///
/// Mutation and draining happen on the same thread, matching a cooperative
/// event loop. A multi-threaded host must add its own locking around the
/// resolver to keep the coalescing guarantee.
pub struct Resolver<T, P, B = DualTree<T>>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T>,
{
    index: IntersectIndexGeneric<T, P, B>,
    pending: Pending,
    visible: bool,
    handlers: Vec<HandlerSlot<P>>,
}

impl<T, P, B> Debug for Resolver<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T> + Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let subscribers = self.handlers.iter().filter(|h| h.is_some()).count();
        f.debug_struct("Resolver")
            .field("index", &self.index)
            .field("pending", &self.pending)
            .field("visible", &self.visible)
            .field("subscribers", &subscribers)
            .finish_non_exhaustive()
    }
}

impl<T, P, B> Default for Resolver<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P, B> Resolver<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T> + Default,
{
    /// Create an empty, visible resolver.
    pub fn new() -> Self {
        Self {
            index: IntersectIndexGeneric::new(),
            pending: Pending::new(),
            visible: true,
            handlers: Vec::new(),
        }
    }
}

impl<T, P, B> Resolver<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T>,
{
    /// Register a marker and schedule its first overlap check.
    pub fn add(&mut self, x: T, y: T, payload: P) -> MarkerKey {
        self.add_with_flags(x, y, payload, MarkerFlags::default())
    }

    /// Register a marker with explicit flags.
    pub fn add_with_flags(&mut self, x: T, y: T, payload: P, flags: MarkerFlags) -> MarkerKey {
        let key = self.index.insert_with_flags(x, y, payload, flags);
        self.pending.request(key);
        key
    }

    /// React to a marker's location change: re-key it and schedule a check.
    pub fn marker_moved(&mut self, key: MarkerKey, x: T, y: T) {
        self.index.update(key, x, y);
        self.pending.request(key);
    }

    /// Unregister a marker.
    ///
    /// Its current overlap partners are scheduled for re-check first, so a
    /// cluster that shrinks to one marker gets its leftover offset cleared
    /// on the next commit.
    pub fn remove(&mut self, key: MarkerKey, rects: &impl RectSource<T>) {
        if self.index.contains(key) {
            let partners = self.partners_of(key, rects);
            self.request_check(partners);
        }
        self.pending.discard(key);
        self.index.remove(key);
    }

    /// Show or hide a single marker.
    ///
    /// Hiding schedules the marker's former partners; showing schedules the
    /// marker itself.
    pub fn set_marker_visible(&mut self, key: MarkerKey, visible: bool, rects: &impl RectSource<T>) {
        let Some(flags) = self.index.flags(key) else {
            return;
        };
        if flags.contains(MarkerFlags::VISIBLE) == visible {
            return;
        }
        if visible {
            self.index.set_flags(key, flags | MarkerFlags::VISIBLE);
            self.pending.request(key);
        } else {
            let partners = self.partners_of(key, rects);
            self.index.set_flags(key, flags - MarkerFlags::VISIBLE);
            self.request_check(partners);
        }
    }

    /// React to a zoom change: every icon extent is suspect.
    pub fn zoom_changed(&mut self) {
        self.pending.request_all();
    }

    /// Schedule specific markers for the next pass.
    pub fn request_check<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = MarkerKey>,
    {
        for key in keys {
            self.pending.request(key);
        }
    }

    /// Schedule a full pass, superseding individual requests.
    pub fn request_check_all(&mut self) {
        self.pending.request_all();
    }

    /// True when a pass is scheduled.
    #[must_use]
    pub fn needs_commit(&self) -> bool {
        !self.pending.is_idle()
    }

    /// Run the batched pass accumulated since the last commit.
    ///
    /// Always drains the pending state. With no subscriber registered the
    /// expensive check itself is skipped, not just the dispatch. A full pass
    /// that touches no markers, or a targeted pass whose markers all went
    /// stale or hidden, dispatches nothing.
    pub fn commit(&mut self, rects: &impl RectSource<T>) {
        match self.pending.take() {
            Pending::All => {
                if !self.has_subscribers() {
                    return;
                }
                let result = self.index.check_all(rects);
                if result.is_empty() {
                    return;
                }
                self.dispatch(&result);
            }
            Pending::Markers(keys) => {
                if keys.is_empty() || !self.has_subscribers() {
                    return;
                }
                let result = self.index.check(keys, rects);
                if result.is_empty() {
                    return;
                }
                self.dispatch(&result);
            }
        }
    }

    /// Subscribe to intersect events.
    pub fn on_intersect<F>(&mut self, handler: F) -> Subscription
    where
        F: FnMut(&Intersections<P>) + 'static,
    {
        let id = self.handlers.len();
        self.handlers.push(Some(Box::new(handler)));
        Subscription(id)
    }

    /// Drop a subscription. Unknown handles are ignored.
    pub fn unsubscribe(&mut self, subscription: Subscription) {
        if let Some(slot) = self.handlers.get_mut(subscription.0) {
            *slot = None;
        }
    }

    /// Whether the layer is shown. Hidden layers keep their index current
    /// but schedule no full re-check until shown again.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show the layer; everything is rechecked since icons may have moved
    /// arbitrarily while hidden.
    pub fn show(&mut self) {
        if self.visible {
            return;
        }
        self.visible = true;
        self.pending.request_all();
    }

    /// Hide the layer.
    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Toggle layer visibility.
    pub fn toggle(&mut self) {
        if self.visible {
            self.hide();
        } else {
            self.show();
        }
    }

    /// The underlying overlap index.
    pub fn index(&self) -> &IntersectIndexGeneric<T, P, B> {
        &self.index
    }

    fn partners_of(&self, key: MarkerKey, rects: &impl RectSource<T>) -> Vec<MarkerKey> {
        let result = self.index.check([key], rects);
        result.graph.neighbors(key).to_vec()
    }

    fn has_subscribers(&self) -> bool {
        self.handlers.iter().any(Option::is_some)
    }

    fn dispatch(&mut self, result: &Intersections<P>) {
        for handler in self.handlers.iter_mut().flatten() {
            handler(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::{Cell, RefCell};
    use declutter_index::Aabb2D;
    use hashbrown::HashMap;

    fn icon(x: f64, y: f64) -> Aabb2D<f64> {
        Aabb2D::<f64>::from_xywh(x - 5.0, y - 5.0, 10.0, 10.0)
    }

    /// The rendering side of the contract: icon boxes per marker.
    #[derive(Default)]
    struct Icons(HashMap<MarkerKey, Aabb2D<f64>>);

    impl Icons {
        fn place(&mut self, key: MarkerKey, x: f64, y: f64) {
            self.0.insert(key, icon(x, y));
        }

        fn source(&self) -> impl RectSource<f64> + '_ {
            |key: MarkerKey| self.0.get(&key).copied()
        }
    }

    type EventLog = Rc<RefCell<Vec<(Vec<MarkerKey>, Vec<(MarkerKey, MarkerKey)>)>>>;

    fn record_events(resolver: &mut Resolver<f64, u32>) -> EventLog {
        let log: EventLog = Rc::default();
        let sink = Rc::clone(&log);
        resolver.on_intersect(move |result| {
            sink.borrow_mut()
                .push((result.affected_keys().collect(), result.graph.edge_set()));
        });
        log
    }

    #[test]
    fn requests_coalesce_into_one_pass() {
        let mut resolver: Resolver<f64, u32> = Resolver::new();
        let log = record_events(&mut resolver);
        let mut icons = Icons::default();

        let a = resolver.add(0.0, 0.0, 1);
        let b = resolver.add(5.0, 5.0, 2);
        icons.place(a, 0.0, 0.0);
        icons.place(b, 5.0, 5.0);

        assert!(resolver.needs_commit());
        resolver.commit(&icons.source());
        assert!(!resolver.needs_commit());

        let events = log.borrow();
        assert_eq!(events.len(), 1, "two requests, one batched pass");
        let (affected, edges) = &events[0];
        assert_eq!(affected.len(), 2);
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn movement_requests_coalesce_too() {
        let mut resolver: Resolver<f64, u32> = Resolver::new();
        let log = record_events(&mut resolver);
        let mut icons = Icons::default();

        let a = resolver.add(0.0, 0.0, 1);
        let b = resolver.add(50.0, 50.0, 2);
        icons.place(a, 0.0, 0.0);
        icons.place(b, 50.0, 50.0);
        resolver.commit(&icons.source());
        log.borrow_mut().clear();

        resolver.marker_moved(a, 1.0, 1.0);
        resolver.marker_moved(b, 49.0, 49.0);
        icons.place(a, 1.0, 1.0);
        icons.place(b, 49.0, 49.0);
        resolver.commit(&icons.source());
        resolver.commit(&icons.source());

        let events = log.borrow();
        assert_eq!(events.len(), 1, "second commit had nothing to do");
        assert_eq!(events[0].0.len(), 2);
    }

    #[test]
    fn check_all_supersedes_individual_requests() {
        let mut resolver: Resolver<f64, u32> = Resolver::new();
        let log = record_events(&mut resolver);
        let mut icons = Icons::default();

        let a = resolver.add(0.0, 0.0, 1);
        let b = resolver.add(50.0, 50.0, 2);
        let c = resolver.add(100.0, 100.0, 3);
        for (key, (x, y)) in [(a, (0.0, 0.0)), (b, (50.0, 50.0)), (c, (100.0, 100.0))] {
            icons.place(key, x, y);
        }
        resolver.commit(&icons.source());
        log.borrow_mut().clear();

        resolver.request_check(vec![a]);
        resolver.zoom_changed();
        resolver.request_check(vec![b]);
        resolver.commit(&icons.source());

        let events = log.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0.len(), 3, "full pass covers every marker");
    }

    #[test]
    fn no_subscriber_skips_the_check_but_drains() {
        let mut resolver: Resolver<f64, u32> = Resolver::new();
        let a = resolver.add(0.0, 0.0, 1);

        let lookups = Cell::new(0_u32);
        let rects = |_key: MarkerKey| {
            lookups.set(lookups.get() + 1);
            Some(icon(0.0, 0.0))
        };
        assert!(resolver.needs_commit());
        resolver.commit(&rects);
        assert!(!resolver.needs_commit());
        assert_eq!(lookups.get(), 0, "check skipped entirely");
        let _ = a;
    }

    #[test]
    fn empty_full_pass_dispatches_nothing() {
        let mut resolver: Resolver<f64, u32> = Resolver::new();
        let log = record_events(&mut resolver);
        resolver.zoom_changed();
        resolver.commit(&|_key: MarkerKey| None::<Aabb2D<f64>>);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn removal_schedules_former_partners() {
        let mut resolver: Resolver<f64, u32> = Resolver::new();
        let log = record_events(&mut resolver);
        let mut icons = Icons::default();

        let a = resolver.add(0.0, 0.0, 1);
        let b = resolver.add(5.0, 5.0, 2);
        icons.place(a, 0.0, 0.0);
        icons.place(b, 5.0, 5.0);
        resolver.commit(&icons.source());
        log.borrow_mut().clear();

        resolver.remove(b, &icons.source());
        resolver.commit(&icons.source());

        let events = log.borrow();
        assert_eq!(events.len(), 1);
        let (affected, edges) = &events[0];
        assert_eq!(affected.as_slice(), &[a], "partner rechecked, removed key gone");
        assert!(edges.is_empty(), "the cluster dissolved");
    }

    #[test]
    fn stale_pending_keys_are_dropped() {
        let mut resolver: Resolver<f64, u32> = Resolver::new();
        let log = record_events(&mut resolver);
        let mut icons = Icons::default();

        let a = resolver.add(0.0, 0.0, 1);
        let b = resolver.add(50.0, 50.0, 2);
        icons.place(a, 0.0, 0.0);
        icons.place(b, 50.0, 50.0);
        // b is pending from add but removed before the pass runs; no
        // partners exist, so nothing extra is scheduled.
        resolver.remove(b, &icons.source());
        resolver.commit(&icons.source());

        let events = log.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0.as_slice(), &[a]);
    }

    #[test]
    fn hiding_a_marker_reschedules_its_partners() {
        let mut resolver: Resolver<f64, u32> = Resolver::new();
        let log = record_events(&mut resolver);
        let mut icons = Icons::default();

        let a = resolver.add(0.0, 0.0, 1);
        let b = resolver.add(5.0, 5.0, 2);
        icons.place(a, 0.0, 0.0);
        icons.place(b, 5.0, 5.0);
        resolver.commit(&icons.source());
        log.borrow_mut().clear();

        resolver.set_marker_visible(b, false, &icons.source());
        resolver.commit(&icons.source());
        {
            let events = log.borrow();
            assert_eq!(events.len(), 1);
            let (affected, edges) = &events[0];
            assert_eq!(affected.as_slice(), &[a]);
            assert!(edges.is_empty());
        }
        log.borrow_mut().clear();

        resolver.set_marker_visible(b, true, &icons.source());
        resolver.commit(&icons.source());
        let events = log.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].1.len(), 1, "overlap is back");
    }

    #[test]
    fn show_after_hide_triggers_a_full_pass() {
        let mut resolver: Resolver<f64, u32> = Resolver::new();
        let log = record_events(&mut resolver);
        let mut icons = Icons::default();

        let a = resolver.add(0.0, 0.0, 1);
        icons.place(a, 0.0, 0.0);
        resolver.commit(&icons.source());
        log.borrow_mut().clear();

        resolver.hide();
        assert!(!resolver.is_visible());
        assert!(!resolver.needs_commit());
        resolver.toggle();
        assert!(resolver.is_visible());
        assert!(resolver.needs_commit());
        resolver.commit(&icons.source());
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn unsubscribed_handlers_stop_receiving() {
        let mut resolver: Resolver<f64, u32> = Resolver::new();
        let log: EventLog = Rc::default();
        let sink = Rc::clone(&log);
        let sub = resolver.on_intersect(move |result| {
            sink.borrow_mut()
                .push((result.affected_keys().collect(), result.graph.edge_set()));
        });
        let mut icons = Icons::default();
        let a = resolver.add(0.0, 0.0, 1);
        icons.place(a, 0.0, 0.0);
        resolver.unsubscribe(sub);
        resolver.commit(&icons.source());
        assert!(log.borrow().is_empty());
    }
}
