//! Per-path leading + trailing edge throttle for continuous controls.
//!
//! The first write to an idle path goes out immediately. Writes that land
//! inside the window only update the pending value, and when the window
//! closes the pending value is flushed if it differs from what was last
//! sent. Timers are plain deadlines; the owner drives them with
//! [`Dispatcher::poll`] and can ask for [`Dispatcher::next_deadline`] to
//! schedule a wake-up.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use instant::Instant;
use mixconsole_types::{DocPath, PatchOp};
use serde_json::Value;

use crate::transport::Transport;

/// Default throttle window.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(20);

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Throttle state for one path.
#[derive(Debug)]
struct Lane {
    /// When the running timer fires. `None` means no timer.
    deadline: Option<Instant>,
    last_sent: Value,
    pending: Value,
}

impl Lane {
    /// Fire the timer if it is due. A late timer fires once, at `now`, and
    /// the next window starts from that send.
    fn expire(&mut self, path: DocPath, window: Duration, now: Instant, transport: &dyn Transport) {
        if !self.deadline.is_some_and(|deadline| deadline <= now) {
            return;
        }
        if self.pending != self.last_sent {
            tracing::trace!("Trailing flush for {}", path);
            send(transport, path, &self.pending);
            self.last_sent = self.pending.clone();
            self.deadline = Some(now + window);
        } else {
            self.deadline = None;
        }
    }
}

/// Leading + trailing throttle keyed by document path.
#[derive(Debug)]
pub struct Dispatcher {
    window: Duration,
    lanes: HashMap<DocPath, Lane>,
}

impl Dispatcher {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            lanes: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record `value` as the final intended value for `path`, sending it now
    /// if no timer is running for that path.
    pub fn schedule(
        &mut self,
        path: DocPath,
        value: Value,
        now: Instant,
        transport: &dyn Transport,
    ) {
        let window = self.window;
        let lane = self.lanes.entry(path).or_insert_with(|| Lane {
            deadline: None,
            last_sent: Value::Null,
            pending: Value::Null,
        });

        // A timer that expired without being polled fires first.
        lane.expire(path, window, now, transport);

        lane.pending = value;
        if lane.deadline.is_none() {
            tracing::trace!("Leading send for {}", path);
            send(transport, path, &lane.pending);
            lane.last_sent = lane.pending.clone();
            lane.deadline = Some(now + window);
        }
    }

    /// Fire every timer due at `now`. Idle lanes are dropped.
    pub fn poll(&mut self, now: Instant, transport: &dyn Transport) {
        let window = self.window;
        for (path, lane) in self.lanes.iter_mut() {
            lane.expire(*path, window, now, transport);
        }
        self.lanes.retain(|_, lane| lane.deadline.is_some());
    }

    /// Earliest running timer, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.lanes.values().filter_map(|lane| lane.deadline).min()
    }

    pub fn is_idle(&self) -> bool {
        self.lanes.values().all(|lane| lane.deadline.is_none())
    }

    /// Cancel every timer and forget pending values.
    pub fn reset(&mut self) {
        if !self.lanes.is_empty() {
            tracing::debug!("Cancelling {} throttle timer(s)", self.lanes.len());
        }
        self.lanes.clear();
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

fn send(transport: &dyn Transport, path: DocPath, value: &Value) {
    transport.send(vec![PatchOp::replace(path, value.clone())]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;
    use mixconsole_types::ChannelField;

    const PAN: DocPath = DocPath::Field(2, ChannelField::Panning);
    const GAIN: DocPath = DocPath::Field(2, ChannelField::DigitalGain);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn values(transport: &MemoryTransport) -> Vec<Value> {
        transport
            .sent()
            .into_iter()
            .map(|batch| batch[0].value().clone())
            .collect()
    }

    #[test]
    fn test_leading_send_then_coalesce() {
        let transport = MemoryTransport::new();
        let mut dispatcher = Dispatcher::new(ms(20));
        let start = Instant::now();

        dispatcher.schedule(PAN, 0.1.into(), start, &transport);
        dispatcher.schedule(PAN, 0.2.into(), start + ms(5), &transport);
        dispatcher.schedule(PAN, 0.3.into(), start + ms(10), &transport);
        assert_eq!(values(&transport), vec![Value::from(0.1)]);

        dispatcher.poll(start + ms(20), &transport);
        assert_eq!(values(&transport), vec![Value::from(0.1), Value::from(0.3)]);
        assert_eq!(dispatcher.next_deadline(), Some(start + ms(40)));

        dispatcher.poll(start + ms(40), &transport);
        assert_eq!(transport.len(), 2);
        assert!(dispatcher.is_idle());
        assert_eq!(dispatcher.next_deadline(), None);
    }

    #[test]
    fn test_burst_spacing() {
        let transport = MemoryTransport::new();
        let mut dispatcher = Dispatcher::new(ms(20));
        let start = Instant::now();
        let mut send_times = Vec::new();

        // One call every 5 ms for 100 ms, with the loop polling on each tick.
        for step in 0..=20u64 {
            let now = start + ms(step * 5);
            let before = transport.len();
            dispatcher.poll(now, &transport);
            dispatcher.schedule(PAN, Value::from(step), now, &transport);
            for _ in before..transport.len() {
                send_times.push(step * 5);
            }
        }
        for t in [105u64, 110, 115, 120, 125, 130, 135, 140] {
            let before = transport.len();
            dispatcher.poll(start + ms(t), &transport);
            for _ in before..transport.len() {
                send_times.push(t);
            }
        }

        let sent = values(&transport);
        assert_eq!(sent.first(), Some(&Value::from(0u64)));
        assert_eq!(sent.last(), Some(&Value::from(20u64)));
        assert_eq!(send_times, vec![0, 20, 40, 60, 80, 100, 120]);
        for pair in send_times.windows(2) {
            assert!(pair[1] - pair[0] >= 20);
        }
        assert!(dispatcher.is_idle());
    }

    #[test]
    fn test_unpolled_expiry_flushes_before_new_value() {
        let transport = MemoryTransport::new();
        let mut dispatcher = Dispatcher::new(ms(20));
        let start = Instant::now();

        dispatcher.schedule(PAN, 0.1.into(), start, &transport);
        dispatcher.schedule(PAN, 0.2.into(), start + ms(5), &transport);
        // No poll; the timer that was due at 20 ms flushes 0.2 first.
        dispatcher.schedule(PAN, 0.9.into(), start + ms(30), &transport);

        assert_eq!(values(&transport), vec![Value::from(0.1), Value::from(0.2)]);
        assert_eq!(dispatcher.next_deadline(), Some(start + ms(50)));
        dispatcher.poll(start + ms(40), &transport);
        assert_eq!(transport.len(), 2);
        dispatcher.poll(start + ms(50), &transport);
        assert_eq!(values(&transport).last(), Some(&Value::from(0.9)));
    }

    #[test]
    fn test_late_poll_restarts_window_from_send() {
        let transport = MemoryTransport::new();
        let mut dispatcher = Dispatcher::new(ms(20));
        let start = Instant::now();
        let mut send_times = Vec::new();
        let mut record = |t: u64, transport: &MemoryTransport, before: usize| {
            for _ in before..transport.len() {
                send_times.push(t);
            }
        };

        let before = transport.len();
        dispatcher.schedule(PAN, 0.1.into(), start, &transport);
        record(0, &transport, before);
        dispatcher.schedule(PAN, 0.2.into(), start + ms(5), &transport);

        let before = transport.len();
        dispatcher.poll(start + ms(39), &transport);
        record(39, &transport, before);

        let before = transport.len();
        dispatcher.schedule(PAN, 0.3.into(), start + ms(40), &transport);
        dispatcher.poll(start + ms(40), &transport);
        record(40, &transport, before);

        let before = transport.len();
        dispatcher.poll(start + ms(59), &transport);
        record(59, &transport, before);

        assert_eq!(send_times, vec![0, 39, 59]);
        assert_eq!(
            values(&transport),
            vec![Value::from(0.1), Value::from(0.2), Value::from(0.3)]
        );
    }

    #[test]
    fn test_frame_cadence_keeps_window_spacing() {
        let transport = MemoryTransport::new();
        let mut dispatcher = Dispatcher::new(ms(20));
        let start = Instant::now();
        let frame = Duration::from_micros(16_667);
        let mut send_times = Vec::new();

        // A drag updating once per 60 Hz frame, then a few idle frames.
        for n in 0..16u32 {
            let now = start + frame * n;
            let before = transport.len();
            dispatcher.poll(now, &transport);
            if n < 12 {
                dispatcher.schedule(PAN, Value::from(n), now, &transport);
            }
            for _ in before..transport.len() {
                send_times.push(now);
            }
        }

        assert_eq!(values(&transport).last(), Some(&Value::from(11u32)));
        for pair in send_times.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= ms(20), "sends only {:?} apart", gap);
        }
        assert!(dispatcher.is_idle());
    }

    #[test]
    fn test_after_quiet_period_sends_leading_again() {
        let transport = MemoryTransport::new();
        let mut dispatcher = Dispatcher::new(ms(20));
        let start = Instant::now();

        dispatcher.schedule(PAN, 0.4.into(), start, &transport);
        dispatcher.poll(start + ms(20), &transport);
        assert!(dispatcher.is_idle());

        dispatcher.schedule(PAN, 0.4.into(), start + ms(500), &transport);
        assert_eq!(transport.len(), 2);
    }

    #[test]
    fn test_paths_are_independent() {
        let transport = MemoryTransport::new();
        let mut dispatcher = Dispatcher::new(ms(20));
        let start = Instant::now();

        dispatcher.schedule(PAN, 0.1.into(), start, &transport);
        dispatcher.schedule(GAIN, (-3.0).into(), start + ms(1), &transport);
        dispatcher.schedule(PAN, 0.2.into(), start + ms(2), &transport);

        let paths: Vec<String> = transport
            .sent()
            .iter()
            .map(|batch| batch[0].path().to_string())
            .collect();
        assert_eq!(
            paths,
            vec!["/channels/2/panning", "/channels/2/digital_gain"]
        );
    }

    #[test]
    fn test_reset_cancels_trailing_flush() {
        let transport = MemoryTransport::new();
        let mut dispatcher = Dispatcher::new(ms(20));
        let start = Instant::now();

        dispatcher.schedule(PAN, 0.1.into(), start, &transport);
        dispatcher.schedule(PAN, 0.7.into(), start + ms(5), &transport);
        dispatcher.reset();
        dispatcher.poll(start + ms(50), &transport);

        assert_eq!(transport.len(), 1);
        assert!(dispatcher.is_idle());
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let other = clock.clone();
        let start = clock.now();
        clock.advance(ms(15));
        assert_eq!(other.now(), start + ms(15));
    }
}
