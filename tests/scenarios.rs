//! End-to-end kernel scenarios through the public API

use std::cell::Cell;
use std::rc::Rc;

use coop_os::{
    handler, EventId, InputConfig, Kernel, Message, Os, Process, ProcessId, SoftClock, TimerId,
    INPUT_ACTIVE, INPUT_INACTIVE,
};

const P: ProcessId = ProcessId::MAIN;
const TICK_TIMER: TimerId = TimerId(0);

/// Raw pin level shared between the test and the kernel's sample source
#[derive(Clone, Default)]
struct Pin(Rc<Cell<bool>>);

impl Pin {
    fn set(&self, level: bool) {
        self.0.set(level);
    }

    fn source(&self) -> impl FnMut(usize) -> bool {
        let level = self.0.clone();
        move |_| level.get()
    }
}

#[derive(Default)]
struct Recorder {
    log: Vec<Message>,
}

impl Process for Recorder {
    fn handle(&mut self, message: Message, _os: &mut dyn Os) {
        self.log.push(message);
    }
}

#[test]
fn test_timer_fires_after_duration() {
    let mut rec = Recorder::default();
    {
        let mut kernel: Kernel<'_, _, _, 2, 0> = Kernel::new(SoftClock::new(), |_: usize| false, []);
        kernel.register(P, &mut rec).unwrap();
        kernel.start_timer(TICK_TIMER, 50, P, Message::event(EventId::TICKER_SERVO));

        kernel.clock.advance(51);
        kernel.tick();

        let queue = &kernel.context().queue;
        assert_eq!(queue.len(), 1);
        let entry = queue.peek().copied().unwrap();
        assert_eq!(entry.process, P);
        assert_eq!(entry.message, Message::new(EventId::TICKER_SERVO, 0));

        assert_eq!(kernel.schedule(), 1);
        assert!(!kernel.context().timers.is_active(TICK_TIMER));
    }
    assert_eq!(rec.log, vec![Message::new(EventId::TICKER_SERVO, 0)]);
}

#[test]
fn test_timer_not_due_one_ms_early() {
    let mut kernel: Kernel<'_, _, _, 2, 0> = Kernel::new(SoftClock::new(), |_: usize| false, []);
    kernel.start_timer(TICK_TIMER, 50, P, Message::event(EventId::TICKER_SERVO));
    kernel.clock.advance(50);
    kernel.tick();
    assert!(kernel.context().queue.is_empty());
    assert!(kernel.context().timers.is_active(TICK_TIMER));
}

#[test]
fn test_timer_across_counter_wrap() {
    let mut kernel: Kernel<'_, _, _, 2, 0> =
        Kernel::new(SoftClock::starting_at(u32::MAX - 20), |_: usize| false, []);
    kernel.start_timer(TICK_TIMER, 50, P, Message::event(EventId::TICKER_SERVO));

    let mut fired_at = None;
    for step in 1..=100u32 {
        kernel.clock.advance(1);
        kernel.tick();
        if !kernel.context().queue.is_empty() {
            fired_at = Some(step);
            break;
        }
    }
    assert_eq!(fired_at, Some(51));
}

#[test]
fn test_key_press_reports_once() {
    let pin = Pin::default();
    let mut rec = Recorder::default();
    {
        let key = InputConfig::key(P, EventId::KEY_LEFT);
        let mut kernel: Kernel<'_, _, _, 1, 1> = Kernel::new(SoftClock::new(), pin.source(), [key]);
        kernel.register(P, &mut rec).unwrap();
        kernel.start();

        pin.set(true);
        for _ in 0..3 {
            kernel.clock.advance(1);
            kernel.tick();
        }
        assert_eq!(kernel.context().queue.len(), 1);
        assert_eq!(
            kernel.context().queue.peek().map(|e| e.message),
            Some(Message::new(EventId::KEY_LEFT, INPUT_ACTIVE))
        );

        // Held: no re-trigger without auto-repeat
        kernel.clock.advance(1);
        kernel.tick();
        assert_eq!(kernel.context().queue.len(), 1);
        kernel.schedule();
    }
    assert_eq!(rec.log, vec![Message::new(EventId::KEY_LEFT, INPUT_ACTIVE)]);
}

#[test]
fn test_key_press_and_release_through_poll() {
    let pin = Pin::default();
    let mut rec = Recorder::default();
    {
        let key = InputConfig::key(P, EventId::KEY_MODE);
        let mut kernel: Kernel<'_, _, _, 1, 1> = Kernel::new(SoftClock::new(), pin.source(), [key]);
        kernel.register(P, &mut rec).unwrap();
        kernel.start();

        kernel.run_for(10);
        pin.set(true);
        kernel.run_for(10);
        pin.set(false);
        kernel.run_for(10);
    }
    assert_eq!(
        rec.log,
        vec![
            Message::new(EventId::KEY_MODE, INPUT_ACTIVE),
            Message::new(EventId::KEY_MODE, INPUT_INACTIVE),
        ]
    );
}

#[test]
fn test_auto_repeat_while_held() {
    let pin = Pin::default();
    let mut rec = Recorder::default();
    {
        let key = InputConfig::key(P, EventId::KEY_RIGHT).with_auto_repeat(50);
        let mut kernel: Kernel<'_, _, _, 1, 1> = Kernel::new(SoftClock::new(), pin.source(), [key]);
        kernel.register(P, &mut rec).unwrap();
        kernel.start();

        pin.set(true);
        // Edge on the 2nd high tick, then a repeat every 50 ticks
        kernel.run_for(2 + 50 * 4);
    }
    assert_eq!(rec.log.len(), 5);
    assert!(rec
        .log
        .iter()
        .all(|m| *m == Message::new(EventId::KEY_RIGHT, INPUT_ACTIVE)));
}

#[test]
fn test_boot_level_not_reported() {
    let pin = Pin::default();
    pin.set(true);
    let mut rec = Recorder::default();
    {
        let key = InputConfig::key(P, EventId::KEY_LEFT);
        let mut kernel: Kernel<'_, _, _, 1, 1> = Kernel::new(SoftClock::new(), pin.source(), [key]);
        kernel.register(P, &mut rec).unwrap();
        kernel.start();
        kernel.run_for(20);

        // Explicit snapshot still available on request
        kernel.force_input_update(0);
        kernel.schedule();
    }
    assert_eq!(rec.log, vec![Message::new(EventId::KEY_LEFT, INPUT_ACTIVE)]);
}

#[test]
fn test_stopped_timer_may_still_deliver() {
    // A timer that already expired into the queue is not retracted by stop.
    let mut stopped_then_received = 0;
    let mut app = handler(|msg: Message, os: &mut dyn Os| {
        if msg.event == EventId::KEY_MODE {
            os.stop_timer(TICK_TIMER);
        } else if msg.event == EventId::TICKER_LED {
            stopped_then_received += 1;
        }
    });
    {
        let mut kernel: Kernel<'_, _, _, 1, 0> = Kernel::new(SoftClock::new(), |_: usize| false, []);
        kernel.register(P, &mut app).unwrap();
        kernel.start_timer(TICK_TIMER, 5, P, Message::event(EventId::TICKER_LED));

        kernel.post_event(P, EventId::KEY_MODE, INPUT_ACTIVE);
        kernel.clock.advance(6);
        kernel.tick();
        kernel.schedule();
    }
    drop(app);
    assert_eq!(stopped_then_received, 1);
}

#[test]
fn test_fifo_across_sources() {
    let pin = Pin::default();
    let mut rec = Recorder::default();
    {
        let key = InputConfig::key(P, EventId::KEY_LEFT);
        let mut kernel: Kernel<'_, _, _, 2, 1> = Kernel::new(SoftClock::new(), pin.source(), [key]);
        kernel.register(P, &mut rec).unwrap();
        kernel.start();

        kernel.post_event(P, EventId::CHAR, b'a' as u32);
        kernel.start_timer(TimerId(1), 0, P, Message::new(EventId::TICKER_LED, 1));
        kernel.start_timer(TimerId(0), 0, P, Message::new(EventId::TICKER_LED, 0));
        pin.set(true);

        kernel.clock.advance(1);
        kernel.tick();
        kernel.tick();
        kernel.schedule();
    }
    assert_eq!(
        rec.log,
        vec![
            Message::new(EventId::CHAR, b'a' as u32),
            Message::new(EventId::TICKER_LED, 0),
            Message::new(EventId::TICKER_LED, 1),
            Message::new(EventId::KEY_LEFT, INPUT_ACTIVE),
        ]
    );
}
