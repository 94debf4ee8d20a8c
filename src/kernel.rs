//! Kernel — cooperative scheduler tying clock, timers, inputs and queue
//!
//! Two entry points run at different cadences:
//! - [`Kernel::tick`] once per elapsed clock tick: scans the debounced
//!   inputs and sweeps the timer table, both of which post messages.
//! - [`Kernel::schedule`] on every loop iteration: calls each process's
//!   `run` callback, then drains the event queue, dispatching every
//!   message to the process registered for its id.
//!
//! Dispatch is synchronous. Messages posted by a handler during a drain
//! are delivered in the same pass.
//!
//! The outer loop is [`Kernel::poll`]: tick if the clock moved, then
//! schedule.

use heapless::LinearMap;

use crate::clock::{Clock, SoftClock, Ticker};
use crate::config::{TickMode, EVENT_QUEUE_SIZE, MAX_PROCESSES};
use crate::debounce::{InputConfig, InputScanner, InputSource};
use crate::error::RegisterError;
use crate::message::{EventId, Message, ProcessId, TimerId};
use crate::queue::EventQueue;
use crate::timer::TimerTable;

/// Services available to processes while they run
pub trait Os {
    /// Current time in milliseconds
    fn now_ms(&self) -> u32;

    /// Queue `message` for `process`
    ///
    /// Returns false if the queue was full and the message dropped.
    fn post(&mut self, process: ProcessId, message: Message) -> bool;

    /// Queue an event with a parameter for `process`
    fn post_event(&mut self, process: ProcessId, event: EventId, param: u32) -> bool {
        self.post(process, Message::new(event, param))
    }

    /// Arm a one-shot timer delivering `message` to `process`
    fn start_timer(&mut self, id: TimerId, duration_ms: u32, process: ProcessId, message: Message);

    /// Re-arm a previously started timer with a new duration
    fn restart_timer(&mut self, id: TimerId, duration_ms: u32);

    /// Disarm a timer. A message it already queued is still delivered.
    fn stop_timer(&mut self, id: TimerId);

    /// Report input `index` now, whether or not it changed
    fn force_input_update(&mut self, index: usize);
}

/// Message recipient
pub trait Process {
    /// Handle one message from the queue
    fn handle(&mut self, message: Message, os: &mut dyn Os);

    /// Called on every schedule pass before the queue is drained
    fn run(&mut self, _os: &mut dyn Os) {}
}

/// [`Process`] backed by a closure, see [`handler`]
pub struct Handler<F>(F);

/// Wrap a closure as a message-only process
pub fn handler<F>(f: F) -> Handler<F>
where
    F: FnMut(Message, &mut dyn Os),
{
    Handler(f)
}

impl<F> Process for Handler<F>
where
    F: FnMut(Message, &mut dyn Os),
{
    fn handle(&mut self, message: Message, os: &mut dyn Os) {
        (self.0)(message, os)
    }
}

/// Kernel-owned tables handed to processes as `&mut dyn Os`
pub struct Context<const T: usize, const I: usize, const Q: usize> {
    /// Pending messages
    pub queue: EventQueue<Q>,
    /// Software timers
    pub timers: TimerTable<T>,
    /// Debounced inputs
    pub inputs: InputScanner<I>,
    /// Clock value sampled at the start of the current tick or pass
    now_ms: u32,
}

impl<const T: usize, const I: usize, const Q: usize> Context<T, I, Q> {
    pub const fn new(inputs: [InputConfig; I]) -> Self {
        Self {
            queue: EventQueue::new(),
            timers: TimerTable::new(),
            inputs: InputScanner::new(inputs),
            now_ms: 0,
        }
    }
}

impl<const T: usize, const I: usize, const Q: usize> Os for Context<T, I, Q> {
    fn now_ms(&self) -> u32 {
        self.now_ms
    }

    fn post(&mut self, process: ProcessId, message: Message) -> bool {
        self.queue.push(process, message)
    }

    fn start_timer(&mut self, id: TimerId, duration_ms: u32, process: ProcessId, message: Message) {
        self.timers.start(id, self.now_ms, duration_ms, process, message);
    }

    fn restart_timer(&mut self, id: TimerId, duration_ms: u32) {
        self.timers.restart(id, self.now_ms, duration_ms);
    }

    fn stop_timer(&mut self, id: TimerId) {
        self.timers.stop(id);
    }

    fn force_input_update(&mut self, index: usize) {
        self.inputs.force_update(index, &mut self.queue);
    }
}

/// Kernel execution statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KernelStats {
    /// Tick handler invocations
    pub ticks: u64,
    /// Schedule passes
    pub passes: u64,
    /// Messages delivered to a process
    pub dispatched: u64,
    /// Messages addressed to an unregistered process
    pub unrouted: u64,
    /// Messages lost to queue overflow
    pub dropped: u32,
}

/// Cooperative kernel
///
/// `T` timers, `I` inputs, `Q` queue slots. Processes are borrowed for
/// `'a` and looked up by [`ProcessId`] on dispatch.
pub struct Kernel<'a, C, S, const T: usize, const I: usize, const Q: usize = EVENT_QUEUE_SIZE> {
    /// Millisecond clock
    pub clock: C,
    /// Raw input samples
    source: S,
    /// Gate for the tick handler
    ticker: Ticker,
    /// Queue, timers, inputs
    context: Context<T, I, Q>,
    /// Process id -> handler
    processes: LinearMap<ProcessId, &'a mut dyn Process, MAX_PROCESSES>,
    /// Tick work distribution
    mode: TickMode,
    /// Next phase in alternating mode (0 = timers, 1 = inputs)
    phase: u8,
    /// Counters
    stats: KernelStats,
}

impl<'a, C, S, const T: usize, const I: usize, const Q: usize> Kernel<'a, C, S, T, I, Q>
where
    C: Clock,
    S: InputSource,
{
    /// Create a kernel servicing timers and inputs on every tick
    pub fn new(clock: C, source: S, inputs: [InputConfig; I]) -> Self {
        let now = clock.now_ms();
        let mut context = Context::new(inputs);
        context.now_ms = now;
        Self {
            clock,
            source,
            ticker: Ticker::new(now),
            context,
            processes: LinearMap::new(),
            mode: TickMode::Combined,
            phase: 0,
            stats: KernelStats::default(),
        }
    }

    /// Select how tick work is spread across ticks
    pub fn with_tick_mode(mut self, mode: TickMode) -> Self {
        self.mode = mode;
        self.phase = 0;
        self
    }

    /// Route messages for `id` to `process`
    pub fn register(&mut self, id: ProcessId, process: &'a mut dyn Process) -> Result<(), RegisterError> {
        if !id.is_defined() {
            return Err(RegisterError::UndefinedProcess);
        }
        if self.processes.contains_key(&id) {
            return Err(RegisterError::DuplicateProcess(id));
        }
        self.processes
            .insert(id, process)
            .map_err(|_| RegisterError::RegistryFull)?;
        debug!("process {} registered", id.0);
        Ok(())
    }

    /// Number of registered processes
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// Settle the input filters on the current pin levels
    ///
    /// Call once before entering the loop so inputs already asserted at
    /// boot are not reported as edges.
    pub fn start(&mut self) {
        self.context.inputs.prime(&mut self.source);
        let now = self.clock.now_ms();
        self.ticker = Ticker::new(now);
        self.context.now_ms = now;
        debug!("kernel started at {}", now);
    }

    /// Tick handler: service inputs and timers for one clock tick
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        self.context.now_ms = now;

        match self.mode {
            TickMode::Combined => {
                self.scan_inputs();
                self.sweep_timers(now);
            }
            TickMode::Alternating => {
                if self.phase == 0 {
                    self.sweep_timers(now);
                } else {
                    self.scan_inputs();
                }
                self.phase ^= 1;
            }
        }
        self.stats.ticks += 1;
    }

    fn scan_inputs(&mut self) {
        self.context.inputs.scan_all(&mut self.source);
        self.context.inputs.report(&mut self.context.queue);
    }

    fn sweep_timers(&mut self, now: u32) {
        self.context.timers.sweep(now, &mut self.context.queue);
    }

    /// Schedule pass: run callbacks, then drain the queue
    ///
    /// Returns the number of messages dispatched.
    pub fn schedule(&mut self) -> usize {
        self.context.now_ms = self.clock.now_ms();

        for (_, process) in self.processes.iter_mut() {
            process.run(&mut self.context);
        }

        let mut dispatched = 0;
        while let Some(entry) = self.context.queue.pop() {
            match self.processes.get_mut(&entry.process) {
                Some(process) => {
                    process.handle(entry.message, &mut self.context);
                    dispatched += 1;
                }
                None => {
                    debug!("message {} for unknown process {}", entry.message.event.0, entry.process.0);
                    self.stats.unrouted += 1;
                }
            }
        }

        self.stats.passes += 1;
        self.stats.dispatched += dispatched as u64;
        dispatched
    }

    /// One iteration of the main loop: tick if the clock moved, then schedule
    pub fn poll(&mut self) {
        if self.ticker.has_tick_elapsed(self.clock.now_ms()) {
            self.tick();
        }
        self.schedule();
    }

    /// Main loop
    pub fn run(&mut self) -> ! {
        loop {
            self.poll();
        }
    }

    /// Queue, timers and inputs
    pub fn context(&self) -> &Context<T, I, Q> {
        &self.context
    }

    /// Current tick mode
    pub fn tick_mode(&self) -> TickMode {
        self.mode
    }

    /// Counters since creation
    pub fn stats(&self) -> KernelStats {
        KernelStats {
            dropped: self.context.queue.dropped(),
            ..self.stats
        }
    }

    /// Memory footprint estimate
    pub fn memory_footprint(&self) -> usize {
        core::mem::size_of::<Self>()
    }
}

impl<'a, S, const T: usize, const I: usize, const Q: usize> Kernel<'a, SoftClock, S, T, I, Q>
where
    S: InputSource,
{
    /// Run the kernel for `total_ms` of simulated time, 1 ms per poll
    pub fn run_for(&mut self, total_ms: u32) -> KernelStats {
        for _ in 0..total_ms {
            self.clock.advance(1);
            self.poll();
        }
        self.stats()
    }
}

/// Outside a schedule pass, the kernel itself offers the process services,
/// e.g. to arm timers during start-up.
impl<'a, C, S, const T: usize, const I: usize, const Q: usize> Os for Kernel<'a, C, S, T, I, Q>
where
    C: Clock,
    S: InputSource,
{
    fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }

    fn post(&mut self, process: ProcessId, message: Message) -> bool {
        self.context.post(process, message)
    }

    fn start_timer(&mut self, id: TimerId, duration_ms: u32, process: ProcessId, message: Message) {
        self.context.now_ms = self.clock.now_ms();
        self.context.start_timer(id, duration_ms, process, message);
    }

    fn restart_timer(&mut self, id: TimerId, duration_ms: u32) {
        self.context.now_ms = self.clock.now_ms();
        self.context.restart_timer(id, duration_ms);
    }

    fn stop_timer(&mut self, id: TimerId) {
        self.context.stop_timer(id);
    }

    fn force_input_update(&mut self, index: usize) {
        self.context.force_input_update(index);
    }
}
