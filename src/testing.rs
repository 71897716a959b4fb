//! Host-side fakes for the hardware and network primitives.

extern crate std;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use chrono::{NaiveDate, NaiveDateTime};
use embedded_hal::delay::DelayNs;

use crate::console::Report;
use crate::display::TextDisplay;
use crate::error::{LinkError, QueryError, SensorError};
use crate::net::{Link, NetworkTime};
use crate::schedule::Monotonic;
use crate::sensor::{Measurement, SensorBus};

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .and_then(|date| date.and_hms_opt(h, mi, s))
        .unwrap()
}

/// Shared millisecond counter. Clones observe the same time.
#[derive(Debug, Clone, Default)]
pub struct FakeClock {
    now: Rc<Cell<u64>>,
}

impl FakeClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn now(&self) -> u64 {
        self.now.get()
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    /// A delay that moves this clock forward by the time slept.
    pub fn delay(&self) -> FakeDelay {
        FakeDelay {
            clock: Some(self.clone()),
            delays: Rc::default(),
        }
    }

    /// A delay that only records what it was asked to sleep.
    pub fn frozen_delay(&self) -> FakeDelay {
        FakeDelay {
            clock: None,
            delays: Rc::default(),
        }
    }
}

impl Monotonic for FakeClock {
    fn now_ms(&mut self) -> u64 {
        self.now()
    }
}

/// Records every `delay_ms` call. Clones share the record.
#[derive(Debug, Clone)]
pub struct FakeDelay {
    clock: Option<FakeClock>,
    delays: Rc<RefCell<Vec<u32>>>,
}

impl FakeDelay {
    pub fn delays(&self) -> Vec<u32> {
        self.delays.borrow().clone()
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.delays.borrow_mut().push(ms);
        if let Some(clock) = &self.clock {
            clock.advance(u64::from(ms));
        }
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.sleep_ms(ms);
    }
}

#[cfg(feature = "async")]
impl embedded_hal_async::delay::DelayNs for FakeDelay {
    async fn delay_ns(&mut self, _ns: u32) {}

    async fn delay_ms(&mut self, ms: u32) {
        self.sleep_ms(ms);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    Clear,
    Text(String, i32, i32),
    Flush,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFault;

/// Display that records what is drawn on it.
pub struct RecordingDisplay {
    ops: Rc<RefCell<Vec<DisplayOp>>>,
    failing: Rc<Cell<bool>>,
}

/// Test-side handle on a [`RecordingDisplay`] that has been moved away.
#[derive(Clone)]
pub struct DisplayProbe {
    ops: Rc<RefCell<Vec<DisplayOp>>>,
    failing: Rc<Cell<bool>>,
}

impl RecordingDisplay {
    pub fn new() -> (Self, DisplayProbe) {
        let ops = Rc::new(RefCell::new(Vec::new()));
        let failing = Rc::new(Cell::new(false));
        let probe = DisplayProbe {
            ops: ops.clone(),
            failing: failing.clone(),
        };
        (Self { ops, failing }, probe)
    }

    /// While set, `clear` still succeeds but text and flush fail.
    pub fn fail_writes(&mut self, fail: bool) {
        self.failing.set(fail);
    }
}

impl DisplayProbe {
    /// Drains everything recorded so far.
    pub fn take(&self) -> Vec<DisplayOp> {
        self.ops.borrow_mut().drain(..).collect()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.failing.set(fail);
    }
}

impl TextDisplay for RecordingDisplay {
    type Error = DisplayFault;

    fn clear(&mut self) -> Result<(), DisplayFault> {
        self.ops.borrow_mut().push(DisplayOp::Clear);
        Ok(())
    }

    fn write_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), DisplayFault> {
        if self.failing.get() {
            return Err(DisplayFault);
        }
        self.ops
            .borrow_mut()
            .push(DisplayOp::Text(text.to_string(), x, y));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayFault> {
        if self.failing.get() {
            return Err(DisplayFault);
        }
        self.ops.borrow_mut().push(DisplayOp::Flush);
        Ok(())
    }
}

/// Network time source answering from a script, then with a fallback.
pub struct ScriptedNetwork {
    script: VecDeque<Result<NaiveDateTime, QueryError>>,
    fallback: Result<NaiveDateTime, QueryError>,
    queries: Rc<Cell<u32>>,
    hosts: Rc<RefCell<Vec<String>>>,
    latency: Option<(FakeClock, u64)>,
}

impl ScriptedNetwork {
    pub fn new(fallback: Result<NaiveDateTime, QueryError>) -> Self {
        Self {
            script: VecDeque::new(),
            fallback,
            queries: Rc::default(),
            hosts: Rc::default(),
            latency: None,
        }
    }

    pub fn then(mut self, answer: Result<NaiveDateTime, QueryError>) -> Self {
        self.script.push_back(answer);
        self
    }

    /// Every query advances `clock` by `ms`.
    pub fn taking(mut self, clock: &FakeClock, ms: u64) -> Self {
        self.latency = Some((clock.clone(), ms));
        self
    }

    pub fn counter(&self) -> Rc<Cell<u32>> {
        self.queries.clone()
    }

    pub fn hosts(&self) -> Rc<RefCell<Vec<String>>> {
        self.hosts.clone()
    }

    fn answer(&mut self, host: &str) -> Result<NaiveDateTime, QueryError> {
        self.queries.set(self.queries.get() + 1);
        self.hosts.borrow_mut().push(host.to_string());
        if let Some((clock, ms)) = &self.latency {
            clock.advance(*ms);
        }
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

impl NetworkTime for ScriptedNetwork {
    fn query(&mut self, host: &str) -> Result<NaiveDateTime, QueryError> {
        self.answer(host)
    }
}

#[cfg(feature = "async")]
impl crate::asynch::NetworkTime for ScriptedNetwork {
    async fn query(&mut self, host: &str) -> Result<NaiveDateTime, QueryError> {
        self.answer(host)
    }
}

/// Sensor answering from a script, then with a fallback.
pub struct ScriptedSensor {
    script: VecDeque<Result<Measurement, SensorError>>,
    fallback: Result<Measurement, SensorError>,
    reads: Rc<Cell<u32>>,
    observer: Option<FakeClock>,
    times: Rc<RefCell<Vec<u64>>>,
}

impl ScriptedSensor {
    pub fn new(fallback: Result<Measurement, SensorError>) -> Self {
        Self {
            script: VecDeque::new(),
            fallback,
            reads: Rc::default(),
            observer: None,
            times: Rc::default(),
        }
    }

    pub fn then(mut self, answer: Result<Measurement, SensorError>) -> Self {
        self.script.push_back(answer);
        self
    }

    /// Records the time of `clock` at every transaction.
    pub fn observing(mut self, clock: FakeClock) -> Self {
        self.observer = Some(clock);
        self
    }

    pub fn counter(&self) -> Rc<Cell<u32>> {
        self.reads.clone()
    }

    pub fn transaction_times(&self) -> Rc<RefCell<Vec<u64>>> {
        self.times.clone()
    }

    fn answer(&mut self) -> Result<Measurement, SensorError> {
        self.reads.set(self.reads.get() + 1);
        if let Some(clock) = &self.observer {
            self.times.borrow_mut().push(clock.now());
        }
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

impl SensorBus for ScriptedSensor {
    fn transact(&mut self) -> Result<Measurement, SensorError> {
        self.answer()
    }
}

#[cfg(feature = "async")]
impl crate::asynch::SensorBus for ScriptedSensor {
    async fn transact(&mut self) -> Result<Measurement, SensorError> {
        self.answer()
    }
}

#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub reports: Vec<(String, String)>,
}

impl Report for RecordingReporter {
    fn report(&mut self, message: &str, details: &str) {
        self.reports
            .push((message.to_string(), details.to_string()));
    }
}

#[cfg(feature = "async")]
impl crate::asynch::Report for RecordingReporter {
    async fn report(&mut self, message: &str, details: &str) {
        Report::report(self, message, details);
    }
}

pub struct FakeLink {
    result: Result<(), LinkError>,
    attempts: u32,
}

impl FakeLink {
    pub fn new(result: Result<(), LinkError>) -> Self {
        Self {
            result,
            attempts: 0,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl Link for FakeLink {
    fn connect(&mut self) -> Result<(), LinkError> {
        self.attempts += 1;
        self.result
    }
}

#[cfg(feature = "async")]
impl crate::asynch::Link for FakeLink {
    async fn connect(&mut self) -> Result<(), LinkError> {
        Link::connect(self)
    }
}
