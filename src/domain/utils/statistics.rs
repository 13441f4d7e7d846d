use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::sync::{Mutex, mpsc};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::domain::submission::notification::{Notification, NotificationLevel, NotificationSink};
use crate::domain::utils::id::SimulationRunId;
use crate::error::Result;

/// `tracing` target for machine-readable analytics events.
pub const ANALYTICS_TARGET: &str = "analytics";

/// Columns of the dispatch statistics file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatParameter {
    /// Milliseconds since the collector was created.
    Time,
    RunId,
    LicensePlate,
    EventType,
    /// Informational garage zone of the vehicle.
    Sector,
    /// Scheduled delay relative to the start of the run.
    DelayMs,
    /// "success", "error" or "info"
    Outcome,
    /// Backend answer or failure reason
    Message,
}

impl StatParameter {
    pub const ALL: [StatParameter; 8] = [
        StatParameter::Time,
        StatParameter::RunId,
        StatParameter::LicensePlate,
        StatParameter::EventType,
        StatParameter::Sector,
        StatParameter::DelayMs,
        StatParameter::Outcome,
        StatParameter::Message,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            StatParameter::Time => "Time",
            StatParameter::RunId => "RunId",
            StatParameter::LicensePlate => "LicensePlate",
            StatParameter::EventType => "EventType",
            StatParameter::Sector => "Sector",
            StatParameter::DelayMs => "DelayMs",
            StatParameter::Outcome => "Outcome",
            StatParameter::Message => "Message",
        }
    }

    pub fn headers() -> Vec<&'static str> {
        Self::ALL.iter().map(StatParameter::header).collect()
    }
}

/// Values are kept typed and only formatted when the row is written.
#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for StatValue {
    fn from(v: i64) -> Self {
        StatValue::Integer(v)
    }
}

impl From<u64> for StatValue {
    fn from(v: u64) -> Self {
        StatValue::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        StatValue::Float(v)
    }
}

impl From<String> for StatValue {
    fn from(v: String) -> Self {
        StatValue::Text(v)
    }
}

impl From<&str> for StatValue {
    fn from(v: &str) -> Self {
        StatValue::Text(v.to_string())
    }
}

impl StatValue {
    fn render(&self) -> String {
        match self {
            StatValue::Integer(i) => i.to_string(),
            StatValue::Float(f) => f.to_string(),
            StatValue::Text(t) => t.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatisticEvent {
    data: HashMap<StatParameter, StatValue>,
}

impl StatisticEvent {
    pub fn new() -> Self {
        Self { data: HashMap::new() }
    }

    pub fn set<V: Into<StatValue>>(&mut self, param: StatParameter, value: V) -> &mut Self {
        self.data.insert(param, value.into());
        self
    }

    pub fn get(&self, param: StatParameter) -> Option<&StatValue> {
        self.data.get(&param)
    }

    fn row(&self) -> Vec<String> {
        StatParameter::ALL.iter().map(|param| self.data.get(param).map(StatValue::render).unwrap_or_else(|| "NA".to_string())).collect()
    }
}

enum StatsMessage {
    Log(StatisticEvent),
    Shutdown,
}

/// Collects statistic rows and writes them as `;`-separated CSV on a background thread.
#[derive(Debug)]
pub struct StatsCollector {
    sender: mpsc::Sender<StatsMessage>,
    started: Instant,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl StatsCollector {
    /// Writes to `filename`, or to stdout when `None`.
    pub fn init(filename: Option<&str>) -> Result<Self> {
        let writer: Box<dyn Write + Send> = match filename {
            Some(f) => Box::new(File::create(f)?),
            None => Box::new(io::stdout()),
        };
        Ok(Self::with_writer(writer))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        let (tx, rx) = mpsc::channel();
        let worker = thread::Builder::new().name("stats-writer".to_string()).spawn(move || Self::worker_loop(rx, writer));

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("Stats Error: could not spawn writer thread: {}", e);
                None
            }
        };

        StatsCollector { sender: tx, started: Instant::now(), worker: Mutex::new(worker) }
    }

    fn worker_loop(rx: mpsc::Receiver<StatsMessage>, writer: Box<dyn Write + Send>) {
        let mut csv_wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);

        if let Err(e) = csv_wtr.write_record(StatParameter::headers()) {
            log::error!("Stats Error: Failed to write headers: {}", e);
        }

        for msg in rx {
            match msg {
                StatsMessage::Log(event) => {
                    if let Err(e) = csv_wtr.write_record(event.row()) {
                        log::error!("Stats Error: Failed to write record: {}", e);
                    }
                }
                StatsMessage::Shutdown => break,
            }
        }

        let _ = csv_wtr.flush();
    }

    /// Non-blocking; stamps `Time` when the caller did not.
    pub fn add_event(&self, mut event: StatisticEvent) {
        if event.get(StatParameter::Time).is_none() {
            let elapsed = self.started.elapsed().as_millis() as u64;
            event.set(StatParameter::Time, elapsed);
        }

        // The writer only disappears after shutdown; late rows are dropped.
        let _ = self.sender.send(StatsMessage::Log(event));
    }

    /// Flushes, stops the writer thread and waits for it.
    pub fn shutdown(&self) {
        let _ = self.sender.send(StatsMessage::Shutdown);
        let handle = self.worker.lock().ok().and_then(|mut guard| guard.take());
        if let Some(handle) = handle {
            if handle.join().is_err() {
                log::error!("Stats Error: writer thread panicked");
            }
        }
    }
}

impl Drop for StatsCollector {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Turns submission notifications into statistic rows for one run.
#[derive(Debug)]
pub struct StatisticsNotifier {
    collector: std::sync::Arc<StatsCollector>,
    run_id: Mutex<Option<SimulationRunId>>,
}

impl StatisticsNotifier {
    pub fn new(collector: std::sync::Arc<StatsCollector>) -> Self {
        StatisticsNotifier { collector, run_id: Mutex::new(None) }
    }

    pub fn set_run_id(&self, run_id: SimulationRunId) {
        if let Ok(mut guard) = self.run_id.lock() {
            *guard = Some(run_id);
        }
    }
}

impl NotificationSink for StatisticsNotifier {
    fn notify(&self, notification: Notification) {
        let mut event = StatisticEvent::new();

        if let Some(run_id) = self.run_id.lock().ok().and_then(|guard| guard.clone()) {
            event.set(StatParameter::RunId, run_id.to_string());
        }
        if let Some(vehicle) = &notification.event {
            event.set(StatParameter::LicensePlate, vehicle.license_plate.to_string());
            event.set(StatParameter::EventType, vehicle.event_type().as_str());
            event.set(StatParameter::Sector, vehicle.sector.to_string());
        }
        if let Some(delay_ms) = notification.delay_ms {
            event.set(StatParameter::DelayMs, delay_ms);
        }

        let outcome = match notification.level {
            NotificationLevel::Success => "success",
            NotificationLevel::Error => "error",
            NotificationLevel::Info => "info",
        };
        event.set(StatParameter::Outcome, outcome);
        event.set(StatParameter::Message, notification.message);

        self.collector.add_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::simulation::vehicle_event::VehicleEvent;
    use crate::domain::utils::id::{LicensePlate, SectorId};

    /// Shared in-memory sink so the test can read what the writer thread produced.
    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_rows_follow_header_order() {
        let buffer = Buffer::default();
        let collector = Arc::new(StatsCollector::with_writer(Box::new(buffer.clone())));
        let notifier = StatisticsNotifier::new(collector.clone());
        notifier.set_run_id(SimulationRunId::new("run-1"));

        let event = VehicleEvent::parked(LicensePlate::new("SIM0001"), SectorId::new("A"), -23.5, -46.6);
        notifier.notify(Notification::failed(event, 61_000, "HTTP 400"));
        collector.shutdown();

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "Time;RunId;LicensePlate;EventType;Sector;DelayMs;Outcome;Message");
        let fields: Vec<&str> = lines[1].split(';').collect();
        assert_eq!(&fields[1..], &["run-1", "SIM0001", "PARKED", "A", "61000", "error", "HTTP 400"]);
    }

    #[test]
    fn test_shutdown_writes_every_queued_row() {
        let buffer = Buffer::default();
        let collector = StatsCollector::with_writer(Box::new(buffer.clone()));

        for i in 0..50 {
            let mut event = StatisticEvent::new();
            event.set(StatParameter::Message, format!("row {}", i));
            collector.add_event(event);
        }
        collector.shutdown();
        collector.add_event(StatisticEvent::new());

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.lines().count(), 51);
        assert!(output.lines().last().unwrap().ends_with("row 49"));
    }

    #[test]
    fn test_missing_values_render_as_na() {
        let mut event = StatisticEvent::new();
        event.set(StatParameter::Time, 5i64).set(StatParameter::Message, "hello");

        assert_eq!(event.row(), vec!["5", "NA", "NA", "NA", "NA", "NA", "NA", "hello"]);
    }
}
