use crate::error::TracerError;
use crate::event::{TrafficEvent, TrafficSink};
use crate::output::OutputStream;
use crate::stats::{StatsSample, StatsTable};
use crate::topology::{Face, Node};
use crate::tracer::period::AveragingPeriod;
use crate::tracer::report::ReportRow;
use futures::{FutureExt, select_biased};
use parking_lot::Mutex;
use sim_runtime::cancellation::{CancellationSignal, CancellationToken};
use sim_runtime::time::{self, SimTime};
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Tracks per-face traffic of a single node and periodically reports it as rates
///
/// Every averaging period, starting one period after the tracer is created, the counters are
/// converted into rates, written to the tracer's [`OutputStream`] and reset. Dropping the tracer
/// stops the periodic reports.
pub struct RateTracer {
    state: Arc<TracerState>,
    printer: Mutex<Option<CancellationSignal>>,
}

/// Everything the periodic printer task needs, so it never outlives what it writes to
struct TracerState {
    node: Arc<Node>,
    stream: OutputStream,
    period: Mutex<AveragingPeriod>,
    stats: Mutex<StatsTable>,
}

impl RateTracer {
    /// Creates the tracer and schedules its first report
    ///
    /// Must be called from within the simulation runtime. The header is not written here, see
    /// [`RateTracer::print_header`].
    pub fn new(
        node: Arc<Node>,
        stream: OutputStream,
        period: Duration,
    ) -> Result<Self, TracerError> {
        let period = AveragingPeriod::new(period)?;
        let first_report = first_report_after(period)?;
        let tracer = Self {
            state: Arc::new(TracerState {
                node,
                stream,
                period: Mutex::new(period),
                stats: Mutex::new(StatsTable::new()),
            }),
            printer: Mutex::new(None),
        };

        tracer.start_printer(first_report, period);
        tracing::debug!(
            node = %tracer.state.node.name(),
            period_s = period.as_secs_f64(),
            "rate tracer installed"
        );

        Ok(tracer)
    }

    pub fn node(&self) -> &Arc<Node> {
        &self.state.node
    }

    pub fn stream(&self) -> &OutputStream {
        &self.state.stream
    }

    pub fn averaging_period(&self) -> AveragingPeriod {
        *self.state.period.lock()
    }

    /// Changes the averaging period and restarts the report schedule from now
    ///
    /// Counters accumulated so far are kept and show up in the next report. A stopped tracer only
    /// takes the new period, it does not start reporting again. On error nothing changes.
    pub fn set_averaging_period(&self, period: Duration) -> Result<(), TracerError> {
        let period = AveragingPeriod::new(period)?;
        let first_report = first_report_after(period)?;
        *self.state.period.lock() = period;

        let mut printer = self.printer.lock();
        if let Some(previous) = printer.take() {
            previous.cancel();
            *printer = Some(self.spawn_printer(first_report, period));
        }
        drop(printer);

        tracing::debug!(
            node = %self.state.node.name(),
            period_s = period.as_secs_f64(),
            "averaging period changed"
        );
        Ok(())
    }

    /// Writes the column header, unless the stream already carries one
    pub fn print_header(&self) -> io::Result<bool> {
        self.state.stream.write_header_once()
    }

    /// Converts the current counters into report rows and zeroes them
    ///
    /// Rows are timestamped with the current simulation time, so this must run inside the
    /// simulation runtime.
    pub fn report_and_reset(&self) -> Vec<ReportRow> {
        self.state.report_and_reset()
    }

    /// Like [`RateTracer::report_and_reset`], but writes the rows to the output stream
    pub fn print_and_reset(&self) -> io::Result<()> {
        self.state.print_and_reset()
    }

    /// The current counters, without resetting them
    pub fn stats_snapshot(&self) -> Vec<StatsSample> {
        self.state.stats.lock().snapshot()
    }

    /// Stops the periodic reports for good; calling it again has no effect
    pub fn stop(&self) {
        let signal = self.printer.lock().take();
        if let Some(signal) = signal {
            signal.cancel();
            tracing::debug!(node = %self.state.node.name(), "rate tracer stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.printer.lock().is_some()
    }

    fn start_printer(&self, first_report: SimTime, period: AveragingPeriod) {
        let signal = self.spawn_printer(first_report, period);
        *self.printer.lock() = Some(signal);
    }

    fn spawn_printer(&self, first_report: SimTime, period: AveragingPeriod) -> CancellationSignal {
        let (token, signal) = CancellationToken::new();
        sim_runtime::spawn(
            self.state
                .clone()
                .print_periodically(first_report, period, token),
        );
        signal
    }
}

/// When the first report of a schedule starting now is due
fn first_report_after(period: AveragingPeriod) -> Result<SimTime, TracerError> {
    SimTime::now()
        .checked_add(period.as_duration())
        .ok_or_else(|| {
            TracerError::InvalidArgument(format!(
                "averaging period of {}s does not fit the simulation clock",
                period.as_secs_f64()
            ))
        })
}

impl TrafficSink for RateTracer {
    fn on_traffic(&self, face: &Face, event: TrafficEvent, size_bytes: u64) {
        self.state.stats.lock().record(face, event, size_bytes);
    }
}

impl Drop for RateTracer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl TracerState {
    fn report_and_reset(&self) -> Vec<ReportRow> {
        let now = SimTime::now();
        let period = *self.period.lock();

        let mut stats = self.stats.lock();
        let rows = stats
            .snapshot()
            .into_iter()
            .map(|sample| ReportRow::from_sample(now, self.node.name().clone(), sample, period))
            .collect();

        let activity = stats.activity();
        tracing::trace!(
            node = %self.node.name(),
            faces = stats.len(),
            inserts = activity.inserts(),
            lookups = activity.lookups(),
            "stats table activity since last report"
        );

        stats.reset();
        stats.reset_activity();
        rows
    }

    fn print_and_reset(&self) -> io::Result<()> {
        let rows = self.report_and_reset();
        self.stream.write_rows(&rows)
    }

    async fn print_periodically(
        self: Arc<Self>,
        mut next_report: SimTime,
        period: AveragingPeriod,
        token: CancellationToken,
    ) {
        loop {
            select_biased! {
                _ = token.cancelled().fuse() => return,
                _ = time::sleep_until(next_report).fuse() => {}
            }

            if let Err(error) = self.print_and_reset() {
                tracing::warn!(node = %self.node.name(), %error, "failed to write rate report");
            }

            // Deadlines are derived from the schedule, not from when the report was written
            match next_report.checked_add(period.as_duration()) {
                Some(next) => next_report = next,
                None => {
                    tracing::debug!(node = %self.node.name(), "no further report fits the clock");
                    return;
                }
            }
        }
    }
}
