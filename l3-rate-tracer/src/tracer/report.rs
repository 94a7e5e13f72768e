use crate::event::Category;
use crate::stats::StatsSample;
use crate::topology::Face;
use crate::tracer::period::AveragingPeriod;
use sim_runtime::time::SimTime;
use std::fmt::{Display, Formatter};
use std::io;
use std::io::Write;
use std::sync::Arc;

pub const REPORT_COLUMNS: [&str; 7] = [
    "Time",
    "Node",
    "FaceId",
    "FaceDescr",
    "Type",
    "Packets",
    "Kilobytes",
];

pub fn write_header(w: &mut impl Write) -> io::Result<()> {
    writeln!(w, "{}", REPORT_COLUMNS.join("\t"))
}

/// One line of the rate report: a single counter of a single face, averaged over one period
#[derive(Clone, Debug, PartialEq)]
pub struct ReportRow {
    pub time: SimTime,
    pub node: Arc<str>,
    pub face: Face,
    pub category: Category,
    pub packets_per_sec: f64,
    pub bytes_per_sec: f64,
}

impl ReportRow {
    pub fn from_sample(
        time: SimTime,
        node: Arc<str>,
        sample: StatsSample,
        period: AveragingPeriod,
    ) -> Self {
        let period_secs = period.as_secs_f64();
        Self {
            time,
            node,
            face: sample.face,
            category: sample.category,
            packets_per_sec: sample.stats.packets as f64 / period_secs,
            bytes_per_sec: sample.stats.bytes as f64 / period_secs,
        }
    }

    /// The value of the `Kilobytes` column, with 1 KiB = 1024 bytes
    pub fn kilobytes_per_sec(&self) -> f64 {
        self.bytes_per_sec / 1024.0
    }
}

impl Display for ReportRow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.time,
            self.node,
            self.face.id(),
            self.face.description(),
            self.category,
            self.packets_per_sec,
            self.kilobytes_per_sec()
        )
    }
}
