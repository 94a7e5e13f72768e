use crate::error::TracerError;
use crate::tracer::report::{ReportRow, write_header};
use parking_lot::Mutex;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Where a report goes; the path `-` selects standard output
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    pub const STDOUT_PLACEHOLDER: &'static str = "-";

    pub fn parse(path: &str) -> Self {
        if path == Self::STDOUT_PLACEHOLDER {
            Destination::Stdout
        } else {
            Destination::File(path.into())
        }
    }
}

impl FromStr for Destination {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Destination {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl Display for Destination {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::Stdout => f.write_str("<stdout>"),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A report destination shared by every tracer writing to it
///
/// Cloning produces another handle to the same destination. The underlying writer is flushed
/// after every batch of rows and once more when the last handle is dropped.
#[derive(Clone)]
pub struct OutputStream {
    inner: Arc<Mutex<StreamInner>>,
}

struct StreamInner {
    label: String,
    writer: Box<dyn Write + Send>,
    header_written: bool,
}

impl OutputStream {
    pub fn open(destination: &Destination) -> Result<Self, TracerError> {
        let writer: Box<dyn Write + Send> = match destination {
            Destination::Stdout => Box::new(BufWriter::new(io::stdout())),
            Destination::File(path) => {
                let file =
                    File::create(path).map_err(|source| TracerError::DestinationOpenFailure {
                        path: path.clone(),
                        source,
                    })?;
                Box::new(BufWriter::new(file))
            }
        };

        tracing::debug!(destination = %destination, "opened rate trace destination");
        Ok(Self::from_writer(destination.to_string(), writer))
    }

    /// Wraps an already open writer, e.g. an in-memory buffer
    pub fn from_writer(label: impl Into<String>, writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StreamInner {
                label: label.into(),
                writer: Box::new(writer),
                header_written: false,
            })),
        }
    }

    pub fn label(&self) -> String {
        self.inner.lock().label.clone()
    }

    /// Writes the column header unless this stream already has one; returns whether it wrote
    pub fn write_header_once(&self) -> io::Result<bool> {
        let mut inner = self.inner.lock();
        if inner.header_written {
            return Ok(false);
        }

        write_header(&mut inner.writer)?;
        inner.writer.flush()?;
        inner.header_written = true;
        Ok(true)
    }

    pub fn header_written(&self) -> bool {
        self.inner.lock().header_written
    }

    /// Writes a batch of rows without interleaving them with other writers, then flushes
    pub fn write_rows(&self, rows: &[ReportRow]) -> io::Result<()> {
        let mut inner = self.inner.lock();
        for row in rows {
            writeln!(inner.writer, "{row}")?;
        }

        inner.writer.flush()
    }

    pub fn flush(&self) -> io::Result<()> {
        self.inner.lock().writer.flush()
    }

    pub fn ptr_eq(&self, other: &OutputStream) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live handles to this stream
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl Drop for StreamInner {
    fn drop(&mut self) {
        if let Err(error) = self.writer.flush() {
            tracing::warn!(
                destination = %self.label,
                %error,
                "failed to flush rate trace destination"
            );
        }
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use parking_lot::Mutex;
    use std::io;
    use std::io::Write;
    use std::sync::Arc;

    /// A writer that keeps everything in memory and can be inspected while shared
    #[derive(Clone, Default)]
    pub struct MemoryWriter {
        buffer: Arc<Mutex<Vec<u8>>>,
    }

    impl MemoryWriter {
        pub fn contents(&self) -> String {
            String::from_utf8(self.buffer.lock().clone()).unwrap()
        }

        pub fn lines(&self) -> Vec<String> {
            self.contents().lines().map(|l| l.to_string()).collect()
        }

        /// Report lines split into their columns, header excluded
        pub fn rows(&self) -> Vec<Vec<String>> {
            self.lines()
                .into_iter()
                .filter(|l| !l.starts_with("Time\t"))
                .map(|l| l.split('\t').map(|c| c.to_string()).collect())
                .collect()
        }
    }

    impl Write for MemoryWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// A writer whose every operation fails
    pub struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken"))
        }
    }

    pub fn memory_stream() -> (super::OutputStream, MemoryWriter) {
        let writer = MemoryWriter::default();
        (
            super::OutputStream::from_writer("memory", writer.clone()),
            writer,
        )
    }
}

#[cfg(test)]
mod test {
    use super::test_util::{BrokenWriter, memory_stream};
    use super::*;
    use crate::event::Category;
    use crate::topology::{Face, FaceId};
    use sim_runtime::time::SimTime;

    #[test]
    fn test_parse_destination() {
        assert_eq!(Destination::parse("-"), Destination::Stdout);
        assert_eq!(
            Destination::parse("rate-trace.txt"),
            Destination::File("rate-trace.txt".into())
        );
        assert_eq!(
            "--".parse::<Destination>().unwrap(),
            Destination::File("--".into())
        );
    }

    #[test]
    fn test_header_written_once_per_stream() {
        let (stream, buffer) = memory_stream();
        let other_handle = stream.clone();

        assert!(stream.write_header_once().unwrap());
        assert!(!other_handle.write_header_once().unwrap());
        assert!(other_handle.header_written());
        assert_eq!(buffer.lines().len(), 1);
    }

    #[test]
    fn test_write_rows() {
        let (stream, buffer) = memory_stream();
        let row = ReportRow {
            time: SimTime::ZERO,
            node: "n".into(),
            face: Face::new(FaceId(1), "appFace://"),
            category: Category::DropData,
            packets_per_sec: 2.0,
            bytes_per_sec: 2048.0,
        };

        stream.write_rows(&[row.clone(), row]).unwrap();
        assert_eq!(
            buffer.lines(),
            vec!["0\tn\t1\tappFace://\tDropData\t2\t2"; 2]
        );
    }

    #[test]
    fn test_open_failure_names_path() {
        let path = std::env::temp_dir()
            .join("l3-rate-tracer-missing-dir")
            .join("trace.txt");
        let result = OutputStream::open(&Destination::File(path.clone()));

        match result {
            Err(TracerError::DestinationOpenFailure { path: failed, .. }) => {
                assert_eq!(failed, path)
            }
            _ => panic!("expected the open to fail"),
        }
    }

    #[test]
    fn test_write_errors_are_reported() {
        let stream = OutputStream::from_writer("broken", BrokenWriter);
        assert!(stream.write_header_once().is_err());
        assert!(!stream.header_written());
        assert!(stream.flush().is_err());
    }

    #[test]
    fn test_last_handle_flushes_file() {
        let path = std::env::temp_dir().join(format!(
            "l3-rate-tracer-flush-{}.txt",
            std::process::id()
        ));
        let stream = OutputStream::open(&Destination::File(path.clone())).unwrap();
        let second = stream.clone();
        assert_eq!(stream.handle_count(), 2);

        second.write_header_once().unwrap();
        drop(second);
        drop(stream);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Time\tNode"));
        std::fs::remove_file(path).ok();
    }
}
