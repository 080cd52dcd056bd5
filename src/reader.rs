//! Polling reader that assembles lines from a byte source and dispatches
//! parsed GPRMC fixes to registered observers.
//!
//! The reader owns a background worker thread that drains the byte source,
//! reassembles newline-terminated sentences across reads, and notifies
//! observers synchronously on the worker thread. Fix observers only see
//! fixes that pass the significance filter; raw line observers see every
//! structurally complete line.

use std::collections::VecDeque;
use std::io;
use std::mem;
use std::str;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use err::ReaderError;
use geo;
use parser::{self, GpsFix};

/// Pause between polls of the byte source when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Minimum distance between notified fixes when none is configured. Zero
/// means every parsed fix is significant.
pub const DEFAULT_MIN_DISTANCE_MILES: f64 = 0.0;

/// How long `stop` waits for the worker before abandoning it.
const STOP_GRACE_PERIOD: Duration = Duration::from_secs(5);

const SENTENCE_PREFIX: &str = "$GPRMC";

/// A source of raw NMEA bytes, typically a serial/UART device.
///
/// Both operations must be non-blocking or of bounded latency; the polling
/// worker calls them once per cycle and a source that blocks indefinitely
/// will stall `stop` into its forced-abandon path.
pub trait ByteSource {
    /// Number of bytes that can currently be read without blocking.
    fn bytes_to_read(&mut self) -> io::Result<usize>;
    /// Read into `buf`, returning the number of bytes actually read.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

type RawLineObserver = Box<dyn FnMut(&str) + Send>;
type FixObserver = Box<dyn FnMut(&GpsFix) + Send>;

#[derive(Default)]
struct Observers {
    raw_line: Vec<RawLineObserver>,
    fix: Vec<FixObserver>,
}

struct WorkerHandle {
    run: Arc<AtomicBool>,
    thread: JoinHandle<()>,
    done: Receiver<()>,
}

/// Polls a [`ByteSource`](trait.ByteSource.html) for GPRMC sentences and
/// notifies observers.
///
/// ```no_run
/// use gprmc::reader::{ChunkSource, Reader};
///
/// let source = ChunkSource::new(vec![
///     "$GPRMC,040302.663,A,3939.7,N,10506.6,W,0.27,358.86,200804,,,*33\n",
/// ]);
/// let reader = Reader::new(source);
/// reader.on_fix(|fix| println!("{:.4}, {:.4}", fix.latitude, fix.longitude));
/// reader.start().unwrap();
/// ```
pub struct Reader<S> {
    source: Arc<Mutex<S>>,
    observers: Arc<Mutex<Observers>>,
    worker: Mutex<Option<WorkerHandle>>,
    poll_interval: Duration,
    min_distance_miles: f64,
}

impl<S: ByteSource + Send + 'static> Reader<S> {
    /// Create a reader with the default poll interval and significance
    /// threshold.
    pub fn new(source: S) -> Self {
        Reader::with_options(source, DEFAULT_POLL_INTERVAL, DEFAULT_MIN_DISTANCE_MILES)
    }

    /// Create a reader with an explicit poll interval and minimum distance
    /// in miles between notified fixes. Both are fixed for the lifetime of
    /// the reader.
    pub fn with_options(source: S, poll_interval: Duration, min_distance_miles: f64) -> Self {
        Reader {
            source: Arc::new(Mutex::new(source)),
            observers: Arc::new(Mutex::new(Observers::default())),
            worker: Mutex::new(None),
            poll_interval,
            min_distance_miles,
        }
    }

    /// Register an observer for every structurally complete, non-empty
    /// line, GPRMC or not. Observers run on the worker thread in
    /// registration order.
    pub fn on_raw_line<F>(&self, observer: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.lock_observers().raw_line.push(Box::new(observer));
    }

    /// Register an observer for significant position fixes. Observers run
    /// on the worker thread in registration order.
    pub fn on_fix<F>(&self, observer: F)
    where
        F: FnMut(&GpsFix) + Send + 'static,
    {
        self.lock_observers().fix.push(Box::new(observer));
    }

    /// Whether the polling worker is currently running.
    pub fn is_started(&self) -> bool {
        self.lock_worker().is_some()
    }

    /// Spawn the polling worker. Fails with
    /// [`ReaderError::AlreadyStarted`](../err/enum.ReaderError.html) if the
    /// reader is already running; no second worker is spawned in that case.
    pub fn start(&self) -> Result<(), ReaderError> {
        let mut slot = self.lock_worker();
        if slot.is_some() {
            return Err(ReaderError::AlreadyStarted);
        }

        let run = Arc::new(AtomicBool::new(true));
        let (done_tx, done_rx) = mpsc::channel();
        let worker = Worker {
            source: Arc::clone(&self.source),
            observers: Arc::clone(&self.observers),
            run: Arc::clone(&run),
            poll_interval: self.poll_interval,
            dispatcher: Dispatcher::new(self.min_distance_miles),
        };
        let thread = thread::Builder::new()
            .name("gprmc-reader".into())
            .spawn(move || worker.run(done_tx))?;

        *slot = Some(WorkerHandle {
            run,
            thread,
            done: done_rx,
        });
        info!("reader started");
        Ok(())
    }

    /// Signal the worker to exit and wait up to five seconds for it.
    ///
    /// Fails with [`ReaderError::NotStarted`](../err/enum.ReaderError.html)
    /// if the reader is not running. A worker that misses the grace period
    /// is abandoned rather than joined; it was stuck in the byte source and
    /// will exit on its own if the source ever returns.
    pub fn stop(&self) -> Result<(), ReaderError> {
        let mut slot = self.lock_worker();
        let handle = match slot.take() {
            Some(handle) => handle,
            None => return Err(ReaderError::NotStarted),
        };

        handle.run.store(false, Ordering::SeqCst);
        match handle.done.recv_timeout(STOP_GRACE_PERIOD) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let _ = handle.thread.join();
                info!("reader stopped");
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "worker did not exit within {:?}, abandoning it",
                    STOP_GRACE_PERIOD
                );
            }
        }
        Ok(())
    }

    fn lock_observers(&self) -> ::std::sync::MutexGuard<Observers> {
        self.observers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_worker(&self) -> ::std::sync::MutexGuard<Option<WorkerHandle>> {
        self.worker.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct Worker<S> {
    source: Arc<Mutex<S>>,
    observers: Arc<Mutex<Observers>>,
    run: Arc<AtomicBool>,
    poll_interval: Duration,
    dispatcher: Dispatcher,
}

impl<S: ByteSource> Worker<S> {
    fn run(mut self, done: Sender<()>) {
        debug!("gps worker started");
        while self.run.load(Ordering::SeqCst) {
            if let Err(e) = self.poll_once() {
                // One bad cycle must not kill the worker.
                debug!("poll cycle skipped: {}", e);
            }
            thread::sleep(self.poll_interval);
        }
        debug!("gps worker stopped");
        let _ = done.send(());
    }

    fn poll_once(&mut self) -> io::Result<()> {
        let mut chunk = Vec::new();
        {
            let mut source = self.source.lock().unwrap_or_else(|e| e.into_inner());
            let available = source.bytes_to_read()?;
            if available == 0 {
                return Ok(());
            }
            chunk.resize(available, 0);
            let received = source.read(&mut chunk)?;
            chunk.truncate(received);
        }

        match str::from_utf8(&chunk) {
            Ok(text) => {
                let mut observers = self.observers.lock().unwrap_or_else(|e| e.into_inner());
                self.dispatcher.feed(text, &mut observers);
            }
            Err(e) => debug!("discarding undecodable chunk: {}", e),
        }
        Ok(())
    }
}

/// Line assembly and significance filtering, decoupled from the polling
/// thread so the stream logic is testable in isolation.
struct Dispatcher {
    pending: String,
    last_fix: Option<GpsFix>,
    last_update: Instant,
    min_distance_miles: f64,
}

impl Dispatcher {
    fn new(min_distance_miles: f64) -> Self {
        Dispatcher {
            pending: String::new(),
            last_fix: None,
            last_update: Instant::now(),
            min_distance_miles,
        }
    }

    /// Append `text` to the pending buffer and dispatch every complete
    /// line in it. Trailing text without a newline is retained for the
    /// next feed.
    fn feed(&mut self, text: &str, observers: &mut Observers) {
        let mut rest = text;
        while let Some(pos) = rest.find('\n') {
            self.pending.push_str(&rest[..pos]);
            rest = &rest[pos + 1..];

            let assembled = mem::replace(&mut self.pending, String::new());
            let line = assembled.trim();
            if !line.is_empty() {
                self.dispatch_line(line, observers);
            }
        }
        self.pending.push_str(rest);
    }

    fn dispatch_line(&mut self, line: &str, observers: &mut Observers) {
        if line.starts_with(SENTENCE_PREFIX) && !observers.fix.is_empty() {
            match parser::parse(line) {
                Ok(fix) => {
                    let notify = self.is_significant(&fix);
                    self.last_fix = Some(fix.clone());
                    if notify {
                        for observer in &mut observers.fix {
                            observer(&fix);
                        }
                    }
                }
                Err(e) => debug!("discarding sentence: {}", e),
            }
        }
        for observer in &mut observers.raw_line {
            observer(line);
        }
    }

    /// Decide whether `fix` is far enough from the last known fix to be
    /// worth notifying. The first fix is always significant.
    fn is_significant(&mut self, fix: &GpsFix) -> bool {
        let distance = match self.last_fix {
            Some(ref last) => geo::distance_in_miles(
                fix.latitude,
                fix.longitude,
                last.latitude,
                last.longitude,
            ),
            None => return true,
        };
        debug!("moved {:.4} mi since the last fix", distance);

        let mut significant = distance >= self.min_distance_miles;
        // Only the seconds-of-minute component of the elapsed time is
        // compared here, so a long quiet spell never forces a notification
        // on its own. Kept bit-for-bit compatible with the deployed policy.
        if self.last_update.elapsed().as_secs() % 60 > 60 {
            significant = true;
            self.last_update = Instant::now();
        }
        significant
    }
}

/// A scripted in-memory byte source for tests and demos: each call to
/// `bytes_to_read` reports the size of the next queued chunk.
pub struct ChunkSource {
    chunks: VecDeque<Vec<u8>>,
}

impl ChunkSource {
    pub fn new<I>(chunks: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Vec<u8>>,
    {
        ChunkSource {
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }
}

impl ByteSource for ChunkSource {
    fn bytes_to_read(&mut self) -> io::Result<usize> {
        Ok(self.chunks.front().map_or(0, Vec::len))
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.chunks.pop_front() {
            Some(chunk) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                Ok(n)
            }
            None => Ok(0),
        }
    }
}
