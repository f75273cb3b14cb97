use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::debug;

use cwlink_code::{encode, symbol_duration};

/// Transmit collaborator contract: whatever keys the actual transmitter
/// only has to hold a boolean line.
pub trait LineSink: Send {
    fn set_line_state(&mut self, on: bool);
}

/// A running transmission. Dropping the handle leaves the worker running
/// to completion; `abort` stops it at the next symbol boundary.
pub struct SendHandle {
    cancel: Arc<AtomicBool>,
    worker: JoinHandle<()>,
}

impl SendHandle {
    /// Request cancellation. The worker checks between symbols, so the
    /// line drops within one symbol duration.
    pub fn abort(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Block until the transmission ends or is aborted.
    pub fn wait(self) {
        let _ = self.worker.join();
    }
}

/// Key `text` out through the sink on a dedicated worker thread.
///
/// The worker walks the encoded symbol string, holding the line high for
/// dots and dashes and low for separators, each for its duration at
/// `wpm`. The line is always left low on exit.
pub fn spawn_send<S: LineSink + 'static>(mut sink: S, text: &str, wpm: f32) -> SendHandle {
    let symbols = encode(text);
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    debug!("keying {:?} at {} wpm", symbols, wpm);

    let worker = thread::spawn(move || {
        for symbol in symbols.chars() {
            if flag.load(Ordering::Relaxed) {
                break;
            }
            sink.set_line_state(symbol != ' ');
            thread::sleep(symbol_duration(symbol, wpm));
        }
        sink.set_line_state(false);
    });

    SendHandle { cancel, worker }
}
