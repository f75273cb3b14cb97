use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{debug, info};
use ringbuf::HeapRb;

use cwlink_detect::{GapTiming, MorseDecoder, ToneDetector, Tuning};
use cwlink_modem::device;
use cwlink_modem::keyer;

const RING_CAP: usize = 48_000 * 4;

#[derive(Parser, Debug)]
#[command(name = "cwlink", about = "Audible Morse receiver and audio keyer")]
struct Args {
    /// Tone frequency to detect or transmit, in Hz.
    #[arg(long, default_value_t = 600.0)]
    freq: f32,

    /// Detection threshold as a fraction of the range above the noise floor.
    #[arg(long, default_value_t = 0.1)]
    threshold: f32,

    /// Recalibrate the threshold from the spectrum on every frame.
    #[arg(long)]
    auto_threshold: bool,

    /// Keying speed in words per minute.
    #[arg(long, default_value_t = 20.0)]
    wpm: f32,

    /// FFT window length in samples, rounded up to a power of two.
    #[arg(long, default_value_t = 1024)]
    window: usize,

    /// Regex selecting the audio device by name.
    #[arg(long)]
    device: Option<String>,

    /// Sidetone output level.
    #[arg(long, default_value_t = 0.5)]
    level: f32,

    /// Transmit this message instead of listening.
    #[arg(long)]
    send: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    match &args.send {
        Some(message) => send(&args, message),
        None => listen(&args),
    }
}

fn send(args: &Args, message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let gate = Arc::new(AtomicBool::new(false));
    let _output = device::start_default_output(
        Arc::clone(&gate),
        args.freq,
        args.level,
        args.device.as_deref(),
    )?;

    debug!("symbols: {}", cwlink_code::encode(message));
    info!("keying at {} wpm, {} Hz sidetone", args.wpm, args.freq);
    let sink = device::SidetoneSink::new(gate);
    keyer::spawn_send(sink, message, args.wpm).wait();
    Ok(())
}

fn listen(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let ring = HeapRb::<f32>::new(RING_CAP);
    let (producer, mut consumer) = ring.split();
    let (_input, sample_rate_hz) = device::start_default_input(producer, args.device.as_deref())?;

    let tuning = Arc::new(Tuning::new(args.freq, args.threshold, args.auto_threshold));
    let mut detector =
        ToneDetector::with_window_len(sample_rate_hz, args.window, Arc::clone(&tuning));
    let mut decoder = MorseDecoder::new(GapTiming::default());
    info!(
        "listening for {} Hz, one decision every {:.1} ms",
        args.freq,
        1000.0 * detector.window_len() as f32 / sample_rate_hz
    );

    let mut stdout = std::io::stdout();
    loop {
        match consumer.pop() {
            Some(sample) => {
                if let Some(tone) = detector.push_sample(sample) {
                    for ch in decoder.push(tone, Instant::now()) {
                        print!("{ch}");
                        stdout.flush()?;
                    }
                }
            }
            None => std::thread::sleep(Duration::from_millis(1)),
        }
    }
}
