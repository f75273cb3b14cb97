use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{info, warn};
use regex::Regex;
use ringbuf::HeapProducer;

use crate::error::ModemError;
use crate::keyer::LineSink;

/// Open the default (or regex-matched) input device and feed mono f32
/// samples into the ring buffer producer. Returns the stream handle and
/// the device sample rate; capture runs for as long as the handle lives.
pub fn start_default_input(
    mut producer: HeapProducer<f32>,
    device_regex: Option<&str>,
) -> Result<(cpal::Stream, f32), ModemError> {
    let host = cpal::default_host();
    let device = select_input_device(&host, device_regex)?;
    let config = device.default_input_config()?;
    if config.sample_format() != cpal::SampleFormat::F32 {
        return Err(ModemError::UnsupportedFormat);
    }
    let config: cpal::StreamConfig = config.into();
    let channels = config.channels as usize;
    let sample_rate_hz = config.sample_rate.0 as f32;
    info!(
        "capturing from {} at {} Hz ({} channels)",
        device.name().unwrap_or_else(|_| "<unknown>".to_string()),
        config.sample_rate.0,
        channels
    );

    let err_fn = |err| warn!("audio stream error: {}", err);
    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            for frame in data.chunks(channels) {
                // A full ring means the processing thread stalled;
                // dropping samples keeps the callback bounded.
                let _ = producer.push(frame[0]);
            }
        },
        err_fn,
        None,
    )?;
    stream.play()?;
    Ok((stream, sample_rate_hz))
}

/// Audio rendition of the transmit line: while the gate is up the output
/// stream carries the sidetone, otherwise silence.
pub struct SidetoneSink {
    gate: Arc<AtomicBool>,
}

impl SidetoneSink {
    pub fn new(gate: Arc<AtomicBool>) -> Self {
        Self { gate }
    }
}

impl LineSink for SidetoneSink {
    fn set_line_state(&mut self, on: bool) {
        self.gate.store(on, Ordering::Relaxed);
    }
}

/// Open the default (or regex-matched) output device and render the
/// gated sidetone. The oscillator phase keeps advancing through gaps so
/// keying never clicks the phase backwards.
pub fn start_default_output(
    gate: Arc<AtomicBool>,
    tone_freq_hz: f32,
    level: f32,
    device_regex: Option<&str>,
) -> Result<cpal::Stream, ModemError> {
    let host = cpal::default_host();
    let device = select_output_device(&host, device_regex)?;
    let config = device.default_output_config()?;
    if config.sample_format() != cpal::SampleFormat::F32 {
        return Err(ModemError::UnsupportedFormat);
    }
    let config: cpal::StreamConfig = config.into();
    let channels = config.channels as usize;
    let mut phase: f32 = 0.0;
    let phase_inc = std::f32::consts::TAU * tone_freq_hz / config.sample_rate.0 as f32;
    info!(
        "sidetone on {} at {} Hz",
        device.name().unwrap_or_else(|_| "<unknown>".to_string()),
        tone_freq_hz
    );

    let err_fn = |err| warn!("audio stream error: {}", err);
    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let sample = if gate.load(Ordering::Relaxed) {
                    phase.sin() * level
                } else {
                    0.0
                };
                phase += phase_inc;
                if phase >= std::f32::consts::TAU {
                    phase -= std::f32::consts::TAU;
                }
                for out in frame.iter_mut() {
                    *out = sample;
                }
            }
        },
        err_fn,
        None,
    )?;
    stream.play()?;
    Ok(stream)
}

fn select_input_device(
    host: &cpal::Host,
    device_regex: Option<&str>,
) -> Result<cpal::Device, ModemError> {
    if let Some(pattern) = device_regex {
        let re = Regex::new(pattern)?;
        for dev in host.input_devices()? {
            let name = dev.name().unwrap_or_else(|_| "<unknown>".to_string());
            if re.is_match(&name) {
                return Ok(dev);
            }
        }
        return Err(ModemError::NoInputDevice);
    }

    host.default_input_device().ok_or(ModemError::NoInputDevice)
}

fn select_output_device(
    host: &cpal::Host,
    device_regex: Option<&str>,
) -> Result<cpal::Device, ModemError> {
    if let Some(pattern) = device_regex {
        let re = Regex::new(pattern)?;
        for dev in host.output_devices()? {
            let name = dev.name().unwrap_or_else(|_| "<unknown>".to_string());
            if re.is_match(&name) {
                return Ok(dev);
            }
        }
        return Err(ModemError::NoOutputDevice);
    }

    host.default_output_device()
        .ok_or(ModemError::NoOutputDevice)
}
