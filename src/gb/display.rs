use crate::gb::joypad::JoypadInput;
use crate::gb::ppu::buffer::FrameBuffer;
use crate::gb::{EmulatorMessage, FrontendMessage, NANOS_PER_CYCLE};
use std::sync::mpsc::{Receiver, SyncSender, TryRecvError, TrySendError};
use std::time::{Duration, Instant};

/// Amount of cycles between two pacing checks.
const SYNC_INTERVAL_CYCLES: u64 = 4096;

/// Result of polling the display for user interaction.
#[derive(Copy, Clone, Default, Debug, PartialEq)]
pub struct DisplayEvent {
    pub quit: bool,
    pub input: JoypadInput,
}

/// The presentation side of the emulator. The PPU hands over every finished frame
/// and the emulator loop polls it for termination requests and key states.
pub trait Display {
    /// Presents a completed frame.
    fn present(&mut self, frame: &FrameBuffer);

    /// Returns whether the user requested termination and the currently pressed keys.
    fn poll(&mut self) -> DisplayEvent;
}

/// Display without any output, used for test ROMs and benchmarking.
#[derive(Default)]
pub struct HeadlessDisplay {
    frames: u64,
    limit: Option<u64>,
}

impl HeadlessDisplay {
    /// Creates a headless display that requests termination after `limit` frames.
    pub const fn new(limit: Option<u64>) -> Self {
        Self { frames: 0, limit }
    }

    /// Returns the amount of presented frames.
    #[inline]
    pub const fn frames(&self) -> u64 {
        self.frames
    }
}

impl Display for HeadlessDisplay {
    #[inline]
    fn present(&mut self, _frame: &FrameBuffer) {
        self.frames += 1;
    }

    #[inline]
    fn poll(&mut self) -> DisplayEvent {
        DisplayEvent {
            quit: self.limit.is_some_and(|limit| self.frames() >= limit),
            input: JoypadInput::default(),
        }
    }
}

/// Forwards frames to the frontend thread and receives its messages.
pub struct ChannelDisplay {
    sender: SyncSender<EmulatorMessage>,
    receiver: Receiver<FrontendMessage>,
    input: JoypadInput,
    quit: bool,
}

impl ChannelDisplay {
    pub const fn new(
        sender: SyncSender<EmulatorMessage>,
        receiver: Receiver<FrontendMessage>,
    ) -> Self {
        Self {
            sender,
            receiver,
            input: JoypadInput::NONE,
            quit: false,
        }
    }
}

impl Display for ChannelDisplay {
    /// Sends the frame to the frontend, frames are dropped while the frontend is busy.
    fn present(&mut self, frame: &FrameBuffer) {
        match self.sender.try_send(EmulatorMessage::Frame(frame.clone())) {
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Disconnected(_)) => self.quit = true,
        }
    }

    fn poll(&mut self) -> DisplayEvent {
        loop {
            match self.receiver.try_recv() {
                Ok(FrontendMessage::Stop) => self.quit = true,
                Ok(FrontendMessage::Input(input)) => self.input = input,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.quit = true;
                    break;
                }
            }
        }
        DisplayEvent {
            quit: self.quit,
            input: self.input,
        }
    }
}

/// Paces the emulation to the speed of the real hardware.
pub struct SpeedLimiter {
    start: Instant,
    next_sync: u64,
}

impl Default for SpeedLimiter {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            next_sync: SYNC_INTERVAL_CYCLES,
        }
    }
}

impl SpeedLimiter {

    /// Blocks the current thread until the wall clock caught up with the emulated cycles.
    pub fn wait(&mut self, total_cycles: u64) {
        if total_cycles < self.next_sync {
            return;
        }
        self.next_sync = total_cycles + SYNC_INTERVAL_CYCLES;

        let target = Duration::from_nanos((total_cycles as f64 * NANOS_PER_CYCLE) as u64);
        let elapsed = self.start.elapsed();
        if elapsed < target {
            spin_sleep::sleep(target - elapsed);
        }
    }
}
