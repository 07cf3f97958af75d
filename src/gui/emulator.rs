use crate::gb::cartridge::Cartridge;
use crate::gb::display::ChannelDisplay;
use crate::gb::joypad::JoypadInput;
use crate::gb::ppu::buffer::FrameBuffer;
use crate::gb::{Emulator, EmulatorConfig, EmulatorMessage, FrontendMessage};
use eframe::egui;
use eframe::epaint::ColorImage;
use eframe::epaint::textures::TextureOptions;
use egui::{InputState, Key, TextureHandle, Ui, Vec2};
use std::sync::mpsc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::thread::JoinHandle;

/// A channel to communicate between the emulator and the frontend.
/// The frontend can send messages with `sender`
/// and receive messages from the emulator with `receiver`.
struct EmulatorChannel {
    pub sender: Sender<FrontendMessage>,
    pub receiver: Receiver<EmulatorMessage>,
}

impl EmulatorChannel {
    #[inline]
    pub const fn new(sender: Sender<FrontendMessage>, receiver: Receiver<EmulatorMessage>) -> Self {
        Self { sender, receiver }
    }
}

/// The emulator frontend is responsible for handling the emulator instance,
/// it runs in a separate thread and communicates with the emulator using a channel.
pub struct EmulatorFrontend {
    thread: Option<JoinHandle<()>>,
    channel: EmulatorChannel,
    frame: Option<TextureHandle>,
    input: JoypadInput,
    upscale: usize,
}

impl EmulatorFrontend {
    pub fn update(&mut self, ctx: &egui::Context, ui: &mut Ui) {
        self.handle_user_input(ui);
        self.recv_messages(ctx);
        self.draw_emulator_frame(ui);
        ctx.request_repaint();
    }

    /// Starts the emulator with the given cartridge on a new thread.
    pub fn start(cartridge: Cartridge, config: EmulatorConfig) -> Self {
        // Frames are dropped by the emulator while the previous one is still pending
        let (emulator_sender, emulator_receiver) = mpsc::sync_channel(1);
        let (frontend_sender, frontend_receiver) = mpsc::channel();
        let upscale = config.upscale;

        let thread = thread::spawn(move || {
            let display = ChannelDisplay::new(emulator_sender, frontend_receiver);
            let mut emulator = Emulator::new(cartridge, display, &config);
            if let Err(err) = emulator.run() {
                log::error!("Emulator terminated: {err}");
            }
        });
        Self {
            thread: Some(thread),
            channel: EmulatorChannel::new(frontend_sender, emulator_receiver),
            frame: None,
            input: JoypadInput::NONE,
            upscale,
        }
    }

    /// Shuts the emulator down by sending a stop message and waiting for the thread to finish.
    pub fn shutdown(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        log::info!("Stopping emulator...");
        self.send_message(FrontendMessage::Stop);
        if thread.join().is_err() {
            log::error!("Emulator thread panicked");
        }
    }

    /// Draws the latest frame from the emulator to the screen
    #[inline]
    fn draw_emulator_frame(&self, ui: &mut Ui) {
        if let Some(frame) = &self.frame {
            let [width, height] = frame.size();
            let size = Vec2::new(
                (width * self.upscale) as f32,
                (height * self.upscale) as f32,
            );
            ui.image((frame.id(), size));
        }
    }

    /// Sets the frame texture to the given `FrameBuffer`.
    fn set_frame_texture(&mut self, frame: &FrameBuffer, ctx: &egui::Context) {
        let image =
            ColorImage::from_rgba_unmultiplied([frame.width(), frame.height()], frame.as_rgba());
        let options = TextureOptions::NEAREST;

        // Set the new frame to the texture or create a new one if it doesn't exist
        if let Some(texture) = &mut self.frame {
            texture.set(image, options);
        } else {
            self.frame = Some(ctx.load_texture("frame", image, options));
        }
    }

    /// Drains all pending messages from the emulator, only the latest frame is uploaded.
    fn recv_messages(&mut self, ctx: &egui::Context) {
        let mut latest = None;
        while let Ok(msg) = self.channel.receiver.try_recv() {
            match msg {
                EmulatorMessage::Frame(frame) => latest = Some(frame),
            }
        }
        if let Some(frame) = latest {
            self.set_frame_texture(&frame, ctx);
        }
    }

    /// Sends a message to the emulator.
    #[inline]
    fn send_message(&self, message: FrontendMessage) {
        if let Err(msg) = self.channel.sender.send(message) {
            log::warn!("Emulator isn't running: {msg}");
        }
    }

    /// Sends the current key snapshot to the emulator whenever it changes.
    fn handle_user_input(&mut self, ui: &mut Ui) {
        let input = ui.input(read_keys);
        if input != self.input {
            self.input = input;
            self.send_message(FrontendMessage::Input(input));
        }
    }
}

impl Drop for EmulatorFrontend {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Maps the keyboard state to the joypad buttons.
fn read_keys(i: &InputState) -> JoypadInput {
    JoypadInput {
        a: i.key_down(Key::Z),
        b: i.key_down(Key::X),
        select: i.key_down(Key::Backspace),
        start: i.key_down(Key::Enter),
        up: i.key_down(Key::ArrowUp),
        down: i.key_down(Key::ArrowDown),
        left: i.key_down(Key::ArrowLeft),
        right: i.key_down(Key::ArrowRight),
    }
}
