pub mod emulator;

use crate::gb::EmulatorConfig;
use crate::gb::cartridge::Cartridge;
use crate::gui::emulator::EmulatorFrontend;
use eframe::egui;
use egui::{CentralPanel, Color32, Label, RichText, TopBottomPanel, Ui, Widget};

pub struct PocketBoy {
    frontend: EmulatorFrontend,
    title: String,
}

impl PocketBoy {
    /// Starts the emulator thread with the given cartridge.
    pub fn new(cartridge: Cartridge, config: EmulatorConfig) -> Self {
        let title = cartridge.to_string();
        Self {
            frontend: EmulatorFrontend::start(cartridge, config),
            title,
        }
    }

    /// Draws the top panel of the main window.
    fn draw_top_panel(&self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            Label::new(RichText::new(&self.title).color(Color32::ORANGE))
                .selectable(false)
                .ui(ui);
        });
    }
}

impl eframe::App for PocketBoy {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        TopBottomPanel::top("top_panel").show(ctx, |ui| {
            self.draw_top_panel(ui);
        });
        CentralPanel::default().show(ctx, |ui| {
            self.frontend.update(ctx, ui);
        });
        if ctx.input(|i| i.viewport().close_requested()) {
            self.frontend.shutdown();
        }
    }
}
