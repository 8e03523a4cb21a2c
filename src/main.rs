// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
mod drivers;
mod engine;
mod gui;
mod scope;
mod types;
use eframe::egui;
// 入口函数
fn main() -> eframe::Result<()> {
    env_logger::init();
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1200.0, 1000.0])
        .with_min_inner_size([900.0, 700.0])
        .with_title("Oscilloscope Simulator");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "bitscope",
        options,
        Box::new(|_cc| Box::new(gui::ScopeApp::default())),
    )
}
