// src/gui.rs
use crate::drivers::port::{BAUD_RATES, DEFAULT_BAUD};
use crate::drivers::{parse_baud, render_trace_png, Channel, PlotStyle, PortSettings};
use crate::engine;
use crate::scope::Scope;
use crate::types::*;
use anyhow::Context;
use eframe::egui;
use egui::{Color32, RichText, Vec2};
use egui_plot::{Legend, Line, Plot, PlotBounds, PlotPoints, Points};
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// 每帧最多处理的消息数，剩下的留到下一帧
const MESSAGES_PER_FRAME: usize = 256;

pub struct ScopeApp {
    scope: Scope,
    connection_mode: ConnectionMode,
    selected_ports: [String; 2],
    baud_inputs: [String; 2],

    // 通讯管道
    rx: Receiver<ScopeMessage>,
    tx_cmd: Sender<GuiCommand>,
}

impl Default for ScopeApp {
    fn default() -> Self {
        let (tx, rx) = channel();
        let (tx_cmd, rx_cmd) = channel();

        // 启动后台引擎
        engine::spawn_thread(tx, rx_cmd);

        Self {
            scope: Scope::default(),
            connection_mode: ConnectionMode::Hardware,
            selected_ports: [String::new(), String::new()],
            baud_inputs: [DEFAULT_BAUD.to_string(), DEFAULT_BAUD.to_string()],
            rx,
            tx_cmd,
        }
    }
}

impl ScopeApp {
    fn trace_color(channel: Channel) -> Color32 {
        match channel {
            Channel::One => Color32::from_rgb(60, 120, 255),
            Channel::Two => Color32::from_rgb(0, 200, 200),
        }
    }

    fn request_connect(&mut self, channel: Channel) {
        let idx = channel.index();
        let baud = match parse_baud(&self.baud_inputs[idx]) {
            Ok(baud) => baud,
            Err(err) => {
                self.scope.mark_failed(channel, err.to_string());
                return;
            }
        };
        let settings = PortSettings::new(self.selected_ports[idx].clone(), baud);
        self.tx_cmd
            .send(GuiCommand::Connect {
                channel,
                mode: self.connection_mode,
                settings,
            })
            .ok();
    }

    fn export_png(&self) -> anyhow::Result<PathBuf> {
        let png = render_trace_png(&self.scope.frames(), PlotStyle::default())
            .context("rendering bit traces")?;
        let stamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let path = PathBuf::from(format!("bit_trace_{stamp}.png"));
        fs::write(&path, png).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    // 端口设置面板: 端口 / 波特率 / 状态 / 连接按钮
    fn show_port_setup(&mut self, ui: &mut egui::Ui, channel: Channel) {
        let idx = channel.index();
        let connected = self.scope.is_connected(channel);
        ui.group(|ui| {
            ui.label(RichText::new(format!("{channel} Setup")).strong());
            egui::Grid::new(("port_setup", idx))
                .num_columns(2)
                .spacing([8.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Serial COM Port");
                    let shown = if self.selected_ports[idx].is_empty() {
                        "Port Number".to_owned()
                    } else {
                        self.selected_ports[idx].clone()
                    };
                    ui.add_enabled_ui(!connected, |ui| {
                        egui::ComboBox::from_id_source(("port", idx))
                            .selected_text(shown)
                            .width(120.0)
                            .show_ui(ui, |ui| {
                                for port in self.scope.ports() {
                                    ui.selectable_value(
                                        &mut self.selected_ports[idx],
                                        port.clone(),
                                        port.as_str(),
                                    );
                                }
                            });
                    });
                    ui.end_row();

                    ui.label("Baud Rate");
                    ui.add_enabled_ui(!connected, |ui| {
                        ui.horizontal(|ui| {
                            ui.add(
                                egui::TextEdit::singleline(&mut self.baud_inputs[idx])
                                    .desired_width(70.0),
                            );
                            egui::ComboBox::from_id_source(("baud", idx))
                                .selected_text("")
                                .width(24.0)
                                .show_ui(ui, |ui| {
                                    for rate in BAUD_RATES {
                                        let label = rate.to_string();
                                        let selected = self.baud_inputs[idx] == label;
                                        if ui.selectable_label(selected, label.as_str()).clicked() {
                                            self.baud_inputs[idx] = label;
                                        }
                                    }
                                });
                        });
                    });
                    ui.end_row();

                    ui.label("Status");
                    ui.horizontal(|ui| {
                        let color = if self.scope.status(channel).is_connected() {
                            Color32::GREEN
                        } else {
                            Color32::RED
                        };
                        let (rect, _) =
                            ui.allocate_exact_size(Vec2::splat(12.0), egui::Sense::hover());
                        ui.painter().circle_filled(rect.center(), 5.0, color);
                        ui.label(self.scope.status_line(channel));
                    });
                    ui.end_row();
                });

            let btn_txt = if connected { "Disconnect Port" } else { "Connect Port" };
            if ui.button(btn_txt).clicked() {
                if connected {
                    self.tx_cmd.send(GuiCommand::Disconnect(channel)).ok();
                } else {
                    self.request_connect(channel);
                }
            }
        });
    }

    fn show_trace(&self, ui: &mut egui::Ui, channel: Channel, height: f32) {
        let frame = self.scope.frame(channel);
        let color = Self::trace_color(channel);
        let x_min = frame.x.first().copied().unwrap_or(0) as f64;
        let x_max = (frame.x.last().copied().unwrap_or(0) as f64).max(x_min + 1.0);
        ui.label(RichText::new(format!("{channel} Graph")).strong());
        Plot::new(("trace", channel.index()))
            .height(height)
            .legend(Legend::default())
            .x_axis_label("Time")
            .y_axis_label("Bit")
            .include_y(0.0)
            .include_y(1.5)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                let points = frame.points();
                plot_ui.line(
                    Line::new(PlotPoints::new(points.clone()))
                        .name("Raw Bit")
                        .color(color),
                );
                plot_ui.points(Points::new(points).radius(2.5).color(color));
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [x_min, -0.1],
                    [x_max, 1.5],
                ));
            });
    }

    fn show_terminal(&mut self, ui: &mut egui::Ui) {
        let active = self.scope.active_terminal();
        ui.horizontal(|ui| {
            for ch in Channel::ALL {
                if ui.selectable_label(active == ch, ch.label()).clicked() {
                    self.scope.set_active_terminal(ch);
                }
            }
            if ui.button("Clear").clicked() {
                self.scope.clear_terminal(active);
            }
        });
        egui::ScrollArea::vertical()
            .id_source("terminal")
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add(
                    egui::Label::new(RichText::new(self.scope.terminal(active)).monospace())
                        .wrap(true),
                );
            });
    }
}

impl eframe::App for ScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 1. 消息处理
        for _ in 0..MESSAGES_PER_FRAME {
            match self.rx.try_recv() {
                Ok(msg) => self.scope.apply(msg),
                Err(_) => break,
            }
        }
        let live = self.scope.any_connected();

        // 2. UI 绘制
        ctx.set_visuals(egui::Visuals::dark());

        egui::SidePanel::left("setup").min_width(300.0).show(ctx, |ui| {
            ui.add_space(10.0);
            ui.heading("Oscilloscope Simulator");
            ui.separator();

            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.connection_mode, ConnectionMode::Hardware, "REAL");
                ui.selectable_value(&mut self.connection_mode, ConnectionMode::Simulation, "SIM");
                if ui.button("🔄 Refresh Ports").clicked() {
                    self.tx_cmd.send(GuiCommand::RefreshPorts).ok();
                }
            });
            ui.add_space(6.0);

            for ch in Channel::ALL {
                self.show_port_setup(ui, ch);
                ui.add_space(6.0);
            }

            ui.separator();
            egui::ScrollArea::vertical()
                .id_source("log")
                .max_height(140.0)
                .show(ui, |ui| {
                    for m in self.scope.log_messages() {
                        ui.monospace(m);
                    }
                });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let plot_height = (ui.available_height() * 0.3).max(120.0);
            for ch in Channel::ALL {
                self.show_trace(ui, ch, plot_height);
            }
            ui.horizontal(|ui| {
                if ui.button("Zoom In").clicked() {
                    self.scope.zoom_in();
                }
                if ui.button("Zoom Out").clicked() {
                    self.scope.zoom_out();
                }
                if ui.button("Reset View").clicked() {
                    self.scope.reset_traces();
                }
                if ui.button("Export PNG").clicked() {
                    let msg = match self.export_png() {
                        Ok(path) => format!("Saved {}", path.display()),
                        Err(err) => {
                            log::warn!("png export failed: {err:#}");
                            format!("Export failed: {err:#}")
                        }
                    };
                    self.scope.apply(ScopeMessage::Log(msg));
                }
            });
            ui.separator();
            self.show_terminal(ui);
        });

        // 连接中持续刷新; 空闲时也定期拉取后台消息
        if live {
            ctx.request_repaint_after(Duration::from_millis(30));
        } else {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}
