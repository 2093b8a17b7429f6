#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(clippy::use_self, rust_2018_idioms)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

use std::sync::mpsc::Sender;

use chrono::{NaiveTime, Timelike};
use eframe::egui::{
    self, Align, Align2, Button, CentralPanel, Color32, Context, DragValue, Grid, Layout,
    RichText, ScrollArea, Slider, TopBottomPanel, ViewportCommand, Window,
};

pub mod communication;
pub mod config;
pub mod history;
pub mod notify;
pub mod scheduler;
pub mod sound;

use communication::Message;
use config::{Config, Theme};
use history::AlarmHistory;
use scheduler::{AlarmScheduler, Phase, RandomIntervals};
use sound::SoundKind;

/// the gui shell around the scheduler: status, settings, history and the
/// ringing overlay. all scheduling happens here on the gui thread, sound
/// playback goes through the channel to the audio thread.
pub struct PeskyClock {
    config: Config,
    scheduler: AlarmScheduler,
    intervals: RandomIntervals,
    history: AlarmHistory,
    sender: Sender<Message>,
    in_config: bool,
    ringing: bool,
    confirm_quit: bool,
    allowed_to_quit: bool,
}

impl PeskyClock {
    #[must_use]
    pub fn new(sender: Sender<Message>) -> Self {
        let config = Config::config_path().map_or_else(
            || {
                log::warn!("no config directory on this system, running on defaults");
                Config::default()
            },
            |path| Config::load(&path),
        );
        Self {
            config,
            scheduler: AlarmScheduler::new(),
            intervals: RandomIntervals::new(),
            history: AlarmHistory::new(),
            sender,
            in_config: false,
            ringing: false,
            confirm_quit: false,
            allowed_to_quit: false,
        }
    }

    // write changes to disk
    fn save(&self) {
        if let Some(path) = Config::config_path() {
            self.config.save(&path);
        }
    }

    fn send(&self, message: Message) {
        // a dead audio thread just means silence
        if self.sender.send(message).is_err() {
            log::error!("audio thread is gone");
        }
    }

    /// poll the pending timer; when the alarm rings, kick off sound,
    /// notification and history in one go
    fn drive_alarm(&mut self) {
        let now = chrono::Local::now().naive_local();
        if let Some(record) = self.scheduler.tick(now, &self.config, &mut self.intervals) {
            self.send(Message::Play {
                kind: record.sound,
                volume: self.config.volume,
                duration_seconds: self.config.duration_seconds,
            });
            notify::alarm_fired();
            self.history.push(record);
            self.ringing = true;
        }
    }

    fn start_clock(&mut self) {
        let now = chrono::Local::now().naive_local();
        self.scheduler
            .start(now, &self.config, &mut self.intervals);
    }

    fn dismiss_alarm(&mut self) {
        self.ringing = false;
        self.send(Message::Stop);
        self.scheduler.dismiss();
    }

    fn render_header(&mut self, ctx: &Context) {
        TopBottomPanel::top("time_and_ctrl").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let theme_btn = ui.add(Button::new({
                    if self.config.theme == Theme::Dark {
                        "🌞"
                    } else {
                        "🌙"
                    }
                }));
                if theme_btn.clicked() {
                    self.config.theme = !self.config.theme;
                    self.save();
                }
                ui.centered_and_justified(|ui| {
                    ui.label(format!(
                        "Time: {}",
                        chrono::Local::now().naive_local().format("%H:%M:%S")
                    ));
                });
                ui.with_layout(Layout::right_to_left(Align::Min), |ui| {
                    if ui.button("⚙").on_hover_text("settings").clicked() {
                        self.in_config = true;
                    }
                });
            });
        });
    }

    fn render_status(&mut self, ui: &mut egui::Ui) {
        let active = self.scheduler.is_active();
        ui.horizontal(|ui| {
            let (color, text) = if active {
                (Color32::from_rgb(0, 200, 120), "Active")
            } else {
                (Color32::GRAY, "Inactive")
            };
            ui.label(RichText::new("●").color(color));
            ui.label(text);
        });
        match (self.scheduler.phase(), self.scheduler.next_fire_at()) {
            (Phase::ArmedWaitingForWindow, Some(at)) => {
                ui.label(format!("window opens at {}", at.format("%a %H:%M")));
            }
            (_, Some(at)) => {
                ui.label(format!("next alarm at {}", at.format("%a %H:%M:%S")));
            }
            (_, None) => {
                ui.label("next alarm: not scheduled");
            }
        }
        ui.horizontal(|ui| {
            if ui.add_enabled(!active, Button::new("start")).clicked() {
                self.start_clock();
            }
            if ui.add_enabled(active, Button::new("stop")).clicked() {
                self.scheduler.stop();
            }
            if ui.button("test sound").clicked() {
                self.send(Message::Play {
                    kind: self.config.sound,
                    volume: self.config.volume,
                    duration_seconds: self.config.duration_seconds,
                });
            }
        });
    }

    fn render_settings(&mut self, ctx: &Context) {
        let mut changed = false;
        Window::new("settings ⚙").show(ctx, |ui| {
            if ui.button("x").clicked() {
                self.in_config = false;
            }
            Grid::new("settings_grid").num_columns(2).show(ui, |ui| {
                ui.label("active from");
                changed |= time_field(ui, &mut self.config.window_start);
                ui.end_row();

                ui.label("until");
                changed |= time_field(ui, &mut self.config.window_end);
                ui.end_row();

                ui.label("min interval");
                changed |= ui
                    .add(
                        Slider::new(&mut self.config.min_interval_minutes, 1..=720)
                            .suffix(" min"),
                    )
                    .changed();
                ui.end_row();

                ui.label("max interval");
                changed |= ui
                    .add(
                        Slider::new(&mut self.config.max_interval_minutes, 1..=720)
                            .suffix(" min"),
                    )
                    .changed();
                ui.end_row();

                ui.label("sound");
                ui.vertical(|ui| {
                    for kind in SoundKind::ALL {
                        changed |= ui
                            .selectable_value(&mut self.config.sound, kind, kind.label())
                            .changed();
                    }
                });
                ui.end_row();

                ui.label("volume");
                changed |= ui
                    .add(Slider::new(&mut self.config.volume, 0..=100).suffix("%"))
                    .changed();
                ui.end_row();

                ui.label("duration");
                changed |= ui
                    .add(Slider::new(&mut self.config.duration_seconds, 1..=120).suffix(" s"))
                    .changed();
                ui.end_row();
            });
        });
        if changed {
            // the scheduler never sees min > max
            self.config = self.config.clone().sanitized();
            self.save();
        }
    }

    fn render_history(&self, ui: &mut egui::Ui) {
        ui.label("recent alarms");
        if self.history.is_empty() {
            ui.label(RichText::new("no alarms have gone off yet").weak());
            return;
        }
        ScrollArea::vertical().show(ui, |ui| {
            Grid::new("alarm_history").show(ui, |ui| {
                for record in self.history.iter() {
                    ui.label(record.fired_at.format("%a %H:%M:%S").to_string());
                    ui.label(record.sound.label());
                    ui.end_row();
                }
            });
        });
    }

    fn render_ringing(&mut self, ctx: &Context) {
        Window::new("⏰ alarm!")
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("the pesky clock is going off");
                if ui.button("dismiss").clicked() {
                    self.dismiss_alarm();
                }
            });
    }

    fn render_quit_confirm(&mut self, ctx: &Context) {
        Window::new("really quit?")
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("the reverse alarm is still armed");
                ui.horizontal(|ui| {
                    if ui.button("quit anyway").clicked() {
                        self.allowed_to_quit = true;
                        ctx.send_viewport_cmd(ViewportCommand::Close);
                    }
                    if ui.button("keep running").clicked() {
                        self.confirm_quit = false;
                    }
                });
            });
    }
}

/// hour:minute editor for a window bound
fn time_field(ui: &mut egui::Ui, time: &mut NaiveTime) -> bool {
    let mut hour = time.hour();
    let mut minute = time.minute();
    let mut changed = false;
    ui.horizontal(|ui| {
        changed |= ui.add(DragValue::new(&mut hour).range(0..=23)).changed();
        ui.label(":");
        changed |= ui.add(DragValue::new(&mut minute).range(0..=59)).changed();
    });
    if changed {
        *time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(*time);
    }
    changed
}

impl eframe::App for PeskyClock {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        // keep frames coming even without input so the pending timer is
        // checked on time
        ctx.request_repaint_after(std::time::Duration::from_millis(200));
        self.drive_alarm();

        ctx.set_visuals(self.config.theme.into());

        // leaving with the alarm armed gets a second thought, like the
        // original tab-close warning
        if ctx.input(|i| i.viewport().close_requested())
            && self.scheduler.is_active()
            && !self.allowed_to_quit
        {
            ctx.send_viewport_cmd(ViewportCommand::CancelClose);
            self.confirm_quit = true;
        }

        if self.in_config {
            self.render_settings(ctx);
        }
        self.render_header(ctx);
        CentralPanel::default().show(ctx, |ui| {
            self.render_status(ui);
            ui.separator();
            self.render_history(ui);
        });
        if self.ringing {
            self.render_ringing(ctx);
        }
        if self.confirm_quit {
            self.render_quit_confirm(ctx);
        }
    }
}
