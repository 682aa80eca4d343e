use eframe::egui::{self, Align2, Color32, Context, Key, RichText, Ui, vec2};

use super::super::{PulseApp, ResultsState};

fn score_text(score: Option<f32>) -> String {
    match score {
        Some(score) => format!("risk score {score:.1}"),
        None => "risk score unknown".to_owned(),
    }
}

impl PulseApp {
    pub(in crate::app) fn handle_shortcuts(&mut self, ctx: &Context) {
        if ctx.memory(|memory| memory.focused().is_some()) {
            return;
        }

        let (previous, next, clear) = ctx.input(|input| {
            (
                input.key_pressed(Key::ArrowLeft),
                input.key_pressed(Key::ArrowRight),
                input.key_pressed(Key::Escape),
            )
        });

        if previous || next {
            self.step_carousel(next);
        }
        if clear {
            self.clear_score();
        }
    }

    pub(in crate::app) fn step_carousel(&mut self, forward: bool) {
        if let ResultsState::Ready(carousel) = &mut self.results {
            carousel.step(forward);
        }
        self.sync_risk_score();
    }

    pub(in crate::app) fn clear_score(&mut self) {
        self.fallback_score = None;
        self.field.set_risk_score(None);
    }

    pub(in crate::app) fn draw_overlay(&mut self, ctx: &Context) {
        egui::Area::new(egui::Id::new("pulse_overlay"))
            .anchor(Align2::LEFT_BOTTOM, vec2(14.0, -14.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(380.0);
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("network pulse").strong());
                        ui.separator();
                        ui.label(score_text(self.field.risk_score()));
                        if ui.small_button("Clear").clicked() {
                            self.clear_score();
                        }
                    });
                    ui.add_space(4.0);
                    self.draw_results(ui);
                    ui.add_space(4.0);
                    ui.small(self.pulse_stats_text());
                    if let Some(fps_text) = self.fps_display_text() {
                        ui.small(fps_text);
                    }
                });
            });
    }

    fn draw_results(&mut self, ui: &mut Ui) {
        let mut step = None;
        let mut retry = false;
        let mut jump_to = None;

        match &mut self.results {
            ResultsState::Idle => {
                ui.small("No analysis results loaded (pass --results <FILE>).");
            }
            ResultsState::Loading { .. } => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading analysis results...");
                });
            }
            ResultsState::Error(error) => {
                ui.colored_label(Color32::from_rgb(239, 120, 110), error.as_str());
                retry = ui.button("Retry").clicked();
            }
            ResultsState::Ready(carousel) => {
                ui.horizontal(|ui| {
                    if ui.button("<").clicked() {
                        step = Some(false);
                    }
                    match carousel.set.get(carousel.index) {
                        Some(result) => {
                            ui.label(format!(
                                "{}  ({}/{})",
                                result.label(),
                                carousel.index + 1,
                                carousel.set.len()
                            ));
                        }
                        None => {
                            ui.label("No successful tickers.");
                        }
                    }
                    if ui.button(">").clicked() {
                        step = Some(true);
                    }
                });
                if let Some(result) = carousel.set.get(carousel.index) {
                    ui.small(result.metrics_summary());
                }

                if carousel.set.is_empty() {
                    ui.small("Every ticker in this file failed analysis.");
                }

                let response = ui.add(
                    egui::TextEdit::singleline(&mut carousel.search)
                        .hint_text("Jump to ticker or company")
                        .desired_width(240.0),
                );
                if response.changed() {
                    jump_to = carousel.set.best_match(&carousel.search);
                }

                for error in &carousel.set.errors {
                    ui.small(format!("{}: {}", error.ticker, error.error));
                }
            }
        }

        if let Some(index) = jump_to
            && let ResultsState::Ready(carousel) = &mut self.results
        {
            carousel.index = index;
            self.sync_risk_score();
        }
        if let Some(forward) = step {
            self.step_carousel(forward);
        }
        if retry {
            self.reload_results();
        }
    }
}
