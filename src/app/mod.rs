use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use tracing::{info, warn};

use crate::analysis::{AnalysisSet, load_analysis_set};
use crate::pulse::PulseField;

mod render_utils;
mod ui;

use render_utils::PainterSurface;

pub struct PulseApp {
    field: PulseField,
    results_path: Option<PathBuf>,
    results: ResultsState,
    fallback_score: Option<f32>,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

enum ResultsState {
    Idle,
    Loading {
        rx: Receiver<Result<AnalysisSet, String>>,
    },
    Ready(Box<Carousel>),
    Error(String),
}

struct Carousel {
    set: AnalysisSet,
    index: usize,
    search: String,
}

impl Carousel {
    fn new(set: AnalysisSet) -> Self {
        Self {
            set,
            index: 0,
            search: String::new(),
        }
    }

    fn current_score(&self) -> Option<f32> {
        self.set.get(self.index).and_then(|result| result.risk_score())
    }

    fn step(&mut self, forward: bool) {
        let len = self.set.len();
        if len == 0 {
            return;
        }
        self.index = if forward {
            (self.index + 1) % len
        } else {
            (self.index + len - 1) % len
        };
    }
}

impl PulseApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        field: PulseField,
        results_path: Option<PathBuf>,
        initial_score: Option<f32>,
    ) -> Self {
        Self::from_parts(field, results_path, initial_score)
    }

    fn from_parts(
        mut field: PulseField,
        results_path: Option<PathBuf>,
        initial_score: Option<f32>,
    ) -> Self {
        field.set_risk_score(initial_score);
        let results = match &results_path {
            Some(path) => Self::start_load(path.clone()),
            None => ResultsState::Idle,
        };

        Self {
            field,
            results_path,
            results,
            fallback_score: initial_score,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        }
    }

    fn spawn_load(path: PathBuf) -> Receiver<Result<AnalysisSet, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_analysis_set(&path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(path: PathBuf) -> ResultsState {
        info!(path = %path.display(), "loading analysis results");
        ResultsState::Loading {
            rx: Self::spawn_load(path),
        }
    }

    fn poll_results(&mut self) {
        let ResultsState::Loading { rx } = &self.results else {
            return;
        };

        let transition = match rx.try_recv() {
            Ok(Ok(set)) => {
                info!(
                    results = set.len(),
                    errors = set.errors.len(),
                    "analysis results loaded"
                );
                ResultsState::Ready(Box::new(Carousel::new(set)))
            }
            Ok(Err(error)) => {
                warn!(%error, "failed to load analysis results");
                ResultsState::Error(error)
            }
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                warn!("analysis results worker disconnected");
                ResultsState::Error("Background load worker disconnected".to_owned())
            }
        };

        self.results = transition;
        self.sync_risk_score();
    }

    fn sync_risk_score(&mut self) {
        let score = match &self.results {
            ResultsState::Ready(carousel) => carousel.current_score(),
            _ => self.fallback_score,
        };
        self.field.set_risk_score(score);
    }

    fn reload_results(&mut self) {
        if let Some(path) = self.results_path.clone() {
            self.results = Self::start_load(path);
        }
    }

    fn draw_pulse(&mut self, ctx: &Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let pixels_per_point = ctx.pixels_per_point();
                self.field.resize(rect.size(), pixels_per_point);

                let dt = ctx
                    .input(|input| input.stable_dt)
                    .clamp(1.0 / 240.0, 1.0 / 20.0);
                self.field.advance(dt);

                let painter = ui.painter_at(rect);
                let mut surface = PainterSurface::new(&painter, rect, pixels_per_point);
                self.field.paint(&mut surface);
            });
    }
}

impl eframe::App for PulseApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.update_fps_counter(ctx);
        self.poll_results();
        self.handle_shortcuts(ctx);

        self.draw_pulse(ctx);
        self.draw_overlay(ctx);

        ctx.request_repaint();
    }
}

#[cfg(test)]
impl PulseApp {
    pub(in crate::app) fn headless_for_test() -> Self {
        use crate::pulse::PulseConfig;

        Self::from_parts(PulseField::new(PulseConfig::default(), false, Some(5)), None, None)
    }
}
