use eframe::egui::Context;

use super::super::PulseApp;

const FPS_SAMPLE_WINDOW: usize = 180;

impl PulseApp {
    pub(in crate::app) fn update_fps_counter(&mut self, ctx: &Context) {
        let dt = ctx.input(|input| input.stable_dt);
        self.record_frame_time(dt);
    }

    fn record_frame_time(&mut self, dt: f32) {
        if dt <= f32::EPSILON {
            return;
        }

        self.fps_current = (1.0 / dt).clamp(0.0, 1000.0);
        self.fps_samples.push_back(self.fps_current);
        while self.fps_samples.len() > FPS_SAMPLE_WINDOW {
            self.fps_samples.pop_front();
        }
    }

    pub(in crate::app) fn fps_display_text(&self) -> Option<String> {
        if self.fps_samples.is_empty() {
            return None;
        }

        let avg = self.fps_samples.iter().sum::<f32>() / self.fps_samples.len() as f32;
        let mut parts = vec![format!("FPS {:.0}", self.fps_current), format!("avg {avg:.1}")];
        if let Some(low) = self.fps_samples.iter().copied().reduce(f32::min) {
            parts.push(format!("low {low:.0}"));
        }
        if self.fps_current > f32::EPSILON {
            parts.push(format!("{:.1} ms", 1000.0 / self.fps_current));
        }

        Some(parts.join(" | "))
    }

    pub(in crate::app) fn pulse_stats_text(&self) -> String {
        let stats = self.field.stats();
        let backing = self.field.backing_size();
        format!(
            "pulse: {} nodes / {} edges  |  t {:.0}s  |  {:.0}x{:.0} px @{:.2}x",
            stats.nodes,
            stats.connections,
            stats.time_secs,
            backing.x,
            backing.y,
            self.field.pixels_per_point()
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::app::PulseApp;

    #[test]
    fn fps_window_is_bounded_and_reported() {
        let mut app = PulseApp::headless_for_test();
        assert_eq!(app.fps_display_text(), None);

        for _ in 0..(super::FPS_SAMPLE_WINDOW + 40) {
            app.record_frame_time(1.0 / 60.0);
        }
        app.record_frame_time(0.0);

        assert_eq!(app.fps_samples.len(), super::FPS_SAMPLE_WINDOW);
        let text = app.fps_display_text().unwrap();
        assert!(text.starts_with("FPS 60"));
        assert!(text.contains("16.7 ms"));
    }
}
