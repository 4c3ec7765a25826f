use std::time::{Duration, Instant};

use tierconfig::MonitorSettings;

use crate::tier::Tier;

/// Frame counter sampled over a fixed window.
#[derive(Debug, Clone)]
pub struct PerformanceMonitor {
    window: Duration,
    window_start: Option<Instant>,
    frames: u32,
}

impl PerformanceMonitor {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            window_start: None,
            frames: 0,
        }
    }

    pub fn restart(&mut self, now: Instant) {
        self.window_start = Some(now);
        self.frames = 0;
    }

    pub fn stop(&mut self) {
        self.window_start = None;
        self.frames = 0;
    }

    pub fn is_running(&self) -> bool {
        self.window_start.is_some()
    }

    pub fn record_frame(&mut self) {
        if self.window_start.is_some() {
            self.frames = self.frames.saturating_add(1);
        }
    }

    /// Frames per second over the window once it has fully elapsed.
    pub fn sample(&mut self, now: Instant) -> Option<f32> {
        let start = self.window_start?;
        let elapsed = now.saturating_duration_since(start);
        if elapsed < self.window {
            return None;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.restart(now);
        Some(fps)
    }
}

/// One-step downgrade for a measured frame rate. No path leads upwards.
pub fn downgrade_target(tier: Tier, fps: f32, settings: &MonitorSettings) -> Option<Tier> {
    match tier {
        Tier::Webgpu(_) if fps < settings.gpu_min_fps => Some(Tier::Webgl),
        Tier::Webgl if fps < settings.canvas_min_fps => Some(Tier::Css),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::GpuVariant;

    #[test]
    fn samples_only_after_full_window() {
        let start = Instant::now();
        let mut monitor = PerformanceMonitor::new(Duration::from_secs(5));
        monitor.restart(start);
        for _ in 0..100 {
            monitor.record_frame();
        }
        assert_eq!(monitor.sample(start + Duration::from_secs(4)), None);
        let fps = monitor.sample(start + Duration::from_secs(5)).unwrap();
        assert!((fps - 20.0).abs() < 1e-3);
        // Window restarts with an empty count.
        assert_eq!(monitor.sample(start + Duration::from_secs(6)), None);
    }

    #[test]
    fn stopped_monitor_never_samples() {
        let start = Instant::now();
        let mut monitor = PerformanceMonitor::new(Duration::from_secs(5));
        monitor.record_frame();
        assert!(!monitor.is_running());
        assert_eq!(monitor.sample(start + Duration::from_secs(60)), None);
    }

    #[test]
    fn downgrade_thresholds() {
        let settings = MonitorSettings::default();
        let gpu = Tier::Webgpu(GpuVariant::Starfield);
        assert_eq!(downgrade_target(gpu, 29.9, &settings), Some(Tier::Webgl));
        assert_eq!(downgrade_target(gpu, 30.0, &settings), None);
        assert_eq!(downgrade_target(Tier::Webgl, 19.0, &settings), Some(Tier::Css));
        assert_eq!(downgrade_target(Tier::Webgl, 25.0, &settings), None);
        assert_eq!(downgrade_target(Tier::Css, 1.0, &settings), None);
        assert_eq!(downgrade_target(Tier::None, 0.0, &settings), None);
    }
}
