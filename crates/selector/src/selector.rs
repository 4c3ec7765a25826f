use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tierconfig::{MonitorSettings, PolicySettings, SkyfieldConfig};
use tracing::{debug, info, warn};

use crate::backend::{Backend, BackendRegistry, FrameStatus};
use crate::capability::CapabilitySnapshot;
use crate::monitor::{downgrade_target, PerformanceMonitor};
use crate::policy;
use crate::presentation::PresentationPort;
use crate::tier::{Container, Theme, Tier};

/// Picks a tier from the capability snapshot, owns the active backend and
/// steps it down when the frame rate cannot keep up.
pub struct RendererSelector<P: PresentationPort> {
    snapshot: CapabilitySnapshot,
    policy: PolicySettings,
    monitor_settings: MonitorSettings,
    registry: BackendRegistry,
    port: P,
    rng: StdRng,
    active: Option<Box<dyn Backend>>,
    tier: Tier,
    theme: Theme,
    monitor: PerformanceMonitor,
    initialized: bool,
    history: Vec<Tier>,
}

impl<P: PresentationPort> RendererSelector<P> {
    pub fn new(
        snapshot: CapabilitySnapshot,
        config: &SkyfieldConfig,
        registry: BackendRegistry,
        port: P,
        theme: Theme,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            snapshot,
            policy: config.policy.clone(),
            monitor_settings: config.monitor.clone(),
            registry,
            port,
            rng,
            active: None,
            tier: Tier::None,
            theme,
            monitor: PerformanceMonitor::new(config.monitor.window),
            initialized: false,
            history: Vec::new(),
        }
    }

    /// Runs the decision table and starts the winning backend. Only the
    /// first call has any effect.
    pub fn init(&mut self, now: Instant) -> Tier {
        if self.initialized {
            warn!(tier = %self.tier, "renderer selector already initialised");
            return self.tier;
        }
        self.initialized = true;

        for container in Container::ALL {
            self.port.hide(container);
        }

        let registry = &self.registry;
        let active = &mut self.active;
        let decision = policy::decide(&self.snapshot, &self.policy, &mut self.rng, |variant| {
            launch(registry, active, Tier::Webgpu(variant))
        });
        if let Some(variant) = decision.failed_gpu {
            debug!(%variant, "GPU backend failed to start; continuing down the table");
        }

        let tier = match decision.tier {
            Tier::Webgpu(_) => decision.tier,
            other => self.settle(other),
        };
        info!(
            %tier,
            rule = decision.rule,
            snapshot = ?self.snapshot,
            "renderer selected"
        );
        self.enter(tier, now);
        tier
    }

    /// Steps the active backend once. A backend that stopped on its own is
    /// replaced by the next tier down.
    pub fn on_frame(&mut self, now: Instant) -> FrameStatus {
        let Some(backend) = self.active.as_mut() else {
            return FrameStatus::Stopped;
        };
        let status = backend.frame(now);
        match status {
            FrameStatus::Rendered => self.monitor.record_frame(),
            FrameStatus::Paused if self.monitor.is_running() => self.monitor.restart(now),
            FrameStatus::Paused | FrameStatus::Dropped => {}
            FrameStatus::Stopped => self.replace_stopped(now),
        }
        status
    }

    /// Checks the frame-rate window and downgrades when it is too slow.
    /// Returns the new tier when a transition happened.
    pub fn poll(&mut self, now: Instant) -> Option<Tier> {
        let fps = self.monitor.sample(now)?;
        debug!(tier = %self.tier, fps, "frame rate sample");
        let target = downgrade_target(self.tier, fps, &self.monitor_settings)?;
        info!(from = %self.tier, to = %target, fps, "frame rate too low; downgrading renderer");
        let tier = self.settle(target);
        self.enter(tier, now);
        Some(tier)
    }

    pub fn on_theme_changed(&mut self, theme: Theme) {
        self.theme = theme;
        self.apply_opacity();
        if let Some(backend) = self.active.as_mut() {
            backend.theme_changed(theme);
        }
    }

    /// Records a late battery reading. Selection is not revisited.
    pub fn refine_battery(&mut self, level: Option<f32>) {
        self.snapshot = self.snapshot.with_battery_level(level);
        info!(battery = ?self.snapshot.battery_level, tier = %self.tier, "battery level refined");
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(backend) = self.active.as_mut() {
            backend.resize(width, height);
        }
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        if let Some(backend) = self.active.as_mut() {
            backend.pointer_moved(x, y);
        }
    }

    pub fn visibility_changed(&mut self, visible: bool) {
        if let Some(backend) = self.active.as_mut() {
            backend.visibility_changed(visible);
        }
    }

    pub fn shutdown(&mut self) {
        if let Some(mut backend) = self.active.take() {
            backend.destroy();
        }
        self.monitor.stop();
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn snapshot(&self) -> &CapabilitySnapshot {
        &self.snapshot
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Every tier entered so far, in order.
    pub fn history(&self) -> &[Tier] {
        &self.history
    }

    pub fn is_running(&self) -> bool {
        self.active.as_ref().is_some_and(|backend| backend.is_running())
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn opacity(&self) -> f32 {
        if self.theme == Theme::Dark && self.tier != Tier::None {
            1.0
        } else {
            0.0
        }
    }

    fn replace_stopped(&mut self, now: Instant) {
        let Some(target) = self.tier.fallback() else {
            return;
        };
        warn!(from = %self.tier, to = %target, "active renderer stopped; falling back");
        let tier = self.settle(target);
        self.enter(tier, now);
    }

    /// Starts `tier`, walking the fallback chain until something runs.
    fn settle(&mut self, mut tier: Tier) -> Tier {
        loop {
            if tier == Tier::None {
                if let Some(mut backend) = self.active.take() {
                    backend.destroy();
                }
                return tier;
            }
            if launch(&self.registry, &mut self.active, tier) {
                return tier;
            }
            match tier.fallback() {
                Some(next) => tier = next,
                None => return Tier::None,
            }
        }
    }

    fn enter(&mut self, tier: Tier, now: Instant) {
        self.tier = tier;
        self.history.push(tier);
        let shown = tier.container();
        for container in Container::ALL {
            if Some(container) == shown {
                self.port.show(container);
            } else {
                self.port.hide(container);
            }
        }
        self.apply_opacity();
        if tier.is_monitored() {
            self.monitor.restart(now);
        } else {
            self.monitor.stop();
        }
    }

    fn apply_opacity(&mut self) {
        let opacity = self.opacity();
        self.port.set_opacity(opacity);
    }
}

impl<P: PresentationPort> Drop for RendererSelector<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Tears down whatever is active, then builds and initialises `tier`.
fn launch(registry: &BackendRegistry, active: &mut Option<Box<dyn Backend>>, tier: Tier) -> bool {
    if let Some(mut previous) = active.take() {
        previous.destroy();
    }

    let mut backend = match registry.build(tier) {
        Ok(backend) => backend,
        Err(err) => {
            debug!(%tier, error = %err, "backend unavailable");
            return false;
        }
    };

    match backend.init() {
        Ok(()) => {
            *active = Some(backend);
            true
        }
        Err(err) => {
            debug!(%tier, error = %err, "backend failed to initialise");
            backend.destroy();
            false
        }
    }
}
