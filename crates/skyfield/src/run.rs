use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use probe::BatteryPoll;
use renderer::{physical_size, register_backends, HostSurface};
use selector::{particle_budget, BackendRegistry, OpacityHandle, RendererSelector, Theme};
use tierconfig::ThemePreference;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::cli::RunArgs;
use crate::detect::detect;
use crate::presenter::WindowPresenter;
use crate::settings::Settings;

/// How often a late battery reading is checked for while idle.
const BATTERY_POLL_INTERVAL: Duration = Duration::from_millis(250);

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn resolve_theme(preference: ThemePreference, window: &Window) -> Theme {
    match preference {
        ThemePreference::Dark => Theme::Dark,
        ThemePreference::Light => Theme::Light,
        ThemePreference::System => window.theme().map(map_theme).unwrap_or_default(),
    }
}

fn map_theme(theme: winit::window::Theme) -> Theme {
    match theme {
        winit::window::Theme::Light => Theme::Light,
        winit::window::Theme::Dark => Theme::Dark,
    }
}

pub fn run(args: RunArgs) -> Result<()> {
    let settings = Settings::resolve(&args)?;
    let config = settings.config.clone();

    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let (width, height) = settings.size;
    let window = WindowBuilder::new()
        .with_title("skyfield")
        .with_inner_size(LogicalSize::new(width, height))
        .with_transparent(true)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create backdrop window: {err}"))?;
    let window = Arc::new(window);

    let mut logical = window
        .inner_size()
        .to_logical::<f64>(window.scale_factor());
    let detection = detect(&settings, logical.width.round() as u32);
    let mut pending_battery = detection.pending_battery;
    if let Some(gpu) = &detection.gpu {
        info!(
            adapter = %gpu.name,
            vendor = %gpu.vendor,
            backend = %gpu.backend,
            compute = gpu.supports_compute,
            "GPU probe"
        );
    }

    let particle_count =
        particle_budget(&detection.snapshot, logical.width.round() as u32, &config.particles);
    let opacity = OpacityHandle::default();
    let host = HostSurface {
        window: window.clone(),
        opacity: opacity.clone(),
        particle_count,
        canvas: config.canvas.clone(),
    };
    let mut registry = BackendRegistry::new();
    register_backends(&mut registry, &host);
    debug!(?registry, particle_count, "backends registered");

    let follow_system_theme = config.theme == ThemePreference::System;
    let theme = resolve_theme(config.theme, &window);
    let presenter = WindowPresenter::new(window.clone(), opacity);
    let mut selector = RendererSelector::new(detection.snapshot, &config, registry, presenter, theme);
    selector.init(Instant::now());

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                selector.shutdown();
                elwt.exit();
            }
            WindowEvent::Resized(size) => {
                logical = size.to_logical(window.scale_factor());
                selector.resize(size.width, size.height);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let size = physical_size(logical, scale_factor);
                selector.resize(size.width, size.height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                selector.pointer_moved(position.x, position.y);
            }
            WindowEvent::Touch(touch) => {
                selector.pointer_moved(touch.location.x, touch.location.y);
            }
            WindowEvent::ThemeChanged(theme) if follow_system_theme => {
                selector.on_theme_changed(map_theme(theme));
            }
            WindowEvent::Occluded(occluded) => {
                selector.visibility_changed(!occluded);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                selector.on_frame(now);
                selector.poll(now);
            }
            _ => {}
        },
        Event::AboutToWait => {
            if let Some(query) = &pending_battery {
                match query.poll() {
                    BatteryPoll::Ready(level) => {
                        selector.refine_battery(Some(level));
                        pending_battery = None;
                    }
                    BatteryPoll::Gone => pending_battery = None,
                    BatteryPoll::Pending => {}
                }
            }

            if selector.is_running() {
                window.request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if pending_battery.is_some() {
                elwt.set_control_flow(ControlFlow::WaitUntil(
                    Instant::now() + BATTERY_POLL_INTERVAL,
                ));
            } else {
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("backdrop event loop error: {err}"))
}
