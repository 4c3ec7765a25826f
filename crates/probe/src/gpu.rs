use std::thread;
use std::time::Duration;

use serde::Serialize;

use crate::ProbeError;

/// What a throwaway adapter request revealed about the GPU.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GpuReport {
    pub name: String,
    pub vendor: String,
    pub driver: String,
    pub backend: String,
    pub device_type: String,
    pub supports_compute: bool,
}

impl GpuReport {
    /// Lowercased strings the allow-list is matched against.
    fn haystacks(&self) -> [String; 3] {
        [
            self.name.to_lowercase(),
            self.vendor.to_lowercase(),
            self.driver.to_lowercase(),
        ]
    }

    pub fn matches_any(&self, tokens: &[String]) -> bool {
        let haystacks = self.haystacks();
        tokens.iter().any(|token| {
            let token = token.trim().to_lowercase();
            !token.is_empty() && haystacks.iter().any(|text| text.contains(&token))
        })
    }
}

pub trait GpuProbe {
    fn probe(&self) -> Result<GpuReport, ProbeError>;
}

/// Reports no GPU; used when probing is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledProbe;

impl GpuProbe for DisabledProbe {
    fn probe(&self) -> Result<GpuReport, ProbeError> {
        Err(ProbeError::Disabled)
    }
}

/// Asks wgpu for a high-performance adapter on a helper thread and gives up
/// after `timeout`.
#[derive(Debug, Clone, Copy)]
pub struct WgpuProbe {
    timeout: Duration,
}

impl WgpuProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl GpuProbe for WgpuProbe {
    fn probe(&self) -> Result<GpuReport, ProbeError> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        thread::Builder::new()
            .name("skyfield-gpu-probe".into())
            .spawn(move || {
                let _ = tx.send(query_adapter());
            })
            .map_err(ProbeError::Spawn)?;
        rx.recv_timeout(self.timeout)
            .map_err(|_| ProbeError::Timeout(self.timeout))?
    }
}

fn query_adapter() -> Result<GpuReport, ProbeError> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        flags: wgpu::InstanceFlags::default(),
        memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
        backend_options: wgpu::BackendOptions::default(),
    });
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .map_err(|err| ProbeError::NoAdapter(err.to_string()))?;

    let info = adapter.get_info();
    let downlevel = adapter.get_downlevel_capabilities();
    Ok(GpuReport {
        vendor: vendor_name(info.vendor).to_string(),
        driver: format!("{} {}", info.driver, info.driver_info).trim().to_string(),
        backend: format!("{:?}", info.backend),
        device_type: format!("{:?}", info.device_type),
        supports_compute: downlevel
            .flags
            .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS)
            && info.device_type != wgpu::DeviceType::Cpu,
        name: info.name,
    })
}

/// Human-readable vendor for a PCI vendor id.
pub fn vendor_name(id: u32) -> &'static str {
    match id {
        0x10de => "nvidia",
        0x1002 | 0x1022 => "amd",
        0x8086 => "intel",
        0x106b => "apple",
        0x5143 => "qualcomm adreno",
        0x13b5 => "arm mali",
        0x1010 => "imagination",
        0x14e4 => "broadcom",
        0x10005 => "mesa",
        _ => "unknown",
    }
}
