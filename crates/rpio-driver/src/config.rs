//! Driver configuration
//!
//! Every path the driver touches lives here. Hardware constants (block
//! offsets, window size, register indices) are not configurable; they come
//! from `rpio-chip`.
//!
//! Each path can be overridden from the environment, which takes priority
//! over the standard location:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `RPIO_CPUINFO` | `/proc/cpuinfo` |
//! | `RPIO_MEM_DEVICE` | `/dev/mem` |
//! | `RPIO_GPIOMEM_DEVICE` | `/dev/gpiomem` |
//! | `RPIO_SYSFS_GPIO` | `/sys/class/gpio` |

use std::path::{Path, PathBuf};

/// Default board information source
pub const DEFAULT_CPUINFO: &str = "/proc/cpuinfo";
/// Default privileged full-memory device
pub const DEFAULT_MEM_DEVICE: &str = "/dev/mem";
/// Default unprivileged GPIO-only memory device
pub const DEFAULT_GPIOMEM_DEVICE: &str = "/dev/gpiomem";
/// Default sysfs GPIO class directory
pub const DEFAULT_SYSFS_GPIO: &str = "/sys/class/gpio";

/// Paths used by the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    cpuinfo: PathBuf,
    mem_device: PathBuf,
    gpiomem_device: PathBuf,
    sysfs_gpio: PathBuf,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            cpuinfo: PathBuf::from(DEFAULT_CPUINFO),
            mem_device: PathBuf::from(DEFAULT_MEM_DEVICE),
            gpiomem_device: PathBuf::from(DEFAULT_GPIOMEM_DEVICE),
            sysfs_gpio: PathBuf::from(DEFAULT_SYSFS_GPIO),
        }
    }
}

impl DriverConfig {
    /// Default paths, overridden by any `RPIO_*` environment variable that is set
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key).map(PathBuf::from))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<PathBuf>) -> Self {
        let defaults = Self::default();
        let pick = |key: &str, default: PathBuf| {
            lookup(key).map_or(default, |path| {
                tracing::debug!("{key} overrides default: {}", path.display());
                path
            })
        };

        Self {
            cpuinfo: pick("RPIO_CPUINFO", defaults.cpuinfo),
            mem_device: pick("RPIO_MEM_DEVICE", defaults.mem_device),
            gpiomem_device: pick("RPIO_GPIOMEM_DEVICE", defaults.gpiomem_device),
            sysfs_gpio: pick("RPIO_SYSFS_GPIO", defaults.sysfs_gpio),
        }
    }

    /// Use a different board information source
    #[must_use]
    pub fn with_cpuinfo(mut self, path: impl Into<PathBuf>) -> Self {
        self.cpuinfo = path.into();
        self
    }

    /// Use a different privileged memory device
    #[must_use]
    pub fn with_mem_device(mut self, path: impl Into<PathBuf>) -> Self {
        self.mem_device = path.into();
        self
    }

    /// Use a different fallback memory device
    #[must_use]
    pub fn with_gpiomem_device(mut self, path: impl Into<PathBuf>) -> Self {
        self.gpiomem_device = path.into();
        self
    }

    /// Use a different sysfs GPIO directory
    #[must_use]
    pub fn with_sysfs_gpio(mut self, path: impl Into<PathBuf>) -> Self {
        self.sysfs_gpio = path.into();
        self
    }

    /// Board information source
    #[must_use]
    pub fn cpuinfo(&self) -> &Path {
        &self.cpuinfo
    }

    /// Privileged full-memory device
    #[must_use]
    pub fn mem_device(&self) -> &Path {
        &self.mem_device
    }

    /// Fallback memory device
    #[must_use]
    pub fn gpiomem_device(&self) -> &Path {
        &self.gpiomem_device
    }

    /// Sysfs GPIO directory
    #[must_use]
    pub fn sysfs_gpio(&self) -> &Path {
        &self.sysfs_gpio
    }
}
