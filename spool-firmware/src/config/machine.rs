//! Machine configuration
//!
//! The build selects a preset. A postcard-encoded override stored in
//! flash replaces it, provided it passes validation.

use defmt::*;

use spool_core::config::MachineConfig;
use spool_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey};
use spool_hal_rp2040::FlashStorageTrait;

/// Maximum serialized machine configuration size
const MAX_CONFIG_SIZE: usize = 128;

/// Preset this firmware was built for
pub fn preset() -> MachineConfig {
    if cfg!(feature = "compact") {
        MachineConfig::compact()
    } else {
        MachineConfig::bench()
    }
}

/// Load the machine configuration
///
/// Returns the flash override when present and valid, the preset otherwise.
pub async fn load_machine_config(storage: &mut Rp2040FlashStorage<'_>) -> MachineConfig {
    let mut buffer = [0u8; MAX_CONFIG_SIZE];

    let len = match storage.read(StorageKey::MachineConfig, &mut buffer).await {
        Ok(len) => len,
        Err(FlashError::NotFound) => {
            debug!("No machine configuration override in flash");
            return checked_preset();
        }
        Err(e) => {
            warn!("Failed to read machine configuration: {:?}", e);
            return checked_preset();
        }
    };

    let Some(bytes) = buffer.get(..len) else {
        return checked_preset();
    };
    let config: MachineConfig = match postcard::from_bytes(bytes) {
        Ok(config) => config,
        Err(_) => {
            warn!("Stored machine configuration does not decode, using preset");
            return checked_preset();
        }
    };

    match config.validate() {
        Ok(()) => {
            info!("Loaded machine configuration override from flash");
            log_config_summary(&config);
            config
        }
        Err(e) => {
            warn!("Stored machine configuration rejected: {:?}, using preset", e);
            checked_preset()
        }
    }
}

fn checked_preset() -> MachineConfig {
    let config = preset();
    if let Err(e) = config.validate() {
        // Presets are covered by tests; reaching this is a build mistake
        error!("Built-in preset invalid: {:?}", e);
    }
    log_config_summary(&config);
    config
}

fn log_config_summary(config: &MachineConfig) {
    info!(
        "Machine: {} steps/mm, max {} steps/s, calibration {} steps/s",
        config.steps_per_mm(),
        config.max_axis_speed,
        config.calibration_speed
    );
    debug!(
        "  debounce={} ms, settle={} ms, limit active low={}",
        config.debounce_ms, config.settle_ms, config.limit_active_low
    );
}
