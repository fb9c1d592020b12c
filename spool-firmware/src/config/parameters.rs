//! Winding parameter persistence
//!
//! Loads and saves the operator's winding parameters. A blank or damaged
//! record is replaced by the defaults, which are written back right away
//! so the next boot finds a valid record.

use defmt::*;

use spool_core::config::{
    ParameterError, ParameterRecord, WindingParameters, MAX_PARAMETER_RECORD_SIZE,
};
use spool_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey};
use spool_hal_rp2040::FlashStorageTrait;

/// Parameter persistence errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Flash operation failed
    Flash(FlashError),
    /// Record encoding or validation failed
    Record(ParameterError),
}

impl From<FlashError> for PersistError {
    fn from(e: FlashError) -> Self {
        PersistError::Flash(e)
    }
}

impl From<ParameterError> for PersistError {
    fn from(e: ParameterError) -> Self {
        PersistError::Record(e)
    }
}

/// Load the winding parameters, falling back to defaults
pub async fn load_parameters(storage: &mut Rp2040FlashStorage<'_>) -> WindingParameters {
    match read_parameters(storage).await {
        Ok(params) => {
            info!("Loaded winding parameters from flash");
            log_parameters(&params);
            return params;
        }
        Err(PersistError::Flash(FlashError::NotFound)) => {
            info!("No winding parameters in flash, writing defaults");
        }
        Err(e) => {
            warn!("Stored winding parameters unusable: {:?}, writing defaults", e);
        }
    }

    let params = WindingParameters::default();
    if let Err(e) = write_parameters(storage, params).await {
        error!("Failed to write default parameters: {:?}", e);
    }
    params
}

/// Save the winding parameters unless flash already holds them
pub async fn save_parameters(
    storage: &mut Rp2040FlashStorage<'_>,
    params: WindingParameters,
) -> Result<(), PersistError> {
    if let Ok(stored) = read_parameters(storage).await {
        if stored == params {
            debug!("Winding parameters unchanged, skipping flash write");
            return Ok(());
        }
    }

    write_parameters(storage, params).await?;
    info!("Saved winding parameters to flash");
    log_parameters(&params);
    Ok(())
}

async fn read_parameters(
    storage: &mut Rp2040FlashStorage<'_>,
) -> Result<WindingParameters, PersistError> {
    let mut buffer = [0u8; MAX_PARAMETER_RECORD_SIZE];
    let len = storage
        .read(StorageKey::WindingParameters, &mut buffer)
        .await?;

    let bytes = buffer.get(..len).ok_or(FlashError::BufferTooSmall)?;
    Ok(ParameterRecord::decode(bytes)?)
}

async fn write_parameters(
    storage: &mut Rp2040FlashStorage<'_>,
    params: WindingParameters,
) -> Result<(), PersistError> {
    let mut buffer = [0u8; MAX_PARAMETER_RECORD_SIZE];
    let bytes = ParameterRecord::new(params).encode(&mut buffer)?;

    debug!("Writing {} byte parameter record", bytes.len());
    storage
        .write(StorageKey::WindingParameters, bytes)
        .await
        .map_err(PersistError::Flash)
}

fn log_parameters(params: &WindingParameters) {
    debug!(
        "  turns={}, start margin={} mm, end margin={} mm",
        params.required_turns, params.start_margin_mm, params.end_margin_mm
    );
}
