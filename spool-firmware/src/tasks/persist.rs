//! Parameter persistence task
//!
//! Owns the flash storage after boot and writes the winding parameters
//! whenever the control loop finishes a settings sequence.

use defmt::*;

use spool_hal_rp2040::Rp2040FlashStorage;

use crate::channels::PARAMETERS_SAVE;
use crate::config::save_parameters;

/// Persistence task
#[embassy_executor::task]
pub async fn persist_task(mut storage: Rp2040FlashStorage<'static>) {
    info!("Persist task started");

    loop {
        let params = PARAMETERS_SAVE.wait().await;

        if let Err(e) = save_parameters(&mut storage, params).await {
            error!("Failed to save winding parameters: {:?}", e);
        }
    }
}
