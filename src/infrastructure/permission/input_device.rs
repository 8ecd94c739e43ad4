//! Microphone permission backed by input device availability
//!
//! Desktop audio servers gate access per device rather than through a
//! prompt, so access counts as granted when a default input device can be
//! opened for configuration.

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait};
use tracing::{debug, warn};

use crate::application::ports::{MicrophonePermission, Permission};

/// Permission check against the default cpal input device
pub struct InputDevicePermission;

impl InputDevicePermission {
    pub fn new() -> Self {
        Self
    }

    fn probe() -> Permission {
        let host = cpal::default_host();
        let Some(device) = host.default_input_device() else {
            warn!("No default input device");
            return Permission::Denied;
        };

        match device.default_input_config() {
            Ok(config) => {
                debug!(
                    device = %device.name().unwrap_or_default(),
                    sample_rate = config.sample_rate().0,
                    channels = config.channels(),
                    "Microphone available"
                );
                Permission::Granted
            }
            Err(e) => {
                warn!(error = %e, "Input device refused configuration");
                Permission::Denied
            }
        }
    }
}

impl Default for InputDevicePermission {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MicrophonePermission for InputDevicePermission {
    async fn request_microphone_access(&self) -> Permission {
        tokio::task::spawn_blocking(Self::probe)
            .await
            .unwrap_or(Permission::Denied)
    }
}
