//! The broadcast mixer: switching the program scene of OBS Studio.

use tokio::runtime::Handle;

use crate::{Config, MixerError};

pub trait Mixer {
    /// Makes `scene` the program scene.
    fn set_active_scene(&mut self, scene: &str) -> Result<(), MixerError>;

    /// Closes the connection. Further calls may fail.
    fn disconnect(&mut self) {}
}

fn connection_error(e: obws::Error) -> MixerError {
    MixerError::Connection(Box::new(e))
}

/// OBS Studio, remote controlled over obs-websocket.
///
/// The client is async; calls block on the given runtime handle, so they must not be made from
/// inside that runtime.
pub struct ObsMixer {
    client: Option<obws::Client>,
    runtime: Handle,
    /// Scene names OBS knew about at the last refresh
    scenes: Vec<String>,
}

impl ObsMixer {
    pub fn connect(runtime: Handle, config: &Config) -> Result<Self, MixerError> {
        let settings = &config.obs;
        let client = runtime
            .block_on(obws::Client::connect(
                settings.host.as_str(),
                settings.port,
                config.obs_password(),
            ))
            .map_err(connection_error)?;

        let version = runtime
            .block_on(client.general().version())
            .map_err(connection_error)?;
        log::info!(
            "Connected to OBS {} at {}:{}",
            version.obs_version,
            settings.host,
            settings.port
        );

        let mut mixer = Self {
            client: Some(client),
            runtime,
            scenes: Vec::new(),
        };
        if let Some(current) = mixer.refresh_scenes()? {
            log::info!("Current OBS scene: {}", current);
        }
        log::debug!("OBS scenes: {:?}", mixer.scenes);
        Ok(mixer)
    }

    fn client(&self) -> Result<&obws::Client, MixerError> {
        self.client.as_ref().ok_or_else(|| {
            MixerError::Connection("not connected to OBS".into())
        })
    }

    /// Reloads the scene names. Returns the current program scene.
    fn refresh_scenes(&mut self) -> Result<Option<String>, MixerError> {
        let list = self
            .runtime
            .block_on(self.client()?.scenes().list())
            .map_err(connection_error)?;
        self.scenes = list.scenes.into_iter().map(|scene| scene.name).collect();
        Ok(list.current_program_scene_name)
    }

    fn knows_scene(&self, scene: &str) -> bool {
        self.scenes.iter().any(|s| s == scene)
    }
}

impl Mixer for ObsMixer {
    fn set_active_scene(&mut self, scene: &str) -> Result<(), MixerError> {
        // the scene may have been added in OBS since the last look
        if !self.knows_scene(scene) {
            self.refresh_scenes()?;
            if !self.knows_scene(scene) {
                return Err(MixerError::NotFound {
                    scene: scene.to_owned(),
                });
            }
        }

        self.runtime
            .block_on(self.client()?.scenes().set_current_program_scene(scene))
            .map_err(connection_error)
    }

    fn disconnect(&mut self) {
        if let Some(mut client) = self.client.take() {
            self.runtime.block_on(client.disconnect());
            log::info!("Disconnected from OBS");
        }
    }
}
