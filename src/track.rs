use crate::error::{EngineError, FetchError, LoadError};
use crate::event::SingleInstanceEvent;
use crate::fetch::{AssetLoader, Fetch};
use crate::model::TrackDescriptor;
use crate::studio::{BankId, StudioEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadProgress {
    Pending,
    Ready,
}

pub struct Track {
    descriptor: TrackDescriptor,
    label: String,
    fetch: Fetch,
    state: LoadState,
    bank: Option<BankId>,
    event: Option<SingleInstanceEvent>,
}

impl Track {
    pub fn new(descriptor: TrackDescriptor) -> Self {
        let label = descriptor.event_path();
        Self::labelled(descriptor, label)
    }

    // Bank and event are labelled per queue position, so a manifest may list
    // the same asset or event more than once.
    pub fn in_slot(descriptor: TrackDescriptor, slot: usize) -> Self {
        let label = format!("{}#{slot}", descriptor.event_path());
        Self::labelled(descriptor, label)
    }

    fn labelled(descriptor: TrackDescriptor, label: String) -> Self {
        Self {
            descriptor,
            label,
            fetch: Fetch::Idle,
            state: LoadState::Unloaded,
            bank: None,
            event: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.descriptor.path
    }

    pub fn display_name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    pub fn is_fetching(&self) -> bool {
        self.fetch.is_in_flight()
    }

    pub fn fetch_failed(&self) -> bool {
        self.fetch.failed()
    }

    pub fn event(&self) -> Option<&SingleInstanceEvent> {
        self.event.as_ref()
    }

    pub fn event_mut(&mut self) -> Option<&mut SingleInstanceEvent> {
        self.event.as_mut()
    }

    pub fn fetch(&mut self, loader: &AssetLoader) {
        self.fetch.start(loader, &self.descriptor.path);
    }

    // Returns the error once, on the poll that sees a running fetch fail.
    pub fn poll_fetch(&mut self) -> Option<FetchError> {
        let was_running = self.fetch.is_in_flight();
        match self.fetch.poll() {
            Some(Err(err)) if was_running => Some(err.clone()),
            _ => None,
        }
    }

    pub fn load(
        &mut self,
        engine: &mut dyn StudioEngine,
        loader: &AssetLoader,
    ) -> Result<LoadProgress, LoadError> {
        if self.state == LoadState::Loaded {
            return Ok(LoadProgress::Ready);
        }

        self.state = LoadState::Loading;
        self.fetch(loader);
        let bytes = match self.fetch.poll() {
            None => return Ok(LoadProgress::Pending),
            Some(Ok(bytes)) => bytes.clone(),
            Some(Err(err)) => {
                self.state = LoadState::Unloaded;
                return Err(LoadError::Fetch(err.clone()));
            }
        };

        let bank = match engine.load_bank(&self.label, bytes) {
            Ok(bank) => bank,
            Err(EngineError::BankLoad { reason, .. }) => {
                self.state = LoadState::Unloaded;
                return Err(LoadError::Bank {
                    path: self.descriptor.path.clone(),
                    reason,
                });
            }
            Err(err) => {
                self.state = LoadState::Unloaded;
                return Err(err.into());
            }
        };

        let mut event = SingleInstanceEvent::new(&self.label);
        if let Err(err) = event.load(engine) {
            self.state = LoadState::Unloaded;
            engine.unload_bank(bank)?;
            return Err(err);
        }

        log::info!("loaded track {} ({})", self.descriptor.name, self.label);
        self.bank = Some(bank);
        self.event = Some(event);
        self.state = LoadState::Loaded;
        Ok(LoadProgress::Ready)
    }

    // Releases the engine-side instance and bank. The fetched bytes stay
    // cached, so a later load skips the network.
    pub fn unload(&mut self, engine: &mut dyn StudioEngine) -> Result<(), EngineError> {
        if let Some(mut event) = self.event.take() {
            event.unload(engine)?;
        }
        if let Some(bank) = self.bank.take() {
            engine.unload_bank(bank)?;
        }
        if self.state == LoadState::Loaded {
            log::debug!("unloaded track {}", self.descriptor.name);
        }
        self.state = LoadState::Unloaded;
        Ok(())
    }

    pub fn retry(&mut self) {
        self.fetch.reset_failed();
    }
}
