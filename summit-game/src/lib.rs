//! Summit Game Engine
//!
//! Platform-agnostic core for the Summit incremental climbing game: elevation
//! tracks, the per-tick mission simulation, the mission lifecycle and player
//! progression. Rendering and persistence live outside this crate.

pub mod constants;
pub mod data;
pub mod mission;
pub mod numbers;
pub mod player;
pub mod result;
pub mod state;
pub mod terrain;

use thiserror::Error;

// Re-export commonly used types
pub use data::{Backpack, Catalog, CatalogError, Item, LevelProperties, Shoes};
pub use mission::{
    AdvanceSummary, HeightSource, MissionConfig, MissionConfigError, MissionError,
    MissionSession, StateObserver, SubscriptionId, TickClock, TickOutcome, TickSchedule, TickStep,
    slope_multiplier, stamina_per_tick,
};
pub use player::{PlayerStats, PurchaseOutcome};
pub use result::{MissionOutcome, MissionReport, RewardGrant};
pub use state::GameState;
pub use terrain::{
    ElevationModel, ParseError, ProfilePath, ProfileViewport, SlopePolicy, TrackSample,
};

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the level and item catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    fn load_catalog(&self) -> Result<Catalog, Self::Error>;

    /// Load configuration data for a specific system
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Errors raised by [`BundledData`].
#[derive(Debug, Error)]
pub enum BundledDataError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("no bundled config named {0}")]
    UnknownConfig(String),
    #[error("bundled config {name} is malformed: {source}")]
    Config {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Loader backed by the JSON tables compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledData;

impl DataLoader for BundledData {
    type Error = BundledDataError;

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        Ok(Catalog::load_bundled()?)
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let raw = match config_name {
            "mission" => mission::DEFAULT_MISSION_DATA,
            other => return Err(BundledDataError::UnknownConfig(other.to_string())),
        };
        serde_json::from_str(raw).map_err(|source| BundledDataError::Config {
            name: config_name.to_string(),
            source,
        })
    }
}

/// Errors raised while building a session.
#[derive(Debug, Error)]
pub enum EngineError<E>
where
    E: std::error::Error + 'static,
{
    #[error("data loader failed: {0}")]
    Loader(#[source] E),
    #[error(transparent)]
    Config(#[from] MissionConfigError),
}

/// Main game engine for building mission sessions
pub struct SummitEngine<L>
where
    L: DataLoader,
{
    data_loader: L,
}

impl<L> SummitEngine<L>
where
    L: DataLoader,
{
    /// Create a new game engine with the provided data loader
    pub const fn new(data_loader: L) -> Self {
        Self { data_loader }
    }

    pub const fn data_loader(&self) -> &L {
        &self.data_loader
    }

    /// Load the catalog through the data loader.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn catalog(&self) -> Result<Catalog, EngineError<L::Error>> {
        self.data_loader.load_catalog().map_err(EngineError::Loader)
    }

    /// Load the `mission` config through the data loader.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or fails validation.
    pub fn mission_config(&self) -> Result<MissionConfig, EngineError<L::Error>> {
        let config: MissionConfig = self
            .data_loader
            .load_config("mission")
            .map_err(EngineError::Loader)?;
        config.validate()?;
        Ok(config)
    }

    /// Construct an idle session with a fresh player and the loaded config.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or config cannot be loaded.
    pub fn create_session(&self) -> Result<MissionSession, EngineError<L::Error>> {
        let config = self.mission_config()?;
        self.create_session_with(config)
    }

    /// Construct an idle session with a fresh player and an explicit config.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or `config` is invalid.
    pub fn create_session_with(
        &self,
        config: MissionConfig,
    ) -> Result<MissionSession, EngineError<L::Error>> {
        let catalog = self.catalog()?;
        Ok(MissionSession::from_catalog(config, &catalog)?)
    }
}
