//! Import orchestration.
//!
//! One importer owns one destination asset slot and walks every import
//! through the same state machine:
//!
//! ```text
//!              ┌────────────┐
//!   edit ────> │ Validating │──── bad config ────┐
//!              └─────┬──────┘                    │
//!                    │                           ▼
//!         ┌──────────┴──────────┐          ┌──────────┐
//!         ▼                     ▼          │  Failed  │
//!   ┌────────────┐       ┌──────────┐      └──────────┘
//!   │ Resampling │       │ Decoding │            ▲
//!   └─────┬──────┘       └────┬─────┘            │
//!         └────── barrier ────┘                  │
//!                    │                           │
//!              ┌─────▼─────┐ ── lost surface ────┘
//!              │ Building  │
//!              └─────┬─────┘
//!                    ▼
//!              ┌───────────┐
//!              │   Ready   │  (previous asset survives every failure)
//!              └───────────┘
//! ```
//!
//! Resampling and decoding read the same immutable surface and write
//! disjoint buffers, so they run as two scoped threads; the join is the
//! barrier before building. A new request cancels the in-flight one
//! cooperatively (the flag is polled between rows) and then takes the run
//! lock: two imports never run concurrently against one importer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use terravox_asset::HeightmapAsset;
use terravox_surface::SurfaceProvider;

use crate::config::ImporterConfig;
use crate::decode::decode_materials;
use crate::error::{ConfigError, ImportError, ImportResult, ImportWarning};
use crate::mapping::MappingTable;
use crate::resample::resample_heights;

/// Capacity of the event channel. Events beyond an unread backlog of this
/// size are dropped; the synchronous return value is the reliable path.
const EVENT_BUFFER: usize = 32;

/// Where the importer currently is in the state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImportState {
    /// No import has been requested yet.
    #[default]
    Idle,
    /// Checking configuration and the surface reference.
    Validating,
    /// Height grid work in flight (decode may run concurrently).
    Resampling,
    /// Material decode still in flight after resampling finished.
    Decoding,
    /// Zipping grids into the output asset.
    Building,
    /// The last import succeeded; its asset is held.
    Ready,
    /// The last import failed; any previously ready asset is still held.
    Failed,
}

/// Measurements from one successful import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportStats {
    /// Source surface dimensions in texels.
    pub source_dimensions: (u32, u32),
    /// Output asset dimensions in voxel columns.
    pub target_dimensions: (u32, u32),
    /// Cells whose discrete index had no mapping entry.
    pub undefined_cells: u64,
    /// Wall-clock duration of the import.
    pub elapsed: Duration,
}

/// Everything a successful import hands back.
#[derive(Clone, Debug)]
pub struct ImportOutcome {
    /// The freshly built asset.
    pub asset: Arc<HeightmapAsset>,
    /// Warning-level conditions met along the way.
    pub warnings: Vec<ImportWarning>,
    /// Measurements.
    pub stats: ImportStats,
}

/// Events mirrored onto the importer's channel for listeners that do not
/// call [`HeightmapImporter::reimport`] themselves.
#[derive(Clone, Debug)]
pub enum ImportEvent {
    /// An import began.
    Started,
    /// An import finished and replaced the ready asset.
    Completed(ImportOutcome),
    /// An import failed; the previous ready asset is untouched.
    Failed(ImportError),
}

/// Drives surface-to-asset imports for one destination asset slot.
///
/// Shared behind [`Arc`]; every method takes `&self`. The host calls
/// [`set_surface`], [`set_config`] or [`notify_surface_edited`] from its
/// edit hooks, each of which re-enters validation.
///
/// [`set_surface`]: HeightmapImporter::set_surface
/// [`set_config`]: HeightmapImporter::set_config
/// [`notify_surface_edited`]: HeightmapImporter::notify_surface_edited
pub struct HeightmapImporter<S: SurfaceProvider> {
    /// The bound surface, if any.
    surface: Mutex<Option<Arc<S>>>,
    /// Current configuration as last edited by the host.
    config: Mutex<ImporterConfig>,
    /// Current state machine position.
    state: Mutex<ImportState>,
    /// Last successfully built asset.
    ready: Mutex<Option<Arc<HeightmapAsset>>>,
    /// Serializes imports; held for the whole of one run.
    run_lock: Mutex<()>,
    /// Cooperative cancellation flag, polled between rows of work.
    cancel: AtomicBool,
    /// Event fan-out.
    event_tx: Sender<ImportEvent>,
    /// Kept so the channel never disconnects while the importer lives.
    event_rx: Receiver<ImportEvent>,
}

impl<S: SurfaceProvider> HeightmapImporter<S> {
    /// Creates an importer with no surface bound.
    #[must_use]
    pub fn new(config: ImporterConfig) -> Self {
        let (event_tx, event_rx) = bounded(EVENT_BUFFER);
        Self {
            surface: Mutex::new(None),
            config: Mutex::new(config),
            state: Mutex::new(ImportState::Idle),
            ready: Mutex::new(None),
            run_lock: Mutex::new(()),
            cancel: AtomicBool::new(false),
            event_tx,
            event_rx,
        }
    }

    /// Returns a receiver for import lifecycle events.
    #[must_use]
    pub fn events(&self) -> Receiver<ImportEvent> {
        self.event_rx.clone()
    }

    /// Returns the current state machine position.
    #[must_use]
    pub fn state(&self) -> ImportState {
        *self.state.lock()
    }

    /// Returns the last successfully built asset, if any.
    #[must_use]
    pub fn ready_asset(&self) -> Option<Arc<HeightmapAsset>> {
        self.ready.lock().clone()
    }

    /// Binds (or replaces) the source surface and re-imports.
    ///
    /// # Errors
    ///
    /// Propagates the triggered import's [`ImportError`].
    pub fn set_surface(&self, surface: Arc<S>) -> ImportResult<ImportOutcome> {
        *self.surface.lock() = Some(surface);
        self.reimport()
    }

    /// Replaces the configuration and re-imports.
    ///
    /// # Errors
    ///
    /// Propagates the triggered import's [`ImportError`].
    pub fn set_config(&self, config: ImporterConfig) -> ImportResult<ImportOutcome> {
        *self.config.lock() = config;
        self.reimport()
    }

    /// The host's notification that the surface contents changed in place.
    ///
    /// # Errors
    ///
    /// Propagates the triggered import's [`ImportError`].
    pub fn notify_surface_edited(&self) -> ImportResult<ImportOutcome> {
        self.reimport()
    }

    /// Runs one import against the current surface and configuration.
    ///
    /// Newest request wins: an in-flight import is asked to stop at its
    /// next row boundary and this call waits for it to unwind before
    /// starting. (A request landing in the instant between lock acquisition
    /// and flag reset simply waits instead of cancelling, which is safe.)
    /// On success the ready asset is replaced; on any failure it is left
    /// exactly as it was and the error is reported.
    ///
    /// # Errors
    ///
    /// [`ImportError::Config`] for configuration problems,
    /// [`ImportError::SurfaceLost`] if the surface died mid-import,
    /// [`ImportError::Cancelled`] if a newer request superseded this one.
    ///
    /// # Panics
    ///
    /// Propagates panics from the worker threads; a worker panic is a bug,
    /// not an input condition.
    pub fn reimport(&self) -> ImportResult<ImportOutcome> {
        self.cancel.store(true, Ordering::Relaxed);
        let _run = self.run_lock.lock();
        self.cancel.store(false, Ordering::Relaxed);

        self.emit(ImportEvent::Started);
        match self.run_import() {
            Ok(outcome) => {
                *self.ready.lock() = Some(Arc::clone(&outcome.asset));
                self.set_state(ImportState::Ready);
                self.emit(ImportEvent::Completed(outcome.clone()));
                Ok(outcome)
            }
            Err(import_error) => {
                self.set_state(ImportState::Failed);
                error!(%import_error, "terrain import failed");
                self.emit(ImportEvent::Failed(import_error.clone()));
                Err(import_error)
            }
        }
    }

    /// The pipeline body: validate, fan out, build.
    fn run_import(&self) -> ImportResult<ImportOutcome> {
        let started = Instant::now();
        let config = self.config.lock().clone();

        self.set_state(ImportState::Validating);
        debug!("validating import configuration");

        let surface = self
            .surface
            .lock()
            .clone()
            .ok_or(ConfigError::MissingSurface)?;
        if !(config.voxel_scale.is_finite() && config.voxel_scale > 0.0) {
            return Err(ConfigError::InvalidVoxelScale(config.voxel_scale).into());
        }
        let table = MappingTable::validate(&config.mappings, config.mode)?;

        // A reference that cannot even report dimensions has not resolved;
        // that is a configuration problem, not a mid-import loss.
        let source_dims = surface
            .get_dimensions()
            .map_err(|_| ConfigError::InvalidSurface)?;
        if source_dims.0 == 0 || source_dims.1 == 0 {
            return Err(ConfigError::EmptySurface {
                width: source_dims.0,
                height: source_dims.1,
            }
            .into());
        }
        let target_dims = config.target_dimensions(source_dims);

        let mut warnings = Vec::new();
        if table.is_empty() {
            warn!("no layer mappings bound; material weights will be uniformly zero");
            warnings.push(ImportWarning::EmptyMappingTable);
        }

        info!(
            source_width = source_dims.0,
            source_height = source_dims.1,
            target_width = target_dims.0,
            target_height = target_dims.1,
            mode = ?config.mode,
            layers = table.len(),
            "importing terrain surface"
        );

        // Fan out: disjoint output buffers over a shared read-only surface.
        // The join below is the barrier before building.
        self.set_state(ImportState::Resampling);
        let surface_ref: &S = surface.as_ref();
        let table_ref = &table;
        let cancel = &self.cancel;
        let index_channel = config.index_channel;
        let (height_result, decode_result) = thread::scope(|scope| {
            let resample_task =
                scope.spawn(move || resample_heights(surface_ref, target_dims, cancel));
            let decode_task = scope.spawn(move || {
                decode_materials(surface_ref, table_ref, index_channel, target_dims, cancel)
            });

            let height_result = resample_task.join().expect("resample worker panicked");
            self.set_state(ImportState::Decoding);
            let decode_result = decode_task.join().expect("decode worker panicked");
            (height_result, decode_result)
        });
        let heights = height_result?;
        let decoded = decode_result?;

        self.set_state(ImportState::Building);
        debug!("building heightmap asset");
        if decoded.undefined_cells > 0 {
            warn!(
                cells = decoded.undefined_cells,
                "discrete material indices with no mapping entry; affected cells carry zero weights"
            );
            warnings.push(ImportWarning::UndefinedMaterial {
                cells: decoded.undefined_cells,
                example_index: decoded.example_index.unwrap_or(0),
            });
        }

        let layers = table.bound_layers();
        let asset = HeightmapAsset::build(heights, decoded.grid, &layers)
            .map_err(ConfigError::from)?;

        let stats = ImportStats {
            source_dimensions: source_dims,
            target_dimensions: target_dims,
            undefined_cells: decoded.undefined_cells,
            elapsed: started.elapsed(),
        };
        info!(elapsed = ?stats.elapsed, "terrain import complete");

        Ok(ImportOutcome {
            asset: Arc::new(asset),
            warnings,
            stats,
        })
    }

    /// Records a state transition.
    fn set_state(&self, state: ImportState) {
        *self.state.lock() = state;
    }

    /// Best-effort event fan-out; listeners may be absent or behind.
    fn emit(&self, event: ImportEvent) {
        let _ = self.event_tx.try_send(event);
    }
}
