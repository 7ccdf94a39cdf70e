// Engine catalog and lifecycle state machine.
//
// Pure bookkeeping behind the loader: which engines exist, which one is
// active, whose code is resident, and what a selection request should do.
// At most one engine may be active at any instant, and activating a new one
// requires the previous one to have been fully deactivated first; the web
// layer performs the actual teardown and construction.

use fnv::FnvHashMap;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Unloaded,
    Loading,
    Active,
    /// A code fetch or init failed; retried on the next load request.
    Failed,
}

#[derive(Clone, Copy, Debug)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub label: &'static str,
    /// Premium engines are selectable only when entitled.
    pub premium: bool,
}

/// The fixed engine catalog. Standard entries first, premium after.
pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: "pulsegrid",
        label: "Pulse Grid",
        premium: false,
    },
    CatalogEntry {
        id: "starfield",
        label: "Starfield",
        premium: false,
    },
    CatalogEntry {
        id: "ultraviolet",
        label: "Ultraviolet",
        premium: true,
    },
];

pub fn catalog_entry(id: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.id == id)
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown engine id: {0}")]
    UnknownEngine(String),
    #[error("{id} cannot activate while {active} is still active")]
    ActiveConflict { id: String, active: String },
    #[error("{id} is {state:?}, expected {expected:?}")]
    BadState {
        id: String,
        state: EngineState,
        expected: EngineState,
    },
}

/// What a selection request should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// The requested engine is already running; nothing to do.
    AlreadyActive,
    /// Premium engine without an entitlement: redirect to provisioning and
    /// revert the visible selection. No state changes.
    Locked,
    /// Stop `stop_first` (when present), then load and activate the target.
    Switch { stop_first: Option<&'static str> },
}

/// What a load request should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadDecision {
    /// Code not resident: fetch it (exactly once).
    StartFetch,
    /// A fetch for this id is already in flight; join it.
    JoinInFlight,
    /// Code already resident: skip straight to init.
    AlreadyResident,
}

struct ModuleSlot {
    state: EngineState,
    /// Engine code has been fetched. Survives deactivation; a stopped engine
    /// reactivates without another fetch.
    resident: bool,
}

pub struct EngineRegistry {
    slots: FnvHashMap<&'static str, ModuleSlot>,
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineRegistry {
    pub fn new() -> Self {
        let mut slots = FnvHashMap::default();
        for entry in CATALOG {
            slots.insert(
                entry.id,
                ModuleSlot {
                    state: EngineState::Unloaded,
                    resident: false,
                },
            );
        }
        Self { slots }
    }

    pub fn state(&self, id: &str) -> EngineState {
        self.slots
            .get(id)
            .map(|s| s.state)
            .unwrap_or(EngineState::Unloaded)
    }

    pub fn active_id(&self) -> Option<&'static str> {
        self.slots
            .iter()
            .find(|(_, slot)| slot.state == EngineState::Active)
            .map(|(id, _)| *id)
    }

    /// Decide what a selection request for `id` should do, given the caller's
    /// entitlement list. Read-only.
    pub fn select(&self, id: &str, entitlements: &[String]) -> Result<Selection, RegistryError> {
        let entry =
            catalog_entry(id).ok_or_else(|| RegistryError::UnknownEngine(id.to_string()))?;
        if entry.premium && !entitlements.iter().any(|e| e.as_str() == entry.id) {
            return Ok(Selection::Locked);
        }
        if self.state(entry.id) == EngineState::Active {
            return Ok(Selection::AlreadyActive);
        }
        Ok(Selection::Switch {
            stop_first: self.active_id(),
        })
    }

    /// Enter the load path for `id`, deduplicating concurrent requests.
    /// A `Failed` slot retries the fetch.
    pub fn begin_load(&mut self, id: &str) -> Result<LoadDecision, RegistryError> {
        let slot = self
            .slots
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownEngine(id.to_string()))?;
        match slot.state {
            EngineState::Loading => Ok(LoadDecision::JoinInFlight),
            _ if slot.resident => Ok(LoadDecision::AlreadyResident),
            _ => {
                slot.state = EngineState::Loading;
                Ok(LoadDecision::StartFetch)
            }
        }
    }

    /// Mark the fetch for `id` complete. The slot stays non-active until
    /// `activate` runs its init.
    pub fn finish_load(&mut self, id: &str) -> Result<(), RegistryError> {
        let slot = self
            .slots
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownEngine(id.to_string()))?;
        if slot.state != EngineState::Loading {
            return Err(RegistryError::BadState {
                id: id.to_string(),
                state: slot.state,
                expected: EngineState::Loading,
            });
        }
        slot.resident = true;
        Ok(())
    }

    /// Mark the fetch or init for `id` failed, so the id is not left stuck in
    /// `Loading` and a later selection retries from scratch.
    pub fn fail_load(&mut self, id: &str) -> Result<(), RegistryError> {
        let slot = self
            .slots
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownEngine(id.to_string()))?;
        slot.state = EngineState::Failed;
        slot.resident = false;
        Ok(())
    }

    /// Activate `id`. Rejected while any other engine is still active:
    /// stop-before-start is the loader's invariant and this is the backstop.
    pub fn activate(&mut self, id: &str) -> Result<(), RegistryError> {
        if let Some(active) = self.active_id() {
            if active != id {
                return Err(RegistryError::ActiveConflict {
                    id: id.to_string(),
                    active: active.to_string(),
                });
            }
        }
        let slot = self
            .slots
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownEngine(id.to_string()))?;
        if !slot.resident {
            return Err(RegistryError::BadState {
                id: id.to_string(),
                state: slot.state,
                expected: EngineState::Loading,
            });
        }
        slot.state = EngineState::Active;
        Ok(())
    }

    /// Reset `id` to `Unloaded` after its teardown. Residency is kept.
    pub fn deactivate(&mut self, id: &str) -> Result<(), RegistryError> {
        let slot = self
            .slots
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownEngine(id.to_string()))?;
        slot.state = EngineState::Unloaded;
        Ok(())
    }
}
