//! Engine loader: drives selections through the registry state machine,
//! enforcing stop-before-start across switches and persisting the choice.

use crate::constants::SELECT_ID;
use crate::core::{
    catalog_entry, EngineRegistry, LoadDecision, Selection, DEFAULT_ENGINE, ENGINE_PREF_KEY,
    ENTITLEMENTS_KEY, UPGRADE_PATH,
};
use crate::dom;
use crate::engines::{self, Engine};
use fnv::FnvHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct EngineLoader {
    registry: RefCell<EngineRegistry>,
    /// Constructed engine instances, keyed by id. Construction happens on the
    /// first load request for an id (the lazy-load boundary); a stopped
    /// instance is retained and re-initialized on the next switch back.
    instances: RefCell<FnvHashMap<&'static str, Box<dyn Engine>>>,
}

impl EngineLoader {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            registry: RefCell::new(EngineRegistry::new()),
            instances: RefCell::new(FnvHashMap::default()),
        })
    }

    /// Unlocked premium engine ids, comma-separated in storage.
    pub fn entitlements() -> Vec<String> {
        dom::read_pref(ENTITLEMENTS_KEY)
            .map(|s| {
                s.split(',')
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The persisted last-selected engine, falling back to the default when
    /// the stored value is missing or no longer in the catalog.
    pub fn stored_engine() -> &'static str {
        dom::read_pref(ENGINE_PREF_KEY)
            .and_then(|s| catalog_entry(&s))
            .map(|e| e.id)
            .unwrap_or(DEFAULT_ENGINE)
    }

    pub fn select_engine(&self, id: &str) {
        let selection = match self.registry.borrow().select(id, &Self::entitlements()) {
            Ok(s) => s,
            Err(e) => {
                log::error!("[loader] {e}");
                return;
            }
        };
        // select() only returns Switch/Locked/AlreadyActive for catalog ids
        let Some(entry) = catalog_entry(id) else {
            return;
        };
        match selection {
            Selection::AlreadyActive => {}
            Selection::Locked => {
                log::info!("[loader] {} is locked; redirecting to provisioning", entry.id);
                dom::redirect_to(UPGRADE_PATH);
                self.revert_visible_selection();
            }
            Selection::Switch { stop_first } => {
                if let Some(prev) = stop_first {
                    self.stop_engine(prev);
                }
                self.load_and_activate(entry.id);
            }
        }
    }

    fn stop_engine(&self, id: &'static str) {
        if let Some(engine) = self.instances.borrow_mut().get_mut(id) {
            engine.stop();
        }
        if let Err(e) = self.registry.borrow_mut().deactivate(id) {
            log::error!("[loader] deactivate {id}: {e}");
        }
    }

    fn load_and_activate(&self, id: &'static str) {
        let decision = match self.registry.borrow_mut().begin_load(id) {
            Ok(d) => d,
            Err(e) => {
                log::error!("[loader] {e}");
                return;
            }
        };
        match decision {
            // The in-flight load will finish and activate on its own.
            LoadDecision::JoinInFlight => return,
            LoadDecision::StartFetch => match engines::construct(id) {
                Some(engine) => {
                    self.instances.borrow_mut().insert(id, engine);
                    if let Err(e) = self.registry.borrow_mut().finish_load(id) {
                        log::error!("[loader] finish_load {id}: {e}");
                    }
                }
                None => {
                    log::error!("[loader] no engine code for {id}");
                    _ = self.registry.borrow_mut().fail_load(id);
                    self.revert_visible_selection();
                    return;
                }
            },
            LoadDecision::AlreadyResident => {}
        }

        let initialized = {
            let mut instances = self.instances.borrow_mut();
            match instances.get_mut(id) {
                Some(engine) => match engine.init() {
                    Ok(()) => true,
                    Err(e) => {
                        log::error!("[loader] init {id} failed: {e:#}");
                        false
                    }
                },
                None => false,
            }
        };

        if initialized {
            match self.registry.borrow_mut().activate(id) {
                Ok(()) => {
                    dom::write_pref(ENGINE_PREF_KEY, id);
                    log::info!("[loader] {id} active");
                }
                Err(e) => log::error!("[loader] activate {id}: {e}"),
            }
        } else {
            _ = self.registry.borrow_mut().fail_load(id);
            self.revert_visible_selection();
        }
    }

    /// Put the selection control back on the last engine that actually ran.
    fn revert_visible_selection(&self) {
        let fallback = self
            .registry
            .borrow()
            .active_id()
            .unwrap_or_else(Self::stored_engine);
        if let Some(document) = dom::window_document() {
            if let Some(el) = document.get_element_by_id(SELECT_ID) {
                if let Ok(select) = el.dyn_into::<web::HtmlSelectElement>() {
                    select.set_value(fallback);
                }
            }
        }
    }
}
