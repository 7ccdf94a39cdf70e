#![cfg(target_arch = "wasm32")]
//! Decorative audio+visual effect engines for the web.
//!
//! A fixed catalog of mutually exclusive "engines", each pairing a
//! procedurally animated canvas surface with a step-sequenced, procedurally
//! synthesized audio track. The loader lazily constructs engines on first
//! selection, guarantees stop-before-start across switches, and persists the
//! choice. A secret key sequence toggles audio in the active engine.

use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

mod audio;
mod constants;
mod core;
mod dom;
mod engines;
mod loader;
mod render;
mod scheduler;

use crate::constants::{SELECT_ID, STAGE_CONTAINER_ID};
use crate::core::CATALOG;
use crate::loader::EngineLoader;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("fx-web starting");

    if let Err(e) = init() {
        log::error!("init error: {e:#}");
    }
    Ok(())
}

fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let loader = EngineLoader::new();

    build_selection_surface(&document, &loader)?;

    // Restore the persisted engine (or the default) on startup.
    let initial = EngineLoader::stored_engine();
    loader.select_engine(initial);
    set_visible_selection(&document, initial);
    Ok(())
}

fn set_visible_selection(document: &web::Document, id: &str) {
    if let Some(el) = document.get_element_by_id(SELECT_ID) {
        if let Ok(select) = el.dyn_into::<web::HtmlSelectElement>() {
            select.set_value(id);
        }
    }
}

/// Build the single-choice engine control: standard entries always
/// selectable, premium entries rendered locked unless entitled. Selecting a
/// locked entry triggers a provisioning redirect instead of a switch.
fn build_selection_surface(
    document: &web::Document,
    loader: &Rc<EngineLoader>,
) -> anyhow::Result<()> {
    if document.get_element_by_id(SELECT_ID).is_some() {
        return Ok(());
    }

    let select = document
        .create_element("select")
        .map_err(|e| anyhow::anyhow!("{e:?}"))?;
    _ = select.set_attribute("id", SELECT_ID);

    let entitlements = EngineLoader::entitlements();
    let standard = document
        .create_element("optgroup")
        .map_err(|e| anyhow::anyhow!("{e:?}"))?;
    _ = standard.set_attribute("label", "Standard");
    let premium = document
        .create_element("optgroup")
        .map_err(|e| anyhow::anyhow!("{e:?}"))?;
    _ = premium.set_attribute("label", "Premium");

    for entry in CATALOG {
        let option = document
            .create_element("option")
            .map_err(|e| anyhow::anyhow!("{e:?}"))?;
        _ = option.set_attribute("value", entry.id);
        let locked = entry.premium && !entitlements.iter().any(|e| e.as_str() == entry.id);
        if locked {
            option.set_text_content(Some(&format!("\u{1F512} {}", entry.label)));
        } else {
            option.set_text_content(Some(entry.label));
        }
        let group = if entry.premium { &premium } else { &standard };
        _ = group.append_child(&option);
    }
    _ = select.append_child(&standard);
    _ = select.append_child(&premium);

    let parent = document
        .get_element_by_id(STAGE_CONTAINER_ID)
        .or_else(|| document.body().map(web::Element::from))
        .ok_or_else(|| anyhow::anyhow!("no mount point for the selection control"))?;
    _ = parent.append_child(&select);

    // Page-lifetime wiring: the control outlives every engine switch.
    let loader_change = loader.clone();
    let select_el: web::HtmlSelectElement = select
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("{e:?}"))?;
    let select_read = select_el.clone();
    let closure = Closure::wrap(Box::new(move || {
        loader_change.select_engine(&select_read.value());
    }) as Box<dyn FnMut()>);
    _ = select_el.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
    closure.forget();

    Ok(())
}
