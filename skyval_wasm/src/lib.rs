//! Browser bindings: the page keeps its DOM and animations, and calls in here
//! for layout, poems, gift links and slot outcomes. Everything crosses the
//! boundary as JSON strings.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use skyval_core::{
    layout, poem, resolve_ids, EngineParams, Mulberry32, Settled, SlotSession,
};
use skyval_shared::{decode_gift, encode_gift};

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_ids(ids_json: &str) -> Result<Vec<String>, JsValue> {
    serde_json::from_str(ids_json).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// `["rose","tulip"]` in, placements out.
#[wasm_bindgen]
pub fn place_bouquet(ids_json: &str) -> Result<String, JsValue> {
    let ids = parse_ids(ids_json)?;
    to_json(&layout::place(&ids))
}

#[wasm_bindgen]
pub fn bouquet_poem(ids_json: &str) -> Result<String, JsValue> {
    let ids = parse_ids(ids_json)?;
    Ok(poem::poem_for_ids(&ids))
}

#[wasm_bindgen(js_name = encode_gift)]
pub fn encode_gift_ids(ids_json: &str) -> Result<String, JsValue> {
    let ids = parse_ids(ids_json)?;
    Ok(encode_gift(&resolve_ids(&ids)))
}

/// Never throws; a broken payload decodes to `[]`.
#[wasm_bindgen(js_name = decode_gift)]
pub fn decode_gift_ids(raw: &str) -> String {
    let ids: Vec<&str> = decode_gift(raw).iter().map(|f| f.id()).collect();
    serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
}

#[derive(Serialize)]
struct SpinView<'a> {
    #[serde(flatten)]
    settled: &'a Settled,
    title: String,
    subtitle: &'static str,
    held: [bool; 3],
}

/// One slot session, seeded from the page.
#[wasm_bindgen]
pub struct SlotMachine {
    session: SlotSession,
    rng: Mulberry32,
}

#[wasm_bindgen]
impl SlotMachine {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32) -> SlotMachine {
        SlotMachine {
            session: SlotSession::new(EngineParams::default()),
            rng: Mulberry32::new(seed),
        }
    }

    pub fn toggle_hold(&mut self, reel: usize) -> Result<bool, JsValue> {
        self.session
            .toggle_hold(reel)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Settles immediately; the page runs its reel animations on the returned triple.
    pub fn spin(&mut self) -> Result<String, JsValue> {
        let settled = self
            .session
            .spin_now(&mut self.rng)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_json(&SpinView {
            title: settled.outcome.title(),
            subtitle: settled.outcome.subtitle(),
            held: self.session.state().held,
            settled: &settled,
        })
    }

    pub fn spins_left(&self) -> u32 {
        self.session.state().spins_left
    }

    pub fn can_spin(&self) -> bool {
        self.session.can_spin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_and_poem_from_json() {
        let placed: serde_json::Value =
            serde_json::from_str(&place_bouquet(r#"["rose","tulip","lily"]"#).unwrap()).unwrap();
        assert_eq!(placed.as_array().unwrap().len(), 3);
        assert!(bouquet_poem(r#"["rose","tulip","lily"]"#)
            .unwrap()
            .ends_with("I keep choosing you, softly and surely."));
    }

    #[test]
    fn gift_ids_round_trip() {
        let raw = encode_gift_ids(r#"["sakura","nope","peony"]"#).unwrap();
        assert_eq!(decode_gift_ids(&raw), r#"["sakura","peony"]"#);
        assert_eq!(decode_gift_ids("%%"), "[]");
    }

    #[test]
    fn machine_spends_spins() {
        let mut machine = SlotMachine::new(7);
        let before = machine.spins_left();
        let view: serde_json::Value = serde_json::from_str(&machine.spin().unwrap()).unwrap();
        assert!(view.get("outcome").is_some());
        assert_eq!(view["spins_left"].as_u64(), Some(machine.spins_left() as u64));
        assert!(machine.spins_left() >= before - 1);
    }
}
