use mapview::FallbackView;
use scene::overlay::DetailCard;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

pub const CARD_CLASS: &str = "atlas-card";
pub const FALLBACK_CLASS: &str = "atlas-fallback";

/// Two lines of text rendered into a host element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub class: &'static str,
    pub heading: String,
    pub body: String,
}

impl TextBlock {
    pub fn card(card: &DetailCard) -> Self {
        Self {
            class: CARD_CLASS,
            heading: card.title.clone(),
            body: card.meta_line(),
        }
    }

    pub fn fallback(view: &FallbackView) -> Self {
        Self {
            class: FALLBACK_CLASS,
            heading: view.title.clone(),
            body: view.body.clone(),
        }
    }
}

pub fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no browser document"))
}

pub fn element(doc: &Document, id: &str) -> Result<Element, JsValue> {
    doc.get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id `{id}`")))
}

/// Replaces the children of `host` with `block`, or hides `host` for `None`.
pub fn render(doc: &Document, host: &Element, block: Option<&TextBlock>) -> Result<(), JsValue> {
    host.set_text_content(None);
    let Some(block) = block else {
        host.set_attribute("hidden", "")?;
        return Ok(());
    };
    host.remove_attribute("hidden")?;

    let wrapper = doc.create_element("div")?;
    wrapper.set_class_name(block.class);
    let heading = doc.create_element("div")?;
    heading.set_class_name(&format!("{}__title", block.class));
    heading.set_text_content(Some(&block.heading));
    let body = doc.create_element("div")?;
    body.set_class_name(&format!("{}__body", block.class));
    body.set_text_content(Some(&block.body));

    wrapper.append_child(&heading)?;
    wrapper.append_child(&body)?;
    host.append_child(&wrapper)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CARD_CLASS, TextBlock};
    use scene::overlay::DetailCard;

    #[test]
    fn card_block_uses_meta_line() {
        let block = TextBlock::card(&DetailCard {
            title: "Lakeside Food Fest".into(),
            category: "Food".into(),
            starts_at: "Thu 5:30 PM".into(),
        });
        assert_eq!(block.class, CARD_CLASS);
        assert_eq!(block.heading, "Lakeside Food Fest");
        assert_eq!(block.body, "Food \u{2022} Thu 5:30 PM");
    }
}
