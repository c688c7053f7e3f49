//! DOM plumbing: container lookup, sizing, and the two non-accelerated presentations.

use session::{ContainerSize, ErrorFallback, Fallback2D};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

pub fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("window missing"))
}

pub fn document(window: &web_sys::Window) -> Result<web_sys::Document, JsValue> {
    window
        .document()
        .ok_or_else(|| JsValue::from_str("document missing"))
}

pub fn element_by_id(document: &web_sys::Document, id: &str) -> Result<web_sys::HtmlElement, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("element #{id} missing")))?
        .dyn_into::<web_sys::HtmlElement>()
        .map_err(|_| JsValue::from_str(&format!("#{id} is not an HTML element")))
}

fn create(document: &web_sys::Document, tag: &str) -> Result<web_sys::HtmlElement, JsValue> {
    document
        .create_element(tag)?
        .dyn_into::<web_sys::HtmlElement>()
        .map_err(|_| JsValue::from_str(&format!("<{tag}> is not an HTML element")))
}

pub fn container_size(window: &web_sys::Window, container: &web_sys::HtmlElement) -> ContainerSize {
    ContainerSize::new(
        f64::from(container.client_width()),
        f64::from(container.client_height()),
        window.device_pixel_ratio(),
    )
}

/// A canvas filling `container`.
pub fn append_canvas(
    document: &web_sys::Document,
    container: &web_sys::HtmlElement,
) -> Result<web_sys::HtmlCanvasElement, JsValue> {
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str("created element is not a canvas"))?;
    let style = canvas.style();
    style.set_property("display", "block")?;
    style.set_property("width", "100%")?;
    style.set_property("height", "100%")?;
    container.append_child(&canvas)?;
    Ok(canvas)
}

pub fn render_static_map(
    document: &web_sys::Document,
    container: &web_sys::HtmlElement,
    fallback: &Fallback2D,
) -> Result<(), JsValue> {
    let root = create(document, "div")?;
    root.set_class_name("tracker-static-map");
    root.style().set_property("position", "relative")?;
    root.style().set_property("width", "100%")?;
    root.style().set_property("height", "100%")?;

    let img = create(document, "img")?;
    img.set_attribute("src", &fallback.image_url)?;
    img.set_attribute("alt", "World map")?;
    img.style().set_property("width", "100%")?;
    img.style().set_property("height", "100%")?;
    img.style().set_property("object-fit", "contain")?;
    img.style().set_property("opacity", "0.7")?;
    root.append_child(&img)?;

    for marker in &fallback.markers {
        let dot = create(document, "div")?;
        dot.set_class_name("tracker-static-marker");
        let color = marker.color.to_css();
        let style = dot.style();
        style.set_property("position", "absolute")?;
        style.set_property("width", "12px")?;
        style.set_property("height", "12px")?;
        style.set_property("border-radius", "50%")?;
        style.set_property("left", &format!("{}%", marker.left_percent))?;
        style.set_property("top", &format!("{}%", marker.top_percent))?;
        style.set_property("transform", "translate(-50%, -50%)")?;
        style.set_property("background-color", &color)?;
        style.set_property("box-shadow", &format!("0 0 8px {color}"))?;
        root.append_child(&dot)?;
    }

    container.append_child(&root)?;
    Ok(())
}

pub fn render_error(
    document: &web_sys::Document,
    container: &web_sys::HtmlElement,
    notice: &ErrorFallback,
) -> Result<(), JsValue> {
    let root = create(document, "div")?;
    root.set_class_name("tracker-error");

    let title = create(document, "h3")?;
    title.set_text_content(Some(&notice.title));
    root.append_child(&title)?;

    let message = create(document, "p")?;
    message.set_text_content(Some(&notice.message));
    root.append_child(&message)?;

    let list = create(document, "ul")?;
    for suggestion in &notice.suggestions {
        let item = create(document, "li")?;
        item.set_text_content(Some(suggestion));
        list.append_child(&item)?;
    }
    root.append_child(&list)?;

    let retry = create(document, "button")?;
    retry.set_text_content(Some("Retry"));
    retry.set_attribute("onclick", "window.location.reload()")?;
    root.append_child(&retry)?;

    container.append_child(&root)?;
    Ok(())
}
