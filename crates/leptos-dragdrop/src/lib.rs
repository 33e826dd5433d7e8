//! Leptos DragDrop Utilities
//!
//! Simple drag-and-drop for Leptos using mouse events.
//! Items live in containers (board columns) and are addressed by
//! container id plus 0-based index. Uses movement threshold to distinguish
//! click from drag.

use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Where a drag started
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragOrigin {
    pub item_id: String,
    pub container_id: String,
    pub index: usize,
}

/// Slot the dragged item would land in
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropSlot {
    pub container_id: String,
    pub index: usize,
}

/// A finished drag; `destination` is `None` when released outside any slot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragEnd {
    pub origin: DragOrigin,
    pub destination: Option<DropSlot>,
}

/// DnD state signals
#[derive(Clone, Copy)]
pub struct DndSignals {
    pub dragging_read: ReadSignal<Option<DragOrigin>>,
    pub dragging_write: WriteSignal<Option<DragOrigin>>,
    pub drop_slot_read: ReadSignal<Option<DropSlot>>,
    pub drop_slot_write: WriteSignal<Option<DropSlot>>,
    pub drag_just_ended_read: ReadSignal<bool>,
    pub drag_just_ended_write: WriteSignal<bool>,
    /// Pending origin (mousedown but not yet dragging)
    pub pending_read: ReadSignal<Option<DragOrigin>>,
    pub pending_write: WriteSignal<Option<DragOrigin>>,
    /// Start position for movement detection
    pub start_x_read: ReadSignal<i32>,
    pub start_x_write: WriteSignal<i32>,
    pub start_y_read: ReadSignal<i32>,
    pub start_y_write: WriteSignal<i32>,
}

/// Movement threshold in pixels to start dragging
const DRAG_THRESHOLD_PX: i32 = 5;

pub fn create_dnd_signals() -> DndSignals {
    let (dragging_read, dragging_write) = signal(None::<DragOrigin>);
    let (drop_slot_read, drop_slot_write) = signal(None::<DropSlot>);
    let (drag_just_ended_read, drag_just_ended_write) = signal(false);
    let (pending_read, pending_write) = signal(None::<DragOrigin>);
    let (start_x_read, start_x_write) = signal(0i32);
    let (start_y_read, start_y_write) = signal(0i32);
    DndSignals {
        dragging_read,
        dragging_write,
        drop_slot_read,
        drop_slot_write,
        drag_just_ended_read,
        drag_just_ended_write,
        pending_read,
        pending_write,
        start_x_read,
        start_x_write,
        start_y_read,
        start_y_write,
    }
}

impl DndSignals {
    fn is_dragging(&self) -> bool {
        self.dragging_read
            .try_with_untracked(|d| d.is_some())
            .unwrap_or(false)
    }

    /// True while `item_id` is the item being dragged
    pub fn is_dragging_item(&self, item_id: &str) -> bool {
        self.dragging_read
            .with(|d| d.as_ref().is_some_and(|o| o.item_id == item_id))
    }

    /// True while the pointer hovers `slot`
    pub fn is_over(&self, container_id: &str, index: usize) -> bool {
        self.drop_slot_read.with(|s| {
            s.as_ref()
                .is_some_and(|s| s.container_id == container_id && s.index == index)
        })
    }
}

/// Index of the trailing slot of a container holding `len` items
///
/// Dropping at the end of the item's own container keeps the list length,
/// so the last valid index is `len - 1` there and `len` elsewhere.
pub fn end_slot_index(origin: &DragOrigin, container_id: &str, len: usize) -> usize {
    if origin.container_id == container_id {
        len.saturating_sub(1)
    } else {
        len
    }
}

/// End drag operation
pub fn end_drag(dnd: &DndSignals) {
    dnd.dragging_write.set(None);
    dnd.drop_slot_write.set(None);
    dnd.pending_write.set(None);
    dnd.drag_just_ended_write.set(true);

    if let Some(win) = web_sys::window() {
        let clear = dnd.drag_just_ended_write;
        let cb = Closure::<dyn FnMut()>::new(move || {
            clear.try_set(false);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), 100);
        cb.forget();
    }
}

/// Create mousedown handler for draggable items
/// Records pending drag with start position
pub fn make_on_mousedown(dnd: DndSignals, origin: DragOrigin) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |ev: web_sys::MouseEvent| {
        if ev.button() == 0 {
            // Ignore if target is input or button
            if let Some(target) = ev.target() {
                if target.dyn_ref::<web_sys::HtmlInputElement>().is_some() { return; }
                if target.dyn_ref::<web_sys::HtmlButtonElement>().is_some() { return; }
            }
            dnd.pending_write.set(Some(origin.clone()));
            dnd.start_x_write.set(ev.client_x());
            dnd.start_y_write.set(ev.client_y());
        }
    }
}

/// Create mouseenter handler for items; hovering item `index` targets its slot
pub fn make_on_item_mouseenter(dnd: DndSignals, slot: DropSlot) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |_ev: web_sys::MouseEvent| {
        if dnd.is_dragging() {
            dnd.drop_slot_write.set(Some(slot.clone()));
        }
    }
}

/// Create mouseenter handler for the empty area after a container's items
pub fn make_on_container_end_mouseenter(
    dnd: DndSignals,
    container_id: String,
    len: usize,
) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |_ev: web_sys::MouseEvent| {
        let Some(origin) = dnd.dragging_read.try_get_untracked().flatten() else {
            return;
        };
        dnd.drop_slot_write.set(Some(DropSlot {
            container_id: container_id.clone(),
            index: end_slot_index(&origin, &container_id, len),
        }));
    }
}

/// Create mouseleave handler
pub fn make_on_mouseleave(dnd: DndSignals) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| {
        if dnd.is_dragging() {
            dnd.drop_slot_write.set(None);
        }
    }
}

/// Document listeners installed by `bind_global_listeners`
///
/// Dropping the value removes them.
pub struct GlobalListeners {
    on_mousemove: Closure<dyn FnMut(web_sys::MouseEvent)>,
    on_mouseup: Closure<dyn FnMut(web_sys::MouseEvent)>,
}

impl Drop for GlobalListeners {
    fn drop(&mut self) {
        if let Some(doc) = web_sys::window().and_then(|w| w.document()) {
            let _ = doc.remove_event_listener_with_callback("mousemove", self.on_mousemove.as_ref().unchecked_ref());
            let _ = doc.remove_event_listener_with_callback("mouseup", self.on_mouseup.as_ref().unchecked_ref());
        }
    }
}

/// Bind document mousemove (drag start) and mouseup (drop) handlers
///
/// `on_drop` runs for every real drag, including releases outside any slot.
/// Plain clicks end without calling it.
pub fn bind_global_listeners<F>(dnd: DndSignals, on_drop: F) -> GlobalListeners
where
    F: Fn(DragEnd) + 'static,
{
    let on_mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        let Some(pending) = dnd.pending_read.try_get_untracked().flatten() else {
            return;
        };
        if dnd.is_dragging() {
            return;
        }
        let dx = (ev.client_x() - dnd.start_x_read.get_untracked()).abs();
        let dy = (ev.client_y() - dnd.start_y_read.get_untracked()).abs();

        // Start dragging if moved beyond threshold
        if dx > DRAG_THRESHOLD_PX || dy > DRAG_THRESHOLD_PX {
            dnd.dragging_write.set(Some(pending));
        }
    });

    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        let dragging = dnd.dragging_read.try_get_untracked().flatten();
        let slot = dnd.drop_slot_read.try_get_untracked().flatten();

        dnd.pending_write.try_set(None);
        match dragging {
            Some(origin) => {
                end_drag(&dnd);
                on_drop(DragEnd {
                    origin,
                    destination: slot,
                });
            }
            // Not dragging; the click event fires naturally on the element
            None => {
                dnd.drop_slot_write.try_set(None);
            }
        }
    });

    if let Some(doc) = web_sys::window().and_then(|w| w.document()) {
        let _ = doc.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
        let _ = doc.add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref());
    }

    GlobalListeners {
        on_mousemove,
        on_mouseup,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(container: &str, index: usize) -> DragOrigin {
        DragOrigin {
            item_id: "t1".into(),
            container_id: container.into(),
            index,
        }
    }

    #[test]
    fn test_end_slot_in_own_container() {
        assert_eq!(end_slot_index(&origin("todo", 0), "todo", 3), 2);
        assert_eq!(end_slot_index(&origin("todo", 0), "todo", 0), 0);
    }

    #[test]
    fn test_end_slot_in_other_container() {
        assert_eq!(end_slot_index(&origin("todo", 0), "done", 3), 3);
        assert_eq!(end_slot_index(&origin("todo", 0), "done", 0), 0);
    }
}
