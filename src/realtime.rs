//! Realtime Link
//!
//! Board notification socket. Reconnects with exponential backoff until
//! closed, and re-joins the current board after every reconnect.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use board_core::realtime::Backoff;
use board_core::{ClientFrame, ServerEvent};
use gloo_timers::future::TimeoutFuture;
use leptos::task::spawn_local;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

type EventHandler = Rc<dyn Fn(ServerEvent)>;

struct Handlers {
    _on_open: Closure<dyn FnMut(Event)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
}

struct LinkState {
    url: String,
    socket: Option<WebSocket>,
    handlers: Option<Handlers>,
    joined: Option<String>,
    backoff: Backoff,
    closed: bool,
    on_event: EventHandler,
}

pub struct RealtimeLink {
    state: Rc<RefCell<LinkState>>,
}

impl RealtimeLink {
    pub fn connect(url: String, on_event: impl Fn(ServerEvent) + 'static) -> Self {
        let state = Rc::new(RefCell::new(LinkState {
            url,
            socket: None,
            handlers: None,
            joined: None,
            backoff: Backoff::new(),
            closed: false,
            on_event: Rc::new(on_event),
        }));
        open_socket(&state);
        Self { state }
    }

    pub fn join_board(&self, board_id: &str) {
        let previous = self.state.borrow_mut().joined.replace(board_id.to_string());
        if let Some(previous) = previous.filter(|p| p != board_id) {
            send(&self.state, &ClientFrame::LeaveBoard(previous));
        }
        send(&self.state, &ClientFrame::JoinBoard(board_id.to_string()));
    }

    pub fn leave_board(&self, board_id: &str) {
        let was_joined = {
            let mut state = self.state.borrow_mut();
            if state.joined.as_deref() == Some(board_id) {
                state.joined = None;
                true
            } else {
                false
            }
        };
        if was_joined {
            send(&self.state, &ClientFrame::LeaveBoard(board_id.to_string()));
        }
    }
}

impl Drop for RealtimeLink {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.closed = true;
        if let Some(socket) = state.socket.take() {
            // handlers are freed below; the browser must not call them again
            socket.set_onopen(None);
            socket.set_onmessage(None);
            socket.set_onclose(None);
            let _ = socket.close();
        }
        state.handlers = None;
    }
}

fn send(state: &Rc<RefCell<LinkState>>, frame: &ClientFrame) {
    let state = state.borrow();
    if let Some(socket) = state.socket.as_ref().filter(|s| s.ready_state() == WebSocket::OPEN) {
        if let Err(e) = socket.send_with_str(&frame.to_json()) {
            log::warn!("[SOCKET] send failed: {:?}", e);
        }
    }
}

fn open_socket(state: &Rc<RefCell<LinkState>>) {
    let url = state.borrow().url.clone();
    let socket = match WebSocket::new(&url) {
        Ok(socket) => socket,
        Err(e) => {
            log::warn!("[SOCKET] failed to connect: {:?}", e);
            schedule_reconnect(Rc::downgrade(state));
            return;
        }
    };

    let weak = Rc::downgrade(state);
    let on_open = Closure::<dyn FnMut(Event)>::new(move |_ev: Event| {
        let Some(state) = weak.upgrade() else { return };
        log::info!("[SOCKET] connected");
        let joined = {
            let mut s = state.borrow_mut();
            s.backoff.reset();
            s.joined.clone()
        };
        if let Some(board_id) = joined {
            send(&state, &ClientFrame::JoinBoard(board_id));
        }
    });

    let weak = Rc::downgrade(state);
    let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |ev: MessageEvent| {
        let Some(state) = weak.upgrade() else { return };
        let Some(text) = ev.data().as_string() else { return };
        if let Some(event) = ServerEvent::parse(&text) {
            let handler = state.borrow().on_event.clone();
            handler(event);
        }
    });

    let weak = Rc::downgrade(state);
    let on_close = Closure::<dyn FnMut(CloseEvent)>::new(move |ev: CloseEvent| {
        log::info!("[SOCKET] disconnected: code {}", ev.code());
        schedule_reconnect(weak.clone());
    });

    socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
    socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

    let mut s = state.borrow_mut();
    s.socket = Some(socket);
    s.handlers = Some(Handlers {
        _on_open: on_open,
        _on_message: on_message,
        _on_close: on_close,
    });
}

fn schedule_reconnect(weak: Weak<RefCell<LinkState>>) {
    let delay = match weak.upgrade() {
        Some(state) => {
            let mut s = state.borrow_mut();
            if s.closed {
                return;
            }
            s.backoff.next_delay()
        }
        None => return,
    };
    log::debug!("[SOCKET] reconnecting in {:?}", delay);
    spawn_local(async move {
        TimeoutFuture::new(delay.as_millis() as u32).await;
        if let Some(state) = weak.upgrade() {
            if !state.borrow().closed {
                open_socket(&state);
            }
        }
    });
}
