//! Log Panel Component
//!
//! Recent log lines from the rolling logger, newest last.

use leptos::prelude::*;

use crate::components::Modal;

/// Lines shown in the panel
const PANEL_LINES: usize = 200;

fn tail(mut lines: Vec<String>, n: usize) -> Vec<String> {
    let skip = lines.len().saturating_sub(n);
    lines.drain(..skip);
    lines
}

#[component]
pub fn LogPanel(#[prop(into)] on_close: Callback<()>) -> impl IntoView {
    let (lines, set_lines) = signal(tail(rolling_logger::recent(), PANEL_LINES));
    let refresh = move |_| set_lines.set(tail(rolling_logger::recent(), PANEL_LINES));

    view! {
        <Modal title="Recent logs" on_close=on_close>
            <div class="log-panel">
                <button class="secondary-btn" on:click=refresh>"Refresh"</button>
                <Show
                    when=move || lines.with(|l| !l.is_empty())
                    fallback=|| view! { <div class="empty-state">"No log lines yet."</div> }
                >
                    <pre class="log-lines">{move || lines.get().join("\n")}</pre>
                </Show>
            </div>
        </Modal>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("line {}", i)).collect()
    }

    #[test]
    fn test_tail_keeps_newest_lines() {
        let kept = tail(lines(5), 2);
        assert_eq!(kept, vec!["line 3".to_string(), "line 4".to_string()]);
    }

    #[test]
    fn test_tail_of_short_buffer_is_whole_buffer() {
        assert_eq!(tail(lines(3), 10).len(), 3);
        assert!(tail(Vec::new(), 10).is_empty());
    }
}
