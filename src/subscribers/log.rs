//! # LogWriter — simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos; production code should subscribe its own
//! handler or rely on the crate's `tracing` output.
//!
//! ## Example output
//! ```text
//! [todo.added] seq=0 payload={"title":"milk"}
//! [state.changed] seq=1 payload={"key":"count","value":1}
//! [state.reset] seq=2 payload={}
//! ```

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default, Debug)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders one event the way [`LogWriter`] prints it.
    pub fn format(e: &Event) -> String {
        format!("[{}] seq={} payload={}", e.context, e.seq, e.payload.value())
    }
}

impl Subscribe for LogWriter {
    fn on_event(&self, e: &Event) {
        println!("{}", Self::format(e));
    }

    fn name(&self) -> &str {
        "LogWriter"
    }
}
