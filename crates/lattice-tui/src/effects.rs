//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! Page animation is not an effect here: the page host is plain state and
//! the reducer drives it directly. Only process control and network I/O
//! leave the reducer.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Send the demo payload to the intercept sidecar.
    RunIntercept { payload_hex: String },
}
