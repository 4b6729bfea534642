//! Event types streamed from a driven page (spec.md §4.1): JS dialogs,
//! console messages, and network responses. The Session Runner drains these
//! during a step's settle window and plugins observe them via the `dialog`,
//! `console`, and `network_response` hooks (spec.md §4.3).

#[derive(Clone, Debug)]
pub struct DialogEvent {
    pub kind: DialogKind,
    pub message: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DialogKind {
    Alert,
    Confirm,
    Prompt,
    BeforeUnload,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConsoleLevel {
    Log,
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug)]
pub struct ConsoleEvent {
    pub level: ConsoleLevel,
    pub message: String,
}

#[derive(Clone, Debug)]
pub struct NetworkResponseEvent {
    pub url: String,
    pub status: u16,
    pub response_time_ms: u64,
    pub body_length: Option<usize>,
}

#[derive(Clone, Debug)]
pub enum PageEvent {
    Dialog(DialogEvent),
    Console(ConsoleEvent),
    NetworkResponse(NetworkResponseEvent),
}
