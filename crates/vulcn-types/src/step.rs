//! The `Step` data model (spec.md §3).

use crate::ids::StepId;

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct WaitSpec {
    pub selector: Option<String>,
    pub timeout_ms: u64,
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum AssertKind {
    UrlContains(String),
    TitleContains(String),
    SelectorPresent(String),
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct AssertSpec {
    pub kind: AssertKind,
}

/// One action a `Session` performs. `Navigate`/`Input`/`Click` are the three
/// injectable action kinds; `wait`/`assert` are bookkeeping steps that never
/// carry a payload.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum StepKind {
    Navigate {
        url: String,
        /// Query-string parameter name this step injects into, if any.
        injectable_param: Option<String>,
        /// Form field to fill and submit when this navigate has no query
        /// parameter to inject into but still targets a form-post flow
        /// (spec.md §4.2, "navigate without param" case).
        form_field: Option<String>,
    },
    Input {
        selector: String,
        value: String,
        injectable: bool,
    },
    Click {
        selector: String,
    },
    Wait(WaitSpec),
    Assert(AssertSpec),
}

impl StepKind {
    /// A step is injectable if a payload can be substituted into it (spec §4.2).
    pub fn is_injectable(&self) -> bool {
        match self {
            StepKind::Navigate {
                injectable_param,
                form_field,
                ..
            } => injectable_param.is_some() || form_field.is_some(),
            StepKind::Input { injectable, .. } => *injectable,
            StepKind::Click { .. } | StepKind::Wait(_) | StepKind::Assert(_) => false,
        }
    }
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub id: StepId,
    pub kind: StepKind,
}

impl Step {
    pub fn new(kind: StepKind) -> Self {
        Self {
            id: StepId::new(),
            kind,
        }
    }

    pub fn is_injectable(&self) -> bool {
        self.kind.is_injectable()
    }
}
