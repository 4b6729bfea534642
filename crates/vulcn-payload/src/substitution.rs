//! Payload substitution: a pure function over (focus step, payload) that
//! returns the concrete step(s) to execute (spec.md §4.2, component C2).
//!
//! Grounded in `action-primitives`'s per-primitive pure-function convention
//! (`primitives/navigate.rs`'s validate -> transform -> report shape,
//! minus the I/O) and reuses `vulcn_driver::url_injection`'s rewrite logic
//! so the Driver and the substitution function never disagree about how a
//! query string is rewritten.

use vulcn_driver::url_injection::inject_query_param;
use vulcn_types::{Step, StepKind};

use crate::error::PayloadError;

/// Output of substituting a payload into a focus step. Most cases produce a
/// single step to execute; the "navigate without param" case expands into a
/// short fixed sequence (spec.md §4.2).
#[derive(Clone, Debug)]
pub enum Substituted {
    Single(Step),
    Sequence(Vec<Step>),
}

impl Substituted {
    pub fn steps(&self) -> Vec<&Step> {
        match self {
            Substituted::Single(s) => vec![s],
            Substituted::Sequence(steps) => steps.iter().collect(),
        }
    }
}

/// Substitute `payload` into `focus`. `focus` must be injectable
/// (`Step::is_injectable()`); callers are expected to have already checked
/// this during session iteration (spec.md §4.4).
pub fn substitute(focus: &Step, payload: &str) -> Result<Substituted, PayloadError> {
    match &focus.kind {
        StepKind::Navigate {
            url,
            injectable_param: Some(param),
            ..
        } => {
            let rewritten = inject_query_param(url, param, payload)?;
            Ok(Substituted::Single(Step {
                id: focus.id.clone(),
                kind: StepKind::Navigate {
                    url: rewritten,
                    injectable_param: Some(param.clone()),
                    form_field: None,
                },
            }))
        }
        StepKind::Navigate {
            url,
            injectable_param: None,
            form_field: Some(field),
        } => {
            let navigate = Step {
                id: focus.id.clone(),
                kind: StepKind::Navigate {
                    url: url.clone(),
                    injectable_param: None,
                    form_field: Some(field.clone()),
                },
            };
            let input = Step::new(StepKind::Input {
                selector: crate::selector::resolve_field_selector(field),
                value: payload.to_string(),
                injectable: true,
            });
            let submit = Step::new(StepKind::Click {
                selector: vulcn_driver::url_injection::submit_selector().to_string(),
            });
            Ok(Substituted::Sequence(vec![navigate, input, submit]))
        }
        StepKind::Navigate {
            injectable_param: None,
            form_field: None,
            ..
        } => Err(PayloadError::NotInjectable),
        StepKind::Input {
            selector,
            injectable: true,
            ..
        } => Ok(Substituted::Single(Step {
            id: focus.id.clone(),
            kind: StepKind::Input {
                selector: selector.clone(),
                value: payload.to_string(),
                injectable: true,
            },
        })),
        StepKind::Input { .. } | StepKind::Click { .. } | StepKind::Wait(_) | StepKind::Assert(_) => {
            Err(PayloadError::NotInjectable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vulcn_types::WaitSpec;

    fn navigate_with_param() -> Step {
        Step::new(StepKind::Navigate {
            url: "https://example.com/search?q=a&page=1".to_string(),
            injectable_param: Some("q".to_string()),
            form_field: None,
        })
    }

    #[test]
    fn rewrites_query_param_preserving_id() {
        let focus = navigate_with_param();
        let substituted = substitute(&focus, "<script>alert(1)</script>").unwrap();
        match substituted {
            Substituted::Single(step) => {
                assert_eq!(step.id, focus.id);
                match step.kind {
                    StepKind::Navigate { url, .. } => {
                        assert!(url.contains("page=1"));
                        assert!(url.contains("q=%3Cscript%3E"));
                    }
                    _ => panic!("expected navigate"),
                }
            }
            _ => panic!("expected single step"),
        }
    }

    #[test]
    fn promotes_navigate_without_param_to_sequence() {
        let focus = Step::new(StepKind::Navigate {
            url: "https://example.com/contact".to_string(),
            injectable_param: None,
            form_field: Some("message".to_string()),
        });
        let substituted = substitute(&focus, "payload").unwrap();
        match substituted {
            Substituted::Sequence(steps) => assert_eq!(steps.len(), 3),
            _ => panic!("expected sequence"),
        }
    }

    #[test]
    fn rejects_non_injectable_step() {
        let focus = Step::new(StepKind::Wait(WaitSpec {
            selector: None,
            timeout_ms: 100,
        }));
        assert!(matches!(substitute(&focus, "x"), Err(PayloadError::NotInjectable)));
    }

    #[test]
    fn substitutes_injectable_input() {
        let focus = Step::new(StepKind::Input {
            selector: "input[name='comment']".to_string(),
            value: "hello".to_string(),
            injectable: true,
        });
        let substituted = substitute(&focus, "' OR 1=1--").unwrap();
        match substituted {
            Substituted::Single(step) => match step.kind {
                StepKind::Input { value, .. } => assert_eq!(value, "' OR 1=1--"),
                _ => panic!("expected input"),
            },
            _ => panic!("expected single step"),
        }
    }
}
