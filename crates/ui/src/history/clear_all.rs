use std::time::Duration;

/// How long the error styling outlives a dismissed failure dialog.
pub const CLEARING_ERROR_RESET_DELAY: Duration = Duration::from_secs(2);

/// Identifies one scheduled error reset so stale timers can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResetTicket(pub u64);

impl ResetTicket {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Inputs to the "has history and not busy" guard on opening the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearAllGuard {
    pub has_history: bool,
    pub is_loading: bool,
}

impl ClearAllGuard {
    pub fn allows_clear_all(&self) -> bool {
        self.has_history && !self.is_loading
    }
}

/// "Clear all chat history" workflow.
///
/// A single tagged state replaces independent `dialog_visible`, `clearing` and
/// `clearing_error` flags, so combinations such as clearing-while-errored
/// cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClearAllState {
    #[default]
    Idle,
    ConfirmOpen,
    Clearing,
    Failed {
        detail: Option<String>,
    },
    /// Dialog closed after a failure; error styling lingers until the reset fires.
    Dismissed {
        ticket: ResetTicket,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearAllTransition {
    Open(ClearAllGuard),
    Confirm,
    Succeed,
    Fail { detail: Option<String> },
    Dismiss { ticket: ResetTicket },
    ResetError { ticket: ResetTicket },
}

/// Rejection reason for transitions the workflow refuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearAllRejection {
    NothingToClear,
    AnswerInProgress,
    DialogAlreadyOpen,
    DialogNotOpen,
    ClearingInProgress,
    NotClearing,
}

pub type ClearAllTransitionResult = Result<ClearAllState, ClearAllRejection>;

/// Boolean view of the workflow state for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearAllFlags {
    pub dialog_visible: bool,
    pub clearing: bool,
    pub clearing_error: bool,
}

impl ClearAllState {
    pub fn dialog_visible(&self) -> bool {
        matches!(
            self,
            Self::ConfirmOpen | Self::Clearing | Self::Failed { .. }
        )
    }

    pub fn is_clearing(&self) -> bool {
        matches!(self, Self::Clearing)
    }

    pub fn has_error(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Dismissed { .. })
    }

    pub fn flags(&self) -> ClearAllFlags {
        ClearAllFlags {
            dialog_visible: self.dialog_visible(),
            clearing: self.is_clearing(),
            clearing_error: self.has_error(),
        }
    }

    pub fn apply(&self, transition: ClearAllTransition) -> ClearAllTransitionResult {
        match transition {
            ClearAllTransition::Open(guard) => self.apply_open(guard),
            ClearAllTransition::Confirm => self.apply_confirm(),
            ClearAllTransition::Succeed => self.apply_settle(Self::Idle),
            ClearAllTransition::Fail { detail } => self.apply_settle(Self::Failed { detail }),
            ClearAllTransition::Dismiss { ticket } => self.apply_dismiss(ticket),
            ClearAllTransition::ResetError { ticket } => Ok(self.apply_reset(ticket)),
        }
    }

    fn apply_open(&self, guard: ClearAllGuard) -> ClearAllTransitionResult {
        match self {
            Self::Idle | Self::Dismissed { .. } => {
                if !guard.has_history {
                    return Err(ClearAllRejection::NothingToClear);
                }
                if guard.is_loading {
                    return Err(ClearAllRejection::AnswerInProgress);
                }
                // Reopening drops any pending reset; the dialog starts clean.
                Ok(Self::ConfirmOpen)
            }
            Self::Clearing => Err(ClearAllRejection::ClearingInProgress),
            Self::ConfirmOpen | Self::Failed { .. } => Err(ClearAllRejection::DialogAlreadyOpen),
        }
    }

    fn apply_confirm(&self) -> ClearAllTransitionResult {
        match self {
            Self::ConfirmOpen => Ok(Self::Clearing),
            Self::Clearing => Err(ClearAllRejection::ClearingInProgress),
            // The confirm button is hidden while errored.
            Self::Idle | Self::Failed { .. } | Self::Dismissed { .. } => {
                Err(ClearAllRejection::DialogNotOpen)
            }
        }
    }

    fn apply_settle(&self, next: Self) -> ClearAllTransitionResult {
        match self {
            Self::Clearing => Ok(next),
            _ => Err(ClearAllRejection::NotClearing),
        }
    }

    fn apply_dismiss(&self, ticket: ResetTicket) -> ClearAllTransitionResult {
        match self {
            Self::ConfirmOpen => Ok(Self::Idle),
            Self::Failed { .. } => Ok(Self::Dismissed { ticket }),
            Self::Clearing => Err(ClearAllRejection::ClearingInProgress),
            Self::Idle | Self::Dismissed { .. } => Err(ClearAllRejection::DialogNotOpen),
        }
    }

    fn apply_reset(&self, ticket: ResetTicket) -> Self {
        match self {
            Self::Dismissed { ticket: pending } if *pending == ticket => Self::Idle,
            // Stale timer from an earlier dismissal; nothing to reset.
            _ => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const READY: ClearAllGuard = ClearAllGuard {
        has_history: true,
        is_loading: false,
    };

    fn run(transitions: Vec<ClearAllTransition>) -> ClearAllTransitionResult {
        transitions
            .into_iter()
            .try_fold(ClearAllState::Idle, |state, transition| {
                state.apply(transition)
            })
    }

    #[test]
    fn guard_rejects_empty_history_and_loading() {
        let empty = ClearAllGuard {
            has_history: false,
            is_loading: false,
        };
        let loading = ClearAllGuard {
            has_history: true,
            is_loading: true,
        };

        assert_eq!(
            ClearAllState::Idle.apply(ClearAllTransition::Open(empty)),
            Err(ClearAllRejection::NothingToClear)
        );
        assert_eq!(
            ClearAllState::Idle.apply(ClearAllTransition::Open(loading)),
            Err(ClearAllRejection::AnswerInProgress)
        );
    }

    #[test]
    fn successful_clear_returns_to_idle_with_all_flags_down() {
        let state = run(vec![
            ClearAllTransition::Open(READY),
            ClearAllTransition::Confirm,
            ClearAllTransition::Succeed,
        ])
        .expect("happy path");

        assert_eq!(state, ClearAllState::Idle);
        assert_eq!(state.flags(), ClearAllFlags::default());
    }

    #[test]
    fn clearing_rejects_everything_but_settlement() {
        let clearing = ClearAllState::Clearing;

        assert_eq!(
            clearing.apply(ClearAllTransition::Confirm),
            Err(ClearAllRejection::ClearingInProgress)
        );
        assert_eq!(
            clearing.apply(ClearAllTransition::Dismiss {
                ticket: ResetTicket::new(1)
            }),
            Err(ClearAllRejection::ClearingInProgress)
        );
        assert_eq!(
            clearing.apply(ClearAllTransition::Open(READY)),
            Err(ClearAllRejection::ClearingInProgress)
        );
        assert_eq!(
            clearing.flags(),
            ClearAllFlags {
                dialog_visible: true,
                clearing: true,
                clearing_error: false,
            }
        );
    }

    #[test]
    fn failure_keeps_dialog_open_then_dismiss_lingers_until_matching_reset() {
        let failed = run(vec![
            ClearAllTransition::Open(READY),
            ClearAllTransition::Confirm,
            ClearAllTransition::Fail {
                detail: Some("status 500".to_string()),
            },
        ])
        .expect("failure path");
        assert!(failed.dialog_visible());
        assert!(failed.has_error());
        assert_eq!(
            failed.apply(ClearAllTransition::Confirm),
            Err(ClearAllRejection::DialogNotOpen)
        );

        let dismissed = failed
            .apply(ClearAllTransition::Dismiss {
                ticket: ResetTicket::new(3),
            })
            .expect("dismiss");
        assert!(!dismissed.dialog_visible());
        assert!(dismissed.has_error());

        let stale = dismissed
            .apply(ClearAllTransition::ResetError {
                ticket: ResetTicket::new(2),
            })
            .expect("stale reset is ignored");
        assert_eq!(stale, dismissed);

        let reset = dismissed
            .apply(ClearAllTransition::ResetError {
                ticket: ResetTicket::new(3),
            })
            .expect("reset");
        assert_eq!(reset, ClearAllState::Idle);
    }

    #[test]
    fn reopening_before_reset_starts_clean() {
        let reopened = ClearAllState::Dismissed {
            ticket: ResetTicket::new(1),
        }
        .apply(ClearAllTransition::Open(READY))
        .expect("reopen");

        assert_eq!(reopened, ClearAllState::ConfirmOpen);
        assert!(!reopened.has_error());
    }

    #[test]
    fn settlement_outside_clearing_is_rejected() {
        assert_eq!(
            ClearAllState::ConfirmOpen.apply(ClearAllTransition::Succeed),
            Err(ClearAllRejection::NotClearing)
        );
        assert_eq!(
            ClearAllState::Idle.apply(ClearAllTransition::Fail { detail: None }),
            Err(ClearAllRejection::NotClearing)
        );
    }
}
