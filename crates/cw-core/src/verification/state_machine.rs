//! Phone verification state machine.
//!
//! Pure transition function `(state, event) -> (new_state, actions[])`;
//! API calls, the cooldown ticker and code-input clearing are actions
//! executed by the application layer.
//!
//! ```text
//! Idle
//!  │ SendRequested (phone valid)
//!  ▼
//! Sending
//!  ├── SendAccepted ──► CodeSent{cooldown}
//!  │                      │
//!  │                      ├── CodeChanged(6 digits) ──► Verifying
//!  │                      │                              ├── ConfirmAccepted ─► Verified
//!  │                      │                              └── ConfirmRejected ─► CodeSent{error}
//!  │                      └── ResendRequested (cooldown 0) ─► Sending
//!  └── SendRejected ──► Failed{reason}
//!
//! Any state + PhoneChanged ──► Idle
//! ```

use serde::{Deserialize, Serialize};

const RESEND_COOLDOWN_SECS: u32 = 30;
const CODE_LEN: usize = 6;

/// Verification lifecycle state for the phone on the personal-info step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationState {
    /// No challenge requested.
    Idle,

    /// Send (or resend) request in flight.
    Sending,

    /// A code was delivered; waiting for the user to type it.
    CodeSent {
        /// Seconds left before another resend is allowed. Presentational
        /// countdown only; code entry is never blocked by it.
        cooldown: u32,
        /// Error text from a rejected confirmation attempt, if any.
        error: Option<String>,
    },

    /// Confirmation request in flight.
    Verifying { cooldown: u32 },

    /// Terminal for this phone number.
    Verified,

    /// The initiation request was rejected or failed; retry is allowed.
    Failed { reason: String },
}

impl Default for VerificationState {
    fn default() -> Self {
        Self::Idle
    }
}

impl VerificationState {
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }

    /// A challenge was requested and is still pending confirmation.
    pub fn code_requested(&self) -> bool {
        matches!(self, Self::CodeSent { .. } | Self::Verifying { .. })
    }

    /// A request is currently in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Sending | Self::Verifying { .. })
    }

    pub fn resend_allowed(&self) -> bool {
        matches!(self, Self::CodeSent { cooldown: 0, .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationEvent {
    /// User asked for a code. Carries the result of the country phone
    /// rule so the machine stays pure.
    SendRequested { phone_valid: bool },

    /// Initiation API accepted the request.
    SendAccepted,

    /// Initiation API rejected the request or transport failed.
    SendRejected { message: String },

    /// The code input changed; exactly six digits auto-submits.
    CodeChanged { code: String },

    /// Confirmation API accepted the code.
    ConfirmAccepted,

    /// Confirmation API rejected the code or transport failed.
    ConfirmRejected { message: String },

    /// User asked for another code.
    ResendRequested,

    /// One second of resend cooldown elapsed.
    CooldownTick,

    /// Phone number or country changed; everything is invalidated.
    PhoneChanged,
}

/// Side effects produced by transitions, executed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationAction {
    CallSendCode,
    CallResendCode,
    CallVerifyCode { code: String },
    StartCooldown { seconds: u32 },
    CancelCooldown,
    /// Tell the input surface to clear the entered code.
    ClearCode,
}

#[derive(Debug, Clone)]
pub struct VerificationPolicy {
    /// Resend cooldown in seconds.
    pub cooldown_secs: u32,
    /// Code length that triggers auto-submission.
    pub code_len: usize,
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self {
            cooldown_secs: RESEND_COOLDOWN_SECS,
            code_len: CODE_LEN,
        }
    }
}

/// Pure verification state machine.
#[derive(Debug, Clone, Default)]
pub struct VerificationStateMachine {
    policy: VerificationPolicy,
}

impl VerificationStateMachine {
    pub fn new(policy: VerificationPolicy) -> Self {
        Self { policy }
    }

    pub fn transition(
        &self,
        state: VerificationState,
        event: VerificationEvent,
    ) -> (VerificationState, Vec<VerificationAction>) {
        use VerificationAction as A;
        use VerificationEvent as E;
        use VerificationState as S;

        match (state, event) {
            // Phone or country mutation invalidates everything, including
            // a completed verification.
            (_, E::PhoneChanged) => (S::Idle, vec![A::CancelCooldown, A::ClearCode]),

            (S::Idle | S::Failed { .. }, E::SendRequested { phone_valid: true }) => {
                (S::Sending, vec![A::CallSendCode])
            }
            (state @ (S::Idle | S::Failed { .. }), E::SendRequested { phone_valid: false }) => {
                (state, Vec::new())
            }

            (S::Sending, E::SendAccepted) => (
                S::CodeSent {
                    cooldown: self.policy.cooldown_secs,
                    error: None,
                },
                vec![A::StartCooldown {
                    seconds: self.policy.cooldown_secs,
                }],
            ),
            (S::Sending, E::SendRejected { message }) => (S::Failed { reason: message }, Vec::new()),

            (S::CodeSent { cooldown, error }, E::CodeChanged { code }) => {
                if code.len() == self.policy.code_len
                    && code.chars().all(|c| c.is_ascii_digit())
                {
                    (S::Verifying { cooldown }, vec![A::CallVerifyCode { code }])
                } else {
                    (S::CodeSent { cooldown, error }, Vec::new())
                }
            }

            (S::Verifying { .. }, E::ConfirmAccepted) => (S::Verified, vec![A::CancelCooldown]),
            (S::Verifying { cooldown }, E::ConfirmRejected { message }) => (
                S::CodeSent {
                    cooldown,
                    error: Some(message),
                },
                vec![A::ClearCode],
            ),

            (S::CodeSent { cooldown: 0, .. }, E::ResendRequested) => {
                (S::Sending, vec![A::CallResendCode, A::ClearCode])
            }

            (S::CodeSent { cooldown, error }, E::CooldownTick) => (
                S::CodeSent {
                    cooldown: cooldown.saturating_sub(1),
                    error,
                },
                Vec::new(),
            ),
            (S::Verifying { cooldown }, E::CooldownTick) => (
                S::Verifying {
                    cooldown: cooldown.saturating_sub(1),
                },
                Vec::new(),
            ),

            // Stale or out-of-order events are no-ops.
            (state, _event) => (state, Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> VerificationStateMachine {
        VerificationStateMachine::default()
    }

    #[test]
    fn send_requires_valid_phone() {
        let (state, actions) = machine().transition(
            VerificationState::Idle,
            VerificationEvent::SendRequested { phone_valid: false },
        );
        assert_eq!(state, VerificationState::Idle);
        assert!(actions.is_empty());

        let (state, actions) = machine().transition(
            VerificationState::Idle,
            VerificationEvent::SendRequested { phone_valid: true },
        );
        assert_eq!(state, VerificationState::Sending);
        assert_eq!(actions, vec![VerificationAction::CallSendCode]);
    }

    #[test]
    fn accepted_send_starts_cooldown() {
        let (state, actions) =
            machine().transition(VerificationState::Sending, VerificationEvent::SendAccepted);
        assert_eq!(
            state,
            VerificationState::CodeSent {
                cooldown: RESEND_COOLDOWN_SECS,
                error: None
            }
        );
        assert_eq!(
            actions,
            vec![VerificationAction::StartCooldown {
                seconds: RESEND_COOLDOWN_SECS
            }]
        );
    }

    #[test]
    fn rejected_send_allows_retry() {
        let (state, _) = machine().transition(
            VerificationState::Sending,
            VerificationEvent::SendRejected {
                message: "rate limited".into(),
            },
        );
        assert_eq!(
            state,
            VerificationState::Failed {
                reason: "rate limited".into()
            }
        );

        let (state, actions) = machine().transition(
            state,
            VerificationEvent::SendRequested { phone_valid: true },
        );
        assert_eq!(state, VerificationState::Sending);
        assert_eq!(actions, vec![VerificationAction::CallSendCode]);
    }

    #[test]
    fn six_digits_auto_submit() {
        let sent = VerificationState::CodeSent {
            cooldown: 25,
            error: None,
        };
        let (state, actions) = machine().transition(
            sent.clone(),
            VerificationEvent::CodeChanged {
                code: "12345".into(),
            },
        );
        assert_eq!(state, sent);
        assert!(actions.is_empty());

        let (state, actions) = machine().transition(
            sent,
            VerificationEvent::CodeChanged {
                code: "123456".into(),
            },
        );
        assert_eq!(state, VerificationState::Verifying { cooldown: 25 });
        assert_eq!(
            actions,
            vec![VerificationAction::CallVerifyCode {
                code: "123456".into()
            }]
        );
    }

    #[test]
    fn non_numeric_code_never_submits() {
        let sent = VerificationState::CodeSent {
            cooldown: 0,
            error: None,
        };
        let (state, actions) = machine().transition(
            sent.clone(),
            VerificationEvent::CodeChanged {
                code: "12a456".into(),
            },
        );
        assert_eq!(state, sent);
        assert!(actions.is_empty());
    }

    #[test]
    fn rejected_confirmation_keeps_code_sent_and_clears_code() {
        let (state, actions) = machine().transition(
            VerificationState::Verifying { cooldown: 10 },
            VerificationEvent::ConfirmRejected {
                message: "Invalid verification code".into(),
            },
        );
        assert_eq!(
            state,
            VerificationState::CodeSent {
                cooldown: 10,
                error: Some("Invalid verification code".into())
            }
        );
        assert_eq!(actions, vec![VerificationAction::ClearCode]);
    }

    #[test]
    fn accepted_confirmation_is_terminal() {
        let (state, actions) = machine().transition(
            VerificationState::Verifying { cooldown: 10 },
            VerificationEvent::ConfirmAccepted,
        );
        assert_eq!(state, VerificationState::Verified);
        assert_eq!(actions, vec![VerificationAction::CancelCooldown]);
        assert!(state.is_verified());

        // A late code change does nothing.
        let (state, actions) = machine().transition(
            state,
            VerificationEvent::CodeChanged {
                code: "000000".into(),
            },
        );
        assert_eq!(state, VerificationState::Verified);
        assert!(actions.is_empty());
    }

    #[test]
    fn resend_blocked_until_cooldown_expires() {
        let sent = VerificationState::CodeSent {
            cooldown: 3,
            error: None,
        };
        let (state, actions) = machine().transition(sent, VerificationEvent::ResendRequested);
        assert_eq!(
            state,
            VerificationState::CodeSent {
                cooldown: 3,
                error: None
            }
        );
        assert!(actions.is_empty());

        let mut state = state;
        for _ in 0..3 {
            let (next, _) = machine().transition(state, VerificationEvent::CooldownTick);
            state = next;
        }
        assert!(state.resend_allowed());

        let (state, actions) = machine().transition(state, VerificationEvent::ResendRequested);
        assert_eq!(state, VerificationState::Sending);
        assert_eq!(
            actions,
            vec![
                VerificationAction::CallResendCode,
                VerificationAction::ClearCode
            ]
        );
    }

    #[test]
    fn phone_change_invalidates_any_state() {
        for state in [
            VerificationState::Sending,
            VerificationState::CodeSent {
                cooldown: 12,
                error: None,
            },
            VerificationState::Verified,
        ] {
            let (next, actions) = machine().transition(state, VerificationEvent::PhoneChanged);
            assert_eq!(next, VerificationState::Idle);
            assert_eq!(
                actions,
                vec![
                    VerificationAction::CancelCooldown,
                    VerificationAction::ClearCode
                ]
            );
        }
    }

    #[test]
    fn cooldown_tick_saturates_at_zero() {
        let (state, _) = machine().transition(
            VerificationState::CodeSent {
                cooldown: 0,
                error: None,
            },
            VerificationEvent::CooldownTick,
        );
        assert_eq!(
            state,
            VerificationState::CodeSent {
                cooldown: 0,
                error: None
            }
        );
    }
}
