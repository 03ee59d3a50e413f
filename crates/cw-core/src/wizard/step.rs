use serde::{Deserialize, Serialize};

use crate::verification::VerificationState;

/// The five wizard steps, strictly linear going forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Step {
    Personal,
    Account,
    Plan,
    Review,
    Payment,
}

impl Step {
    /// 1-based position for progress indicators.
    pub fn number(self) -> u8 {
        match self {
            Self::Personal => 1,
            Self::Account => 2,
            Self::Plan => 3,
            Self::Review => 4,
            Self::Payment => 5,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Personal => "Personal Info",
            Self::Account => "Account",
            Self::Plan => "Plan",
            Self::Review => "Review",
            Self::Payment => "Payment",
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Self::Personal => Some(Self::Account),
            Self::Account => Some(Self::Plan),
            Self::Plan => Some(Self::Review),
            Self::Review => Some(Self::Payment),
            Self::Payment => None,
        }
    }

    /// The step a "back" action lands on. Review deliberately skips the
    /// automated Plan step and returns to Account.
    pub fn back_target(self) -> Option<Self> {
        match self {
            Self::Personal => None,
            Self::Account => Some(Self::Personal),
            Self::Plan => Some(Self::Account),
            Self::Review => Some(Self::Account),
            Self::Payment => Some(Self::Review),
        }
    }
}

/// The three modes of the personal step's primary button.
///
/// Derived from the verification state rather than ad hoc boolean
/// combinations: the button first requests a code, then submits one, and
/// only advances once the phone is verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonalPrimaryAction {
    SendCode,
    SubmitCode,
    Continue,
}

pub fn personal_primary_action(verification: &VerificationState) -> PersonalPrimaryAction {
    if verification.is_verified() {
        PersonalPrimaryAction::Continue
    } else if verification.code_requested() {
        PersonalPrimaryAction::SubmitCode
    } else {
        PersonalPrimaryAction::SendCode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_linear() {
        assert_eq!(Step::Personal.next(), Some(Step::Account));
        assert_eq!(Step::Payment.next(), None);
        assert_eq!(Step::Personal.number(), 1);
        assert_eq!(Step::Payment.number(), 5);
    }

    #[test]
    fn review_backs_out_to_account_not_plan() {
        assert_eq!(Step::Review.back_target(), Some(Step::Account));
        assert_eq!(Step::Payment.back_target(), Some(Step::Review));
        assert_eq!(Step::Personal.back_target(), None);
    }

    #[test]
    fn primary_action_follows_verification_state() {
        assert_eq!(
            personal_primary_action(&VerificationState::Idle),
            PersonalPrimaryAction::SendCode
        );
        assert_eq!(
            personal_primary_action(&VerificationState::CodeSent {
                cooldown: 10,
                error: None
            }),
            PersonalPrimaryAction::SubmitCode
        );
        assert_eq!(
            personal_primary_action(&VerificationState::Verified),
            PersonalPrimaryAction::Continue
        );
    }
}
