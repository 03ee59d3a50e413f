//! Wizard runtime configuration.

use std::time::Duration;

/// Tunables for the orchestration layer. Defaults match the production
/// service; tests shrink the timers to keep runs fast.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Seconds before another verification code may be requested.
    pub resend_cooldown_secs: u32,
    /// Quiet period after the last email keystroke before probing
    /// availability.
    pub email_debounce: Duration,
    /// Duration of one cosmetic progress stage.
    pub stage_duration: Duration,
    /// Dwell on the "linked" confirmation before auto-advancing to Review.
    pub advance_dwell: Duration,
    /// How long a notification stays up before auto-dismissal.
    pub notification_lifetime: Duration,
    /// Delay between payment success and the external redirect.
    pub redirect_delay: Duration,
    /// Where a completed checkout lands.
    pub redirect_url: String,
    /// External storefront page for the empty-cart dead end.
    pub plans_url: String,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            resend_cooldown_secs: 30,
            email_debounce: Duration::from_millis(500),
            stage_duration: Duration::from_millis(800),
            advance_dwell: Duration::from_secs(2),
            notification_lifetime: Duration::from_secs(5),
            redirect_delay: Duration::from_secs(5),
            redirect_url: "/confirmation".to_string(),
            plans_url: "https://store.example.com/plans".to_string(),
        }
    }
}

#[cfg(test)]
impl WizardConfig {
    /// Millisecond-scale timers so async tests finish quickly.
    pub fn fast() -> Self {
        Self {
            resend_cooldown_secs: 1,
            email_debounce: Duration::from_millis(5),
            stage_duration: Duration::from_millis(5),
            advance_dwell: Duration::from_millis(5),
            notification_lifetime: Duration::from_millis(50),
            redirect_delay: Duration::from_millis(5),
            ..Self::default()
        }
    }
}
