/// Outbound mail delivery
///
/// Account confirmation and password reset codes are delivered out of band.
/// This implementation writes the messages to the log instead of talking to
/// an SMTP relay, which is all local development and the test suite need.
/// The handlers only depend on the [`Mailer`] type, so swapping in a real
/// transport is a local change.

use tracing::info;

/// Sends transactional email to users
#[derive(Debug, Clone, Default)]
pub struct Mailer;

impl Mailer {
    /// Creates a new mailer
    pub fn new() -> Self {
        Self
    }

    /// Sends the account confirmation code to a freshly registered user
    pub fn send_confirmation_email(&self, name: &str, email: &str, code: &str) {
        info!(
            recipient = %email,
            "Confirmation email for {}: your TaskHub confirmation code is {}",
            name,
            code
        );
    }

    /// Sends a password reset code
    pub fn send_password_reset_email(&self, name: &str, email: &str, code: &str) {
        info!(
            recipient = %email,
            "Password reset email for {}: your TaskHub reset code is {}",
            name,
            code
        );
    }
}
