/// One-time numeric code generation
///
/// Generates the short codes mailed to users for account confirmation and
/// password reset. Codes are six decimal digits, easy to copy from an email
/// into a form. Persistence, purpose tagging, and expiry live in
/// [`crate::models::auth_token`].

use rand::Rng;

/// Length of a generated code, in digits
pub const CODE_LENGTH: usize = 6;

/// Generates a random six-digit one-time code
///
/// The code always has exactly six digits (leading digit is never zero).
///
/// # Example
///
/// ```
/// use taskhub_shared::auth::token::generate_code;
///
/// let code = generate_code();
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_digit()));
/// ```
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    rng.gen_range(100_000..1_000_000).to_string()
}
