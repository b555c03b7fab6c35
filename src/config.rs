/// Centralized configuration constants
/// Single source of truth for app defaults

/// Default contacts directory server URL
pub const DEFAULT_SERVER_URL: &str = "https://rolodex-directory.deno.dev";

/// Default command used to hand tel:/sms:/mailto: URIs to the desktop
pub const DEFAULT_OPENER_COMMAND: &str = "xdg-open";

/// App name
pub const APP_NAME: &str = "Rolodex";

/// App version
pub const APP_VERSION: &str = "0.1.0";

// Pre-filled composer content

/// Placeholder body for the text composer
pub const TEXT_MESSAGE_BODY: &str = "Message Body";

/// Fixed subject for the mail composer
pub const MAIL_SUBJECT: &str = "E-mail...";

/// Fixed body for the mail composer
pub const MAIL_BODY: &str = "Hiiii";

// Alert messages shown by the detail screen

pub const ALERT_REQUEST_FAILED: &str = "Request failed!";
pub const ALERT_INVALID_RESPONSE: &str = "Invalid Response!";
pub const ALERT_PHONE_UNAVAILABLE: &str = "Phone number not available!";
pub const ALERT_CANT_CALL: &str = "Can't make phone call!";
pub const ALERT_CANT_TEXT: &str = "Can't send message!";
pub const ALERT_TEXT_FAILED: &str = "Can't send Message!";
pub const ALERT_EMAIL_UNAVAILABLE: &str = "Email not available!";
pub const ALERT_CANT_MAIL: &str = "Can't send Mail!";
