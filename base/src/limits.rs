/// Validation limits for REST list requests and payloads.
/// Maximum number of items to return in a single list request
pub const MAX_LIMIT: i32 = 1000;

/// Maximum offset value for pagination
pub const MAX_OFFSET: i64 = 10000;

/// Number of invitation emails accepted in one request
pub const MIN_INVITATION_EMAILS: usize = 1;
pub const MAX_INVITATION_EMAILS: usize = 10;

/// Maximum length of a new password field
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Minimum length accepted by password validation
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Random bytes used for oauth application credentials
pub const CLIENT_ID_BYTES: usize = 75;
pub const CLIENT_SECRET_BYTES: usize = 190;

/// Random bytes of issued access and refresh tokens
pub const ACCESS_TOKEN_BYTES: usize = 32;
