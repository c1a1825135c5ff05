// Workflow constants (operator-facing texts and artifact names)

/// Blocking alert after a failed match request
pub const MATCH_FAILED_ALERT: &str = "Failed to fetch match result.";

/// Login answered by the server but not accepted
pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";

/// Login could not be completed (unreachable server or non-2xx)
pub const LOGIN_FAILED: &str = "Login failed. Please try again.";

/// Delimited-text export file name
pub const CSV_FILE_NAME: &str = "match_result.csv";

/// Paginated-document export file name
pub const PDF_FILE_NAME: &str = "match_result.pdf";

/// Title of the paginated document
pub const PDF_TITLE: &str = "Resume Match Result";
