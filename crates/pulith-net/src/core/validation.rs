/// Returns `true` if the HTTP status code is in the 2xx range.
///
/// # Examples
///
/// ```
/// use pulith_net::core::is_success;
///
/// assert!(is_success(200));
/// assert!(is_success(204));
/// assert!(!is_success(304));
/// assert!(!is_success(503));
/// ```
pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Returns `true` if a response with this status should be attempted again.
///
/// Server faults (every 5xx) and 408 Request Timeout are retried. Other 4xx
/// codes are client faults and are surfaced immediately.
///
/// # Examples
///
/// ```
/// use pulith_net::core::is_retryable_status;
///
/// assert!(is_retryable_status(503));
/// assert!(is_retryable_status(408));
/// assert!(!is_retryable_status(404));
/// assert!(!is_retryable_status(200));
/// ```
pub fn is_retryable_status(status: u16) -> bool {
    status >= 500 || status == 408
}
