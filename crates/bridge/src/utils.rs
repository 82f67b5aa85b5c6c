//! Utility macros used internally by the bridge.

/// Returns early with `$error` when `$predicate` does not hold.
///
/// Like `assert!`, but for validation paths that must fail with an error instead of panicking.
///
/// # Example
///
/// ```ignore
/// ensure!(rest.starts_with(CRLF), BridgeError::invalid_multipart("expected line break"));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
