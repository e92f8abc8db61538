//! Span helpers for chatmem operations

/// Span for one controller operation on a conversation.
///
/// # Example
///
/// ```rust
/// use chatmem_observability::conversation_span;
///
/// let span = conversation_span!("c-123", "send_message");
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! conversation_span {
    ($conversation_id:expr, $operation:expr) => {
        tracing::info_span!(
            "conversation.operation",
            conversation.id = %$conversation_id,
            operation = $operation,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        )
    };
}

/// Span for one remote generation call.
///
/// # Example
///
/// ```rust
/// use chatmem_observability::llm_span;
///
/// let span = llm_span!("primary", "reply");
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! llm_span {
    ($provider:expr, $purpose:expr) => {
        tracing::info_span!(
            "llm.call",
            llm.provider = %$provider,
            llm.purpose = $purpose,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        )
    };
}

/// Record an error on the current span and log it.
pub fn record_error<E: std::error::Error>(error: &E) {
    let span = tracing::Span::current();
    span.record("error", true);
    span.record("error.message", error.to_string());
    tracing::warn!(error = %error, "Operation failed");
}

/// Record a duration in milliseconds on the current span.
///
/// ```rust
/// use chatmem_observability::record_duration;
/// use std::time::Instant;
///
/// let start = Instant::now();
/// record_duration("duration_ms", start.elapsed());
/// ```
pub fn record_duration(key: &str, duration: std::time::Duration) {
    let span = tracing::Span::current();
    span.record(key, duration.as_millis() as u64);
}
