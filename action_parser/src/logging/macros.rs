//! Logging macros
//!
//! Every macro takes optional trailing `"key" => value` pairs; values only
//! need `Display`. Events go through `logging::dispatch_event`, which stamps
//! the active action source and clips the message.

/// Attach `"key" => value` pairs to an event
#[doc(hidden)]
#[macro_export]
macro_rules! __log_event_with {
    ($event:expr $(, $key:expr => $value:expr)*) => {{
        #[allow(unused_mut)]
        let mut event = $event;
        $(
            event = event.with_context($key, &$value.to_string());
        )*
        event
    }};
}

/// Error with a code, an optional `span = ...`, and context
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::dispatch_event($crate::__log_event_with!(
            $crate::logging::LogEvent::error($code, $message).with_span($span)
            $(, $key => $value)*
        ))
    };

    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::dispatch_event($crate::__log_event_with!(
            $crate::logging::LogEvent::error($code, $message)
            $(, $key => $value)*
        ))
    };
}

/// Info event carrying a success code
#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::dispatch_event($crate::__log_event_with!(
            $crate::logging::LogEvent::success($code, $message)
            $(, $key => $value)*
        ))
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::dispatch_event($crate::__log_event_with!(
            $crate::logging::LogEvent::info($message)
            $(, $key => $value)*
        ))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::dispatch_event($crate::__log_event_with!(
            $crate::logging::LogEvent::warning($message)
            $(, $key => $value)*
        ))
    };
}

/// Debug event; nothing is formatted unless a sink accepts debug events
#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::debug_enabled() {
            $crate::logging::dispatch_event($crate::__log_event_with!(
                $crate::logging::LogEvent::debug($message)
                $(, $key => $value)*
            ))
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::codes;
    use crate::utils::{Position, Span};

    #[test]
    fn test_context_pairs_are_attached_in_display_form() {
        let span = Span::new(Position::new(3, 1, 4), Position::new(4, 1, 5));
        let event = __log_event_with!(
            crate::logging::LogEvent::error(codes::syntax::STRUCTURAL_MISMATCH, "expected ')'")
                .with_span(span),
            "found" => "end of input",
            "position" => 3
        );

        assert_eq!(event.context.get("found").map(String::as_str), Some("end of input"));
        assert_eq!(event.context.get("position").map(String::as_str), Some("3"));
        assert_eq!(event.span, Some(span));

        let bare = __log_event_with!(crate::logging::LogEvent::info("validating"));
        assert!(bare.context.is_empty());
    }

    #[test]
    fn test_macros_expand_without_initialized_logger() {
        let span = Span::new(Position::new(3, 1, 4), Position::new(4, 1, 5));

        log_error!(codes::syntax::STRUCTURAL_MISMATCH, "expected ')'");
        log_error!(codes::syntax::STRUCTURAL_MISMATCH, "expected ')'", span = span);
        log_error!(codes::syntax::STRUCTURAL_MISMATCH, "expected ')'", "found" => "end of input");
        log_error!(codes::syntax::STRUCTURAL_MISMATCH, "expected ')'", span = span, "position" => 3);
        log_success!(codes::success::ACTION_PARSED, "parsed", "kind" => "assignment");
        log_info!("validating", "actions" => 12);
        log_warning!("slow parse", "millis" => 250);
        log_debug!("tokens", "count" => 7);
    }
}
