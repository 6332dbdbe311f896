use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global subscriber, writing to stderr.
///
/// `levels` uses the `EnvFilter` directive syntax, e.g. `info` or
/// `scrape_supervisor=debug,scrape=info`. Invalid directives fall back to
/// `info`. Calling it again is a no-op, tests rely on that.
pub fn init(color: bool, json: bool, levels: &str) {
    let filter = EnvFilter::try_new(levels).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_ansi(color)
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    // unwrap cannot be handled here, because tests might be run parallelly
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder.finish().try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice() {
        init(false, false, "warn");
        init(false, true, "not a valid=directive=");
    }
}
