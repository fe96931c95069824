use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "gradebookd=warn";
const VERBOSE_DIRECTIVE: &str = "gradebookd=debug";

/// `RUST_LOG` (when set and valid) replaces the default level; `--verbose`
/// still raises this crate to debug on top of it.
fn build_filter(verbose: bool, env: Option<&str>) -> EnvFilter {
    let mut filter = env
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE));
    if verbose {
        if let Ok(directive) = VERBOSE_DIRECTIVE.parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

/// Logs go to stderr; stdout carries the shell or the IPC protocol.
pub fn init_logger(verbose: bool) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(verbose, env.as_deref());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
