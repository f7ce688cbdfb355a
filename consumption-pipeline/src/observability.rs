use tracing_subscriber::{filter::LevelFilter, EnvFilter};

pub fn init_tracing() {
    let filter = EnvFilter::from_default_env().add_directive(
        "consumption_pipeline=info"
            .parse()
            .unwrap_or_else(|_| LevelFilter::INFO.into()),
    );

    // stdout carries tables and CSV, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
