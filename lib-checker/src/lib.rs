use tracing_subscriber::EnvFilter;

/// `RUST_LOG`で指定されたレベルのログを標準エラー出力に出す。標準出力は解答用に空けておく。
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
