pub mod api;
pub mod core;
pub mod models;
pub mod scanner;

pub fn init_logging() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .try_init();
}
