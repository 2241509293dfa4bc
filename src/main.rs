use gl_triangle::WindowConfig;
use std::process;

fn main() {
    env_logger::init();

    let config = WindowConfig::default();
    if let Err(err) = gl_triangle::run(&config) {
        log::error!("{}", err);
        process::exit(1);
    }
}
