//! `log` 门面的后端
//!
//! wasm32 下写入浏览器 console；其余平台（测试与本地工具）交给 env_logger。

#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

use log::LevelFilter;

#[cfg(target_arch = "wasm32")]
mod console {
    use log::{Level, Log, Metadata, Record};
    use wasm_bindgen::JsValue;

    pub struct ConsoleLogger;

    pub static LOGGER: ConsoleLogger = ConsoleLogger;

    impl Log for ConsoleLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &Record) {
            if !self.enabled(record.metadata()) {
                return;
            }
            let line = JsValue::from_str(&format!(
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            ));
            match record.level() {
                Level::Error => web_sys::console::error_1(&line),
                Level::Warn => web_sys::console::warn_1(&line),
                Level::Info => web_sys::console::info_1(&line),
                Level::Debug | Level::Trace => web_sys::console::log_1(&line),
            }
        }

        fn flush(&self) {}
    }
}

/// 安装日志后端；重复调用只更新级别
#[cfg(target_arch = "wasm32")]
pub fn init(level: LevelFilter) {
    if log::set_logger(&console::LOGGER).is_err() {
        log::debug!("logger already installed");
    }
    log::set_max_level(level);
}

/// 安装日志后端；重复调用只更新级别
#[cfg(not(target_arch = "wasm32"))]
pub fn init(level: LevelFilter) {
    let installed = env_logger::Builder::new()
        .filter_level(level)
        .is_test(cfg!(test))
        .try_init();
    if installed.is_err() {
        log::debug!("logger already installed");
    }
    log::set_max_level(level);
}
