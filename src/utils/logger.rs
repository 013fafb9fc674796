use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directives used when `RUST_LOG` is unset.
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "site_kit=debug,info"
    } else {
        "site_kit=info"
    }
}

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
}

/// 終端機輸出：精簡格式，不顯示 target 與行號
pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// 每行一個 JSON 物件，供日誌收集使用
pub fn init_json_logger() {
    tracing_subscriber::registry()
        .with(filter(false))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(false)
                .with_current_span(false),
        )
        .init();
}

/// Routes events to the browser console. Safe to call more than once.
#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub fn init_web_logger() {
    // no env vars and no wall clock in the browser
    let result = tracing_subscriber::registry()
        .with(EnvFilter::new(default_directives(false)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .without_time()
                .with_writer(console::ConsoleWriter),
        )
        .try_init();

    if result.is_err() {
        tracing::debug!("logger already installed");
    }
}

#[cfg(all(feature = "web", target_arch = "wasm32"))]
mod console {
    use std::io;
    use tracing_subscriber::fmt::MakeWriter;

    pub struct ConsoleWriter;

    /// One formatted event; emitted as a single console line when dropped.
    pub struct ConsoleLine(Vec<u8>);

    impl io::Write for ConsoleLine {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for ConsoleLine {
        fn drop(&mut self) {
            let line = String::from_utf8_lossy(&self.0);
            web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(line.trim_end()));
        }
    }

    impl<'a> MakeWriter<'a> for ConsoleWriter {
        type Writer = ConsoleLine;

        fn make_writer(&'a self) -> Self::Writer {
            ConsoleLine(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_adds_debug_for_crate_only() {
        assert_eq!(default_directives(false), "site_kit=info");
        assert_eq!(default_directives(true), "site_kit=debug,info");
        assert!(EnvFilter::try_new(default_directives(true)).is_ok());
    }
}
