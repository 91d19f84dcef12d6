use std::cell::RefCell;
use std::panic::{catch_unwind, set_hook, take_hook, UnwindSafe};

use backtrace::Backtrace;
use color_backtrace::termcolor::{ColorChoice, StandardStream};
use color_backtrace::BacktracePrinter;

thread_local! {
    static SAVED_PANIC: RefCell<Option<SavedPanic>> = RefCell::default();
}

struct SavedPanic {
    message: String,
    trace: Backtrace,
}

/// Runs `f`, holding back the panic report until `restore` has put the
/// console back into a readable state. A report printed in fullscreen with
/// black-on-black text would be lost.
#[must_use]
pub fn catch_and_reprint_panic<T>(
    f: impl FnOnce() -> T + UnwindSafe,
    restore: impl FnOnce(),
) -> Option<T> {
    let prev_hook = take_hook();

    set_hook(Box::new(|panic_info| {
        let saved_panic = SavedPanic {
            message: format!("{panic_info}"),
            trace: Backtrace::new(),
        };
        SAVED_PANIC.replace(Some(saved_panic));
    }));

    let result = catch_unwind(f);

    set_hook(prev_hook);

    if let Ok(result) = result {
        return Some(result);
    }

    restore();

    match SAVED_PANIC.take() {
        Some(saved_panic) => {
            log::error!("{}", saved_panic.message);

            let printed = BacktracePrinter::new()
                .message(saved_panic.message)
                .print_trace(
                    &saved_panic.trace,
                    &mut StandardStream::stderr(ColorChoice::Auto),
                );

            if let Err(err) = printed {
                log::error!("couldn't print backtrace: {err}");
            }
        }

        None => log::error!("panicked, but the panic wasn't recorded"),
    }

    None
}
