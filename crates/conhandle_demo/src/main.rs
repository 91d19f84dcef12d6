mod keys;
mod panic;

use std::cell::RefCell;
use std::io::{self, Write};
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use conhandle::{Color, Console, ConsoleHandle, ConsoleResult, Position, Size};

use crate::keys::{Keys, ESC};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Walks through the console controls: title, font, cursor and fullscreen,
/// then prints every packed color attribute in its own colors.
#[derive(Parser)]
struct Cli {
    #[arg(long, default_value = "Hello World")]
    title: String,

    #[arg(long, default_value_t = 12)]
    font_width: i16,

    #[arg(long, default_value_t = 16)]
    font_height: i16,

    /// Don't start in fullscreen.
    #[arg(long)]
    no_fullscreen: bool,

    #[arg(long, default_value = "conhandle.log")]
    log_file: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_file)?;

    // Shared with the panic path, so it can leave fullscreen too.
    let console = RefCell::new(ConsoleHandle::open());

    panic::catch_and_reprint_panic(
        AssertUnwindSafe(|| run(&cli, &mut console.borrow_mut())),
        || {
            if let Ok(mut console) = console.try_borrow_mut() {
                restore(&mut *console);
            }
        },
    )
    .context("panicked")??;

    Ok(())
}

fn init_logging(path: &Path) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            let now = chrono::Local::now();

            out.finish(format_args!(
                "[{} {} {}] {}",
                now.format("%Y/%m/%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .chain(fern::log_file(path).context("couldn't open log file")?)
        .apply()?;

    Ok(())
}

/// The console may not support everything (no font changes on most
/// terminals, for one), which shouldn't stop the demo.
fn check(what: &str, res: ConsoleResult<()>) {
    if let Err(err) = res {
        log::warn!("couldn't {what}: {err}");
    }
}

fn run(cli: &Cli, console: &mut ConsoleHandle) -> Result<()> {
    check("set title", console.set_title(&cli.title));
    check(
        "set font size",
        console.set_font_size(Size::new(cli.font_width, cli.font_height)),
    );
    check("hide cursor", console.show_cursor(false));

    if !cli.no_fullscreen {
        check("enter fullscreen", console.toggle_fullscreen());
    }

    console.wait(Duration::from_millis(250));

    let mut stdout = io::stdout();

    match console.window_size() {
        Ok(size) => writeln!(stdout, "Resolution: {}x{}", size.x, size.y)?,
        Err(err) => writeln!(stdout, "Resolution unknown: {err}")?,
    }

    writeln!(stdout, "Press f to toggle fullscreen, ESC to continue")?;
    stdout.flush()?;

    poll_keys(console)?;

    check("move cursor", console.set_cursor_position(Position::new(0, 0)));
    print_color_grid(console)?;

    restore(console);

    // Leave the grid up until the user is done with it.
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;

    Ok(())
}

fn poll_keys(console: &mut ConsoleHandle) -> Result<()> {
    let keys = Keys::new().context("couldn't read from the keyboard")?;

    loop {
        match keys.poll(POLL_INTERVAL)? {
            Some(ESC) => return Ok(()),

            Some(b'f') => {
                check("toggle fullscreen", console.toggle_fullscreen());

                let mut stdout = io::stdout();
                writeln!(stdout, "Toggled!")?;
                stdout.flush()?;
            }

            _ => {}
        }
    }
}

fn print_color_grid(console: &mut ConsoleHandle) -> Result<()> {
    let mut stdout = io::stdout();

    for bg in Color::ALL {
        for fg in Color::ALL {
            // Flush first so text already written keeps its own colors.
            stdout.flush()?;
            check("set color", console.set_font_color(fg, bg));

            write!(stdout, "{:02X} ", console.font_color().attribute())?;
        }

        stdout.flush()?;
        check("set color", console.set_font_color(Color::Gray, Color::Black));
        writeln!(stdout)?;
    }

    stdout.flush()?;
    Ok(())
}

fn restore<C: Console>(console: &mut ConsoleHandle<C>) {
    let _ = io::stdout().flush();

    check("reset color", console.set_font_color(Color::Gray, Color::Black));
    check("show cursor", console.show_cursor(true));

    if console.is_fullscreen() {
        check("leave fullscreen", console.toggle_fullscreen());
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::panic::AssertUnwindSafe;
    use std::time::Duration;

    use conhandle::platform::memory::MemoryConsole;
    use conhandle::{ConsoleConfig, ConsoleHandle, Size};

    use super::{panic, restore};

    #[test]
    fn panic_while_fullscreen_is_restored() {
        let config = ConsoleConfig {
            fullscreen_settle: Duration::ZERO,
            ..ConsoleConfig::default()
        };
        let console = RefCell::new(ConsoleHandle::with_config(MemoryConsole::default(), config));

        let result = panic::catch_and_reprint_panic(
            AssertUnwindSafe(|| {
                let mut console = console.borrow_mut();
                console.toggle_fullscreen().unwrap();

                if console.is_fullscreen() {
                    panic!("failed while fullscreen");
                }
            }),
            || restore(&mut *console.borrow_mut()),
        );

        assert!(result.is_none());

        let console = console.borrow();
        assert!(!console.is_fullscreen());
        assert_eq!(console.window_size().unwrap(), Size::new(80, 25));
        assert_eq!(console.backend().fullscreen_hints(), 2);
        assert!(console.is_cursor_visible());
    }
}
