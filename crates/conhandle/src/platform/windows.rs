use std::ffi::OsString;
use std::mem;
use std::os::windows::ffi::{OsStrExt, OsStringExt};

use winapi::shared::minwindef::{BOOL, FALSE, TRUE};
use winapi::um::handleapi::INVALID_HANDLE_VALUE;
use winapi::um::processenv::GetStdHandle;
use winapi::um::winbase::STD_OUTPUT_HANDLE;
use winapi::um::wincon::{
    GetConsoleCursorInfo, GetConsoleScreenBufferInfo, GetConsoleTitleW,
    GetCurrentConsoleFontEx, GetLargestConsoleWindowSize, SetConsoleCursorInfo,
    SetConsoleCursorPosition, SetConsoleScreenBufferSize, SetConsoleTextAttribute,
    SetConsoleTitleW, SetConsoleWindowInfo, SetCurrentConsoleFontEx, CONSOLE_CURSOR_INFO,
    CONSOLE_FONT_INFOEX, CONSOLE_SCREEN_BUFFER_INFO,
};
use winapi::um::wincontypes::{COORD, SMALL_RECT};
use winapi::um::winnt::HANDLE;
use winapi::um::winuser::{keybd_event, KEYEVENTF_KEYUP, VK_MENU, VK_RETURN};

use super::Console;
use crate::error::{ConsoleError, ConsoleResult};
use crate::style::CursorInfo;
use crate::units::{Position, Rect, ScreenBufferInfo, Size};

/// Size of the buffer the title is read into, in UTF-16 units.
const TITLE_CAPACITY: usize = 1024;

/// The Win32 console attached to the process's standard output.
///
/// The handle belongs to the process and is never closed.
pub struct WindowsConsole {
    handle: HANDLE,
}

macro_rules! cvt {
    ($call:literal, $res:expr) => {{
        match $res {
            0 => Err(ConsoleError::last_os_error($call)),
            res => Ok(res),
        }
    }};
}

fn coord(v: Size) -> COORD {
    COORD { X: v.x, Y: v.y }
}

fn from_coord(c: COORD) -> Size {
    Size::new(c.X, c.Y)
}

fn small_rect(r: Rect) -> SMALL_RECT {
    SMALL_RECT {
        Left: r.left,
        Top: r.top,
        Right: r.right,
        Bottom: r.bottom,
    }
}

impl WindowsConsole {
    fn font_info(&self) -> ConsoleResult<CONSOLE_FONT_INFOEX> {
        let mut info: CONSOLE_FONT_INFOEX = unsafe { mem::zeroed() };
        info.cbSize = mem::size_of::<CONSOLE_FONT_INFOEX>() as u32;

        cvt!("GetCurrentConsoleFontEx", unsafe {
            GetCurrentConsoleFontEx(self.handle, FALSE, &mut info)
        })?;

        Ok(info)
    }
}

impl Console for WindowsConsole {
    fn open() -> Self {
        Self {
            handle: unsafe { GetStdHandle(STD_OUTPUT_HANDLE) },
        }
    }

    fn is_valid(&self) -> bool {
        !self.handle.is_null() && self.handle != INVALID_HANDLE_VALUE
    }

    fn title(&self) -> ConsoleResult<String> {
        let mut buf = [0u16; TITLE_CAPACITY];

        // Zero is also what an empty title reads as, so it isn't an error.
        let len = unsafe { GetConsoleTitleW(buf.as_mut_ptr(), buf.len() as u32) } as usize;
        let len = len.min(buf.len());

        Ok(OsString::from_wide(&buf[..len])
            .to_string_lossy()
            .into_owned())
    }

    fn set_title(&mut self, title: &str) -> ConsoleResult<()> {
        let wide: Vec<u16> = OsString::from(title)
            .encode_wide()
            .chain(Some(0))
            .collect();

        cvt!("SetConsoleTitleW", unsafe { SetConsoleTitleW(wide.as_ptr()) })?;
        Ok(())
    }

    fn screen_buffer_info(&self) -> ConsoleResult<ScreenBufferInfo> {
        let mut csbi: CONSOLE_SCREEN_BUFFER_INFO = unsafe { mem::zeroed() };

        cvt!("GetConsoleScreenBufferInfo", unsafe {
            GetConsoleScreenBufferInfo(self.handle, &mut csbi)
        })?;

        let w = csbi.srWindow;

        Ok(ScreenBufferInfo {
            buffer_size: from_coord(csbi.dwSize),
            window: Rect {
                left: w.Left,
                top: w.Top,
                right: w.Right,
                bottom: w.Bottom,
            },
            cursor: from_coord(csbi.dwCursorPosition),
        })
    }

    fn largest_window_size(&self) -> ConsoleResult<Size> {
        let largest = unsafe { GetLargestConsoleWindowSize(self.handle) };

        // Both zero means the call failed.
        if largest.X == 0 && largest.Y == 0 {
            return Err(ConsoleError::last_os_error("GetLargestConsoleWindowSize"));
        }

        Ok(from_coord(largest))
    }

    fn set_buffer_size(&mut self, size: Size) -> ConsoleResult<()> {
        cvt!("SetConsoleScreenBufferSize", unsafe {
            SetConsoleScreenBufferSize(self.handle, coord(size))
        })?;
        Ok(())
    }

    fn set_window_rect(&mut self, rect: Rect) -> ConsoleResult<()> {
        let rect = small_rect(rect);

        cvt!("SetConsoleWindowInfo", unsafe {
            SetConsoleWindowInfo(self.handle, TRUE, &rect)
        })?;
        Ok(())
    }

    fn font_size(&self) -> ConsoleResult<Size> {
        Ok(from_coord(self.font_info()?.dwFontSize))
    }

    fn set_font_size(&mut self, size: Size) -> ConsoleResult<()> {
        let mut info = self.font_info()?;
        info.dwFontSize = coord(size);

        cvt!("SetCurrentConsoleFontEx", unsafe {
            SetCurrentConsoleFontEx(self.handle, FALSE, &mut info)
        })?;
        Ok(())
    }

    fn set_text_attribute(&mut self, attribute: u16) -> ConsoleResult<()> {
        cvt!("SetConsoleTextAttribute", unsafe {
            SetConsoleTextAttribute(self.handle, attribute)
        })?;
        Ok(())
    }

    fn set_cursor_position(&mut self, pos: Position) -> ConsoleResult<()> {
        cvt!("SetConsoleCursorPosition", unsafe {
            SetConsoleCursorPosition(self.handle, coord(pos))
        })?;
        Ok(())
    }

    fn cursor_info(&self) -> ConsoleResult<CursorInfo> {
        let mut info: CONSOLE_CURSOR_INFO = unsafe { mem::zeroed() };

        cvt!("GetConsoleCursorInfo", unsafe {
            GetConsoleCursorInfo(self.handle, &mut info)
        })?;

        Ok(CursorInfo {
            size: info.dwSize,
            visible: info.bVisible != 0,
        })
    }

    fn set_cursor_info(&mut self, info: CursorInfo) -> ConsoleResult<()> {
        let info = CONSOLE_CURSOR_INFO {
            dwSize: info.size,
            bVisible: info.visible as BOOL,
        };

        cvt!("SetConsoleCursorInfo", unsafe {
            SetConsoleCursorInfo(self.handle, &info)
        })?;
        Ok(())
    }

    fn send_fullscreen_hint(&mut self) -> ConsoleResult<bool> {
        // Alt+Enter, injected into the input queue. keybd_event has no
        // failure return.
        unsafe {
            keybd_event(VK_MENU as u8, 0x38, 0, 0);
            keybd_event(VK_RETURN as u8, 0x1c, 0, 0);
            keybd_event(VK_RETURN as u8, 0x1c, KEYEVENTF_KEYUP, 0);
            keybd_event(VK_MENU as u8, 0x38, KEYEVENTF_KEYUP, 0);
        }

        Ok(true)
    }
}
