use bitflags::bitflags;

/// One of the 16 entries of the console palette.
///
/// The discriminant is the palette index: bit 0 is blue, bit 1 green,
/// bit 2 red and bit 3 intensity.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    #[default]
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Yellow = 6,
    Gray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    LightMagenta = 13,
    LightYellow = 14,
    White = 15,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorBits: u8 {
        const BLUE      = 0b0001;
        const GREEN     = 0b0010;
        const RED       = 0b0100;
        const INTENSITY = 0b1000;
    }
}

impl Color {
    /// Every palette entry in index order.
    pub const ALL: [Color; 16] = [
        Color::Black,
        Color::Blue,
        Color::Green,
        Color::Cyan,
        Color::Red,
        Color::Magenta,
        Color::Yellow,
        Color::Gray,
        Color::DarkGray,
        Color::LightBlue,
        Color::LightGreen,
        Color::LightCyan,
        Color::LightRed,
        Color::LightMagenta,
        Color::LightYellow,
        Color::White,
    ];

    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    #[inline]
    pub fn bits(self) -> ColorBits {
        ColorBits::from_bits_truncate(self.index())
    }

    /// SGR parameter selecting this color as the foreground.
    pub fn ansi_fg(self) -> u8 {
        let (base, bright) = self.ansi_parts();
        if bright {
            90 + base
        } else {
            30 + base
        }
    }

    /// SGR parameter selecting this color as the background.
    pub fn ansi_bg(self) -> u8 {
        let (base, bright) = self.ansi_parts();
        if bright {
            100 + base
        } else {
            40 + base
        }
    }

    // ANSI orders the channels red, green, blue from the low bit up.
    fn ansi_parts(self) -> (u8, bool) {
        let bits = self.bits();

        let mut base = 0;
        if bits.contains(ColorBits::RED) {
            base |= 1;
        }
        if bits.contains(ColorBits::GREEN) {
            base |= 2;
        }
        if bits.contains(ColorBits::BLUE) {
            base |= 4;
        }

        (base, bits.contains(ColorBits::INTENSITY))
    }
}

impl TryFrom<u8> for Color {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value).ok_or(value)
    }
}

/// A foreground/background pair.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontColor {
    pub fg: Color,
    pub bg: Color,
}

impl FontColor {
    #[inline]
    pub const fn new(fg: Color, bg: Color) -> Self {
        Self { fg, bg }
    }

    /// The packed text attribute: background in the high nibble, foreground
    /// in the low nibble.
    #[inline]
    pub const fn attribute(&self) -> u16 {
        ((self.bg as u16) << 4) | self.fg as u16
    }

    /// Unpacks the color nibbles of an attribute, ignoring any higher bits.
    #[inline]
    pub fn from_attribute(attribute: u16) -> Self {
        Self {
            fg: Color::ALL[(attribute & 0xf) as usize],
            bg: Color::ALL[((attribute >> 4) & 0xf) as usize],
        }
    }
}

impl From<FontColor> for (Color, Color, u16) {
    #[inline]
    fn from(value: FontColor) -> Self {
        (value.fg, value.bg, value.attribute())
    }
}

/// Cursor appearance as the console reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorInfo {
    /// Percentage of the cell filled by the cursor, 1 to 100.
    pub size: u32,
    pub visible: bool,
}

impl Default for CursorInfo {
    fn default() -> Self {
        Self {
            size: 25,
            visible: true,
        }
    }
}
