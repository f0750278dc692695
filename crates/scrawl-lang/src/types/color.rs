/// The closed set of named colors a script can select with `setColor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    Red,
    Green,
    Blue,
    Black,
    #[default]
    White,
}

impl Color {
    pub const ALL: [Color; 5] = [Color::Red, Color::Green, Color::Blue, Color::Black, Color::White];

    /// Straight (non-premultiplied) RGBA.
    pub fn rgba(self) -> [u8; 4] {
        match self {
            Self::Red   => [255,   0,   0, 255],
            Self::Green => [  0, 255,   0, 255],
            Self::Blue  => [  0,   0, 255, 255],
            Self::Black => [  0,   0,   0, 255],
            Self::White => [255, 255, 255, 255],
        }
    }

    /// Script-level constant name, e.g. `RED`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Red   => "RED",
            Self::Green => "GREEN",
            Self::Blue  => "BLUE",
            Self::Black => "BLACK",
            Self::White => "WHITE",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
