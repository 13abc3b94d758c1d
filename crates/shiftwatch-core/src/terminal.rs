//! Display collaborator contract.
//!
//! The status screens treat the panel as a simple character-grid
//! terminal; anything that can clear a frame, place text, and commit can
//! back them.

/// Character sizes the renderer may ask for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextSize {
    Small,
    Large,
}

/// Character-grid terminal over a buffered display.
///
/// `col`/`row` are character cells of the current text size. Nothing
/// reaches the panel until [`StatusTerminal::commit`].
pub trait StatusTerminal {
    type Error;

    fn clear(&mut self) -> Result<(), Self::Error>;
    fn set_text_size(&mut self, size: TextSize) -> Result<(), Self::Error>;
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), Self::Error>;
    /// Writes `text` at the cursor and advances to the next row.
    fn print_line(&mut self, text: &str) -> Result<(), Self::Error>;
    fn commit(&mut self) -> Result<(), Self::Error>;
}
