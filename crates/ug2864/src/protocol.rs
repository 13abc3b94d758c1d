//! Wire-level protocol helpers for the SSD1306 controller.

/// Panel width in pixels.
pub const WIDTH: usize = 128;
/// Panel height in pixels.
pub const HEIGHT: usize = 64;
/// Number of 8-pixel-tall pages.
pub const PAGES: usize = HEIGHT / 8;
/// Number of bytes in one page row.
pub const PAGE_BYTES: usize = WIDTH;
/// Total framebuffer size in bytes.
pub const BUFFER_SIZE: usize = PAGE_BYTES * PAGES;

/// Default 7-bit I2C address of the module (SA0 low).
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// I2C control byte prefixing a command stream.
pub const CTRL_COMMAND: u8 = 0x00;
/// I2C control byte prefixing a display-RAM data stream.
pub const CTRL_DATA: u8 = 0x40;

const CMD_DISPLAY_OFF: u8 = 0xAE;
const CMD_DISPLAY_ON: u8 = 0xAF;
const CMD_CLOCK_DIV: u8 = 0xD5;
const CMD_MULTIPLEX: u8 = 0xA8;
const CMD_DISPLAY_OFFSET: u8 = 0xD3;
const CMD_START_LINE: u8 = 0x40;
const CMD_CHARGE_PUMP: u8 = 0x8D;
const CMD_ADDRESS_MODE: u8 = 0x20;
const CMD_SEGMENT_REMAP_OFF: u8 = 0xA0;
const CMD_SEGMENT_REMAP_ON: u8 = 0xA1;
const CMD_COM_SCAN_INC: u8 = 0xC0;
const CMD_COM_SCAN_DEC: u8 = 0xC8;
const CMD_COM_PINS: u8 = 0xDA;
const CMD_CONTRAST: u8 = 0x81;
const CMD_PRECHARGE: u8 = 0xD9;
const CMD_VCOMH: u8 = 0xDB;
const CMD_RAM_OUTPUT: u8 = 0xA4;
const CMD_NORMAL_DISPLAY: u8 = 0xA6;
const CMD_COLUMN_RANGE: u8 = 0x21;
const CMD_PAGE_RANGE: u8 = 0x22;

/// Packet size for the power-up initialization command stream.
///
/// Layout: 1 control byte, then the 25-byte SSD1306 bring-up sequence
/// ending with display-on.
pub const INIT_PACKET_SIZE: usize = 1 + 25;

/// Packet size for a full-frame address window command.
pub const WINDOW_PACKET_SIZE: usize = 1 + 6;

/// Packet size for a single-argument command.
pub const COMMAND_PACKET_SIZE: usize = 2;

/// Packet size for contrast updates.
pub const CONTRAST_PACKET_SIZE: usize = 3;

/// Builds the bring-up command stream for a 128x64 panel on the internal
/// charge pump.
///
/// `flip_horizontal`/`flip_vertical` select segment remap and COM scan
/// direction so the module can be mounted either way up.
#[inline]
pub fn build_init_packet(
    flip_horizontal: bool,
    flip_vertical: bool,
    contrast: u8,
) -> [u8; INIT_PACKET_SIZE] {
    let segment_remap = if flip_horizontal {
        CMD_SEGMENT_REMAP_OFF
    } else {
        CMD_SEGMENT_REMAP_ON
    };
    let com_scan = if flip_vertical {
        CMD_COM_SCAN_INC
    } else {
        CMD_COM_SCAN_DEC
    };

    [
        CTRL_COMMAND,
        CMD_DISPLAY_OFF,
        CMD_CLOCK_DIV,
        0x80,
        CMD_MULTIPLEX,
        (HEIGHT - 1) as u8,
        CMD_DISPLAY_OFFSET,
        0x00,
        CMD_START_LINE,
        CMD_CHARGE_PUMP,
        0x14,
        CMD_ADDRESS_MODE,
        0x00, // horizontal addressing
        segment_remap,
        com_scan,
        CMD_COM_PINS,
        0x12,
        CMD_CONTRAST,
        contrast,
        CMD_PRECHARGE,
        0xF1,
        CMD_VCOMH,
        0x40,
        CMD_RAM_OUTPUT,
        CMD_NORMAL_DISPLAY,
        CMD_DISPLAY_ON,
    ]
}

/// Builds the address-window command covering the whole frame.
#[inline]
pub fn build_window_packet() -> [u8; WINDOW_PACKET_SIZE] {
    [
        CTRL_COMMAND,
        CMD_COLUMN_RANGE,
        0x00,
        (WIDTH - 1) as u8,
        CMD_PAGE_RANGE,
        0x00,
        (PAGES - 1) as u8,
    ]
}

/// Builds a single-command packet (display on/off and friends).
#[inline]
pub const fn build_command_packet(command: u8) -> [u8; COMMAND_PACKET_SIZE] {
    [CTRL_COMMAND, command]
}

/// Builds a contrast-update packet.
#[inline]
pub const fn build_contrast_packet(level: u8) -> [u8; CONTRAST_PACKET_SIZE] {
    [CTRL_COMMAND, CMD_CONTRAST, level]
}

/// Display-on command byte.
pub const fn display_on_command() -> u8 {
    CMD_DISPLAY_ON
}

/// Display-off command byte.
pub const fn display_off_command() -> u8 {
    CMD_DISPLAY_OFF
}
