//! PATLITE LR6-USB signal tower control.
//!
//! The LR6-USB has a buzzer with two alternating pitches and three LED tiers
//! (red, amber, green).

use bytes::{BufMut, Bytes, BytesMut};
use clap::ValueEnum;

use crate::controller::{Command, SignalTower};
use crate::error::{Error, Result};
use crate::options::{pack_nibbles, Count, OptionLabel, REPORT_LEN};

pub const PRODUCT_ID: u16 = 0x8003;

pub struct Lr6Usb;

impl SignalTower for Lr6Usb {
    fn product_id(&self) -> u16 {
        PRODUCT_ID
    }

    fn model_name(&self) -> &'static str {
        "LR6-USB"
    }

    fn command_bytes(&self, command: &Command) -> Result<Bytes> {
        match command {
            Command::Lr6(config) => Ok(config_bytes(config)),
            command => Err(Error::ModelMismatch {
                expected: self.model_name(),
                found: command.model_name(),
            }),
        }
    }
}

/// Buzzer pattern.
#[derive(ValueEnum, Default, PartialEq, Eq, Debug, Copy, Clone)]
pub enum BuzzerPattern {
    #[value(name = "stop")]
    Stop,
    #[value(name = "on")]
    On,
    #[default]
    #[value(name = "pattern1")]
    Pattern1,
    #[value(name = "pattern2")]
    Pattern2,
    #[value(name = "pattern3")]
    Pattern3,
    #[value(name = "pattern4")]
    Pattern4,
}

impl OptionLabel for BuzzerPattern {
    fn code(self) -> u8 {
        match self {
            Self::Stop => 0,
            Self::On => 1,
            Self::Pattern1 => 2,
            Self::Pattern2 => 3,
            Self::Pattern3 => 4,
            Self::Pattern4 => 5,
        }
    }
}

/// Buzzer pitch.
#[derive(ValueEnum, PartialEq, Eq, Debug, Copy, Clone)]
pub enum Pitch {
    #[value(name = "off")]
    Off,
    #[value(name = "A6")]
    A6,
    #[value(name = "BFlat6")]
    BFlat6,
    #[value(name = "B6")]
    B6,
    #[value(name = "C7")]
    C7,
    #[value(name = "DFlat7")]
    DFlat7,
    #[value(name = "D7")]
    D7,
    #[value(name = "EFlat7")]
    EFlat7,
    #[value(name = "E7")]
    E7,
    #[value(name = "F7")]
    F7,
    #[value(name = "GFlat7")]
    GFlat7,
    #[value(name = "G7")]
    G7,
    #[value(name = "AFlat7")]
    AFlat7,
    #[value(name = "A7")]
    A7,
}

impl OptionLabel for Pitch {
    fn code(self) -> u8 {
        match self {
            Self::Off => 0x0,
            Self::A6 => 0x1,
            Self::BFlat6 => 0x2,
            Self::B6 => 0x3,
            Self::C7 => 0x4,
            Self::DFlat7 => 0x5,
            Self::D7 => 0x6,
            Self::EFlat7 => 0x7,
            Self::E7 => 0x8,
            Self::F7 => 0x9,
            Self::GFlat7 => 0xa,
            Self::G7 => 0xb,
            Self::AFlat7 => 0xc,
            Self::A7 => 0xd,
        }
    }
}

/// LED tier pattern.
#[derive(ValueEnum, Default, PartialEq, Eq, Debug, Copy, Clone)]
pub enum LedPattern {
    #[value(name = "off")]
    Off,
    #[default]
    #[value(name = "on")]
    On,
    #[value(name = "pattern1")]
    Pattern1,
    #[value(name = "pattern2")]
    Pattern2,
    #[value(name = "pattern3")]
    Pattern3,
    #[value(name = "pattern4")]
    Pattern4,
}

impl OptionLabel for LedPattern {
    fn code(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::On => 1,
            Self::Pattern1 => 2,
            Self::Pattern2 => 3,
            Self::Pattern3 => 4,
            Self::Pattern4 => 5,
        }
    }
}

/// Buzzer and LED state for an LR6-USB.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct Lr6Config {
    pub buzzer_count: Count,
    pub buzzer_pattern: BuzzerPattern,
    pub pitch_a: Pitch,
    pub pitch_b: Pitch,
    pub led_red: LedPattern,
    pub led_amber: LedPattern,
    pub led_green: LedPattern,
}

impl Lr6Config {
    /// Build a config from option labels.
    ///
    /// Every field is validated before the config exists, so a bad label never
    /// produces a partial report.
    pub fn from_labels(
        buzzer_count: u8,
        buzzer_pattern: &str,
        pitch_a: &str,
        pitch_b: &str,
        led_red: &str,
        led_amber: &str,
        led_green: &str,
    ) -> Result<Self> {
        Ok(Self {
            buzzer_count: Count::new("buzzerCount", buzzer_count)?,
            buzzer_pattern: BuzzerPattern::from_label("buzzerPattern", buzzer_pattern)?,
            pitch_a: Pitch::from_label("pitchA", pitch_a)?,
            pitch_b: Pitch::from_label("pitchB", pitch_b)?,
            led_red: LedPattern::from_label("ledRed", led_red)?,
            led_amber: LedPattern::from_label("ledAmber", led_amber)?,
            led_green: LedPattern::from_label("ledGreen", led_green)?,
        })
    }
}

impl Default for Lr6Config {
    fn default() -> Self {
        Self {
            buzzer_count: Default::default(),
            buzzer_pattern: Default::default(),
            pitch_a: Pitch::F7,
            pitch_b: Pitch::A7,
            led_red: Default::default(),
            led_amber: Default::default(),
            led_green: Default::default(),
        }
    }
}

/// Convert buzzer and LED state to an LR6-USB report.
fn config_bytes(config: &Lr6Config) -> Bytes {
    let mut buf = BytesMut::with_capacity(REPORT_LEN);

    // Reserved.
    buf.put_slice(&[0x00; 2]);

    // Buzzer count and pattern.
    buf.put_u8(pack_nibbles(config.buzzer_count.get(), config.buzzer_pattern.code()));

    // Buzzer pitches.
    buf.put_u8(pack_nibbles(config.pitch_a.code(), config.pitch_b.code()));

    // LED red and amber.
    buf.put_u8(pack_nibbles(config.led_red.code(), config.led_amber.code()));

    // LED green, low nibble unused.
    buf.put_u8(pack_nibbles(config.led_green.code(), 0));

    // Reserved.
    buf.put_slice(&[0x00; 2]);

    buf.freeze()
}
