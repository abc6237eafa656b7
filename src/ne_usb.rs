//! PATLITE NE-USB signal tower control.

use bytes::{BufMut, Bytes, BytesMut};
use clap::ValueEnum;

use crate::controller::{Command, SignalTower};
use crate::error::{Error, Result};
use crate::options::{pack_nibbles, Count, OptionLabel, REPORT_LEN};

pub const PRODUCT_ID: u16 = 0x6001;

/// Loudest alarm volume, anything above is sent as this.
pub const MAX_VOLUME: u8 = 10;

pub struct NeUsb;

impl SignalTower for NeUsb {
    fn product_id(&self) -> u16 {
        PRODUCT_ID
    }

    fn model_name(&self) -> &'static str {
        "NE-USB"
    }

    fn command_bytes(&self, command: &Command) -> Result<Bytes> {
        match command {
            Command::Ne(config) => Ok(config_bytes(config)),
            command => Err(Error::ModelMismatch {
                expected: self.model_name(),
                found: command.model_name(),
            }),
        }
    }
}

/// Alarm sound.
#[derive(ValueEnum, Default, PartialEq, Eq, Debug, Copy, Clone)]
pub enum AlarmPattern {
    #[value(name = "off")]
    Off,
    #[value(name = "continuous")]
    Continuous,
    #[value(name = "sweep")]
    Sweep,
    #[value(name = "callSign")]
    CallSign,
    #[default]
    #[value(name = "lowUrgency")]
    LowUrgency,
    #[value(name = "highUrgency")]
    HighUrgency,
    #[value(name = "twinkleStar")]
    TwinkleStar,
    #[value(name = "londonBridge")]
    LondonBridge,
}

impl OptionLabel for AlarmPattern {
    fn code(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Continuous => 1,
            Self::Sweep => 2,
            Self::CallSign => 3,
            Self::LowUrgency => 4,
            Self::HighUrgency => 5,
            Self::TwinkleStar => 6,
            Self::LondonBridge => 7,
        }
    }
}

/// LED color.
#[derive(ValueEnum, Default, PartialEq, Eq, Debug, Copy, Clone)]
pub enum LedColor {
    #[value(name = "off")]
    Off,
    #[value(name = "red")]
    Red,
    #[default]
    #[value(name = "green")]
    Green,
    #[value(name = "amber")]
    Amber,
    #[value(name = "blue")]
    Blue,
    #[value(name = "purple")]
    Purple,
    #[value(name = "cyan")]
    Cyan,
    #[value(name = "white")]
    White,
}

impl OptionLabel for LedColor {
    fn code(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Red => 1,
            Self::Green => 2,
            Self::Amber => 3,
            Self::Blue => 4,
            Self::Purple => 5,
            Self::Cyan => 6,
            Self::White => 7,
        }
    }
}

/// LED flash pattern.
#[derive(ValueEnum, Default, PartialEq, Eq, Debug, Copy, Clone)]
pub enum LedPattern {
    #[value(name = "off")]
    Off,
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
    #[value(name = "pattern5")]
    Pattern5,
    #[value(name = "pattern6")]
    Pattern6,
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
            Self::Pattern5 => 6,
            Self::Pattern6 => 7,
        }
    }
}

/// Alarm and LED state for an NE-USB.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct NeConfig {
    pub alarm_count: Count,
    pub alarm_pattern: AlarmPattern,
    /// Raw volume, clamped to [`MAX_VOLUME`] when encoded.
    pub alarm_volume: u8,
    pub led_color: LedColor,
    pub led_pattern: LedPattern,
}

impl NeConfig {
    /// Build a config from option labels.
    pub fn from_labels(
        alarm_count: u8,
        alarm_pattern: &str,
        alarm_volume: u8,
        led_color: &str,
        led_pattern: &str,
    ) -> Result<Self> {
        Ok(Self {
            alarm_count: Count::new("alarmCount", alarm_count)?,
            alarm_pattern: AlarmPattern::from_label("alarmPattern", alarm_pattern)?,
            alarm_volume,
            led_color: LedColor::from_label("ledColor", led_color)?,
            led_pattern: LedPattern::from_label("ledPattern", led_pattern)?,
        })
    }
}

impl Default for NeConfig {
    fn default() -> Self {
        Self {
            alarm_count: Default::default(),
            alarm_pattern: Default::default(),
            alarm_volume: MAX_VOLUME,
            led_color: Default::default(),
            led_pattern: Default::default(),
        }
    }
}

/// Convert alarm and LED state to an NE-USB report.
fn config_bytes(config: &NeConfig) -> Bytes {
    let mut buf = BytesMut::with_capacity(REPORT_LEN);

    // Reserved.
    buf.put_slice(&[0x00; 2]);

    // Alarm count and pattern.
    buf.put_u8(pack_nibbles(config.alarm_count.get(), config.alarm_pattern.code()));

    // Alarm volume, uses the whole byte.
    buf.put_u8(volume_byte(config.alarm_volume));

    // LED color and pattern.
    buf.put_u8(pack_nibbles(config.led_color.code(), config.led_pattern.code()));

    // Reserved.
    buf.put_slice(&[0x00; 3]);

    buf.freeze()
}

/// Clamp volume to the NE-USB range.
fn volume_byte(volume: u8) -> u8 {
    volume.min(MAX_VOLUME)
}
