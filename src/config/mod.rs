use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::device::codes::CodeSpace;
use crate::mapping::{
    AxisRange, BankResolver, CodeTable, ControlMap, DeviceProfile, RangeMapper, RangeRule,
};

/// Names accepted by `--profile`
pub const BUILTIN_PROFILES: &[&str] = &["launchcontrol-xl", "flat"];

/// Device profile as written in YAML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProfileConfig {
    #[serde(default = "default_name")]
    pub name: String,

    /// Absent: every channel addresses bank 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banking: Option<BankingConfig>,

    pub buttons: ControlConfig,

    pub axes: AxisConfig,

    /// Raw bytes sent to the controller once the source is open
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_message: Option<Vec<u8>>,
}

/// Channel-to-bank configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BankingConfig {
    pub base_channel: u8,
    #[serde(default = "default_banks")]
    pub banks: u8,
}

/// Mapping rules plus the code table they index
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlConfig {
    /// Index offset added per bank
    #[serde(default)]
    pub stride: usize,
    pub codes: Vec<CodeSpec>,
    pub rules: Vec<RuleConfig>,
}

/// Axis controls with their registered value domain
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AxisConfig {
    #[serde(flatten)]
    pub control: ControlConfig,
    #[serde(default)]
    pub min: i32,
    #[serde(default = "default_axis_max")]
    pub max: i32,
}

/// An input band and the logical index of its first value
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleConfig {
    pub first: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<u8>,
    pub index: usize,
}

impl RuleConfig {
    fn band(first: u8, last: u8, index: usize) -> Self {
        Self {
            first,
            last: Some(last),
            index,
        }
    }

    fn single(input: u8, index: usize) -> Self {
        Self {
            first: input,
            last: None,
            index,
        }
    }

    fn to_rule(&self) -> RangeRule {
        RangeRule::new(self.first, self.last.unwrap_or(self.first), self.index)
    }
}

/// Device code given as a number or a Linux name such as "BTN_SOUTH"
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CodeSpec {
    Number(u16),
    Name(String),
}

impl CodeSpec {
    fn name(name: &str) -> Self {
        CodeSpec::Name(name.to_string())
    }

    /// Resolve to a numeric code within `space`
    pub fn resolve(&self, space: CodeSpace) -> Result<u16> {
        let code = match self {
            CodeSpec::Number(code) => *code,
            CodeSpec::Name(name) => space
                .parse(name)
                .ok_or_else(|| anyhow!("Unknown {:?} code: {}", space, name))?,
        };
        if code > space.max() {
            return Err(anyhow!(
                "{:?} code {:#x} out of range (max {:#x})",
                space,
                code,
                space.max()
            ));
        }
        Ok(code)
    }
}

impl ProfileConfig {
    /// Load a profile from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile file: {}", path.display()))?;

        let config: ProfileConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML profile: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid profile: {}", path.display()))?;
        Ok(config)
    }

    /// Look up a built-in profile by name
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "launchcontrol-xl" => Some(Self::launch_control_xl()),
            "flat" => Some(Self::flat()),
            _ => None,
        }
    }

    /// Novation Launch Control XL, factory templates start on channel 9
    /// (0-based 8). Notes of the two button rows and the four knob/fader
    /// rows are mapped in bands.
    pub fn launch_control_xl() -> Self {
        let buttons = [
            "BTN_0", "BTN_1", "BTN_2", "BTN_3", "BTN_4", "BTN_5", "BTN_6", "BTN_7", "BTN_8",
            "BTN_9", "BTN_DEAD", "BTN_SOUTH", "BTN_EAST", "BTN_C", "BTN_NORTH", "BTN_WEST",
            "BTN_Z", "BTN_TL", "BTN_TR", "BTN_TL2", "BTN_TR2", "BTN_SELECT", "BTN_START",
            "BTN_MODE",
        ];
        // Skips X/Y, the hats and the multitouch range
        let axes: [u16; 32] = [
            0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
            0x1d, 0x1e, 0x1f, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2a, 0x2b,
            0x2c, 0x2d, 0x3e, 0x3f,
        ];

        ProfileConfig {
            name: "LaunchControl XL joystick".to_string(),
            banking: Some(BankingConfig {
                base_channel: 8,
                banks: 1,
            }),
            buttons: ControlConfig {
                stride: 24,
                codes: buttons.iter().map(|name| CodeSpec::name(name)).collect(),
                rules: vec![
                    RuleConfig::band(41, 44, 0),
                    RuleConfig::band(57, 60, 4),
                    RuleConfig::band(73, 76, 8),
                    RuleConfig::band(89, 92, 12),
                    RuleConfig::band(105, 108, 20),
                ],
            },
            axes: AxisConfig {
                control: ControlConfig {
                    stride: 32,
                    codes: axes.iter().map(|code| CodeSpec::Number(*code)).collect(),
                    rules: vec![
                        RuleConfig::band(13, 20, 24),
                        RuleConfig::band(29, 36, 16),
                        RuleConfig::band(49, 56, 8),
                        RuleConfig::band(77, 84, 0),
                    ],
                },
                min: 0,
                max: default_axis_max(),
            },
            // Turn all LEDs off
            init_message: Some(vec![0xb8, 0x00, 0x00]),
        }
    }

    /// Flat layout for a pad controller: notes 36-51 one per button,
    /// CC 1 and CC 7 to two axes
    pub fn flat() -> Self {
        let buttons = [
            "BTN_TRIGGER", "BTN_THUMB", "BTN_THUMB2", "BTN_TOP", "BTN_TOP2", "BTN_PINKIE",
            "BTN_BASE", "BTN_BASE2", "BTN_BASE3", "BTN_BASE4", "BTN_BASE5", "BTN_BASE6",
            "BTN_DEAD", "BTN_SOUTH", "BTN_EAST", "BTN_C",
        ];

        ProfileConfig {
            name: default_name(),
            banking: None,
            buttons: ControlConfig {
                stride: 0,
                codes: buttons.iter().map(|name| CodeSpec::name(name)).collect(),
                rules: (36u8..=51)
                    .enumerate()
                    .map(|(index, note)| RuleConfig::single(note, index))
                    .collect(),
            },
            axes: AxisConfig {
                control: ControlConfig {
                    stride: 0,
                    codes: vec![CodeSpec::name("ABS_VOLUME"), CodeSpec::name("ABS_THROTTLE")],
                    rules: vec![RuleConfig::single(1, 0), RuleConfig::single(7, 1)],
                },
                min: 0,
                max: default_axis_max(),
            },
            init_message: None,
        }
    }

    /// Validate the profile
    pub fn validate(&self) -> Result<()> {
        if let Some(banking) = &self.banking {
            if banking.base_channel > 15 {
                return Err(anyhow!("Base channel must be between 0 and 15"));
            }
            if banking.banks == 0 {
                return Err(anyhow!("At least one bank is required"));
            }
            if banking.base_channel as u16 + banking.banks as u16 > 16 {
                return Err(anyhow!(
                    "{} banks starting at channel {} exceed the 16 MIDI channels",
                    banking.banks,
                    banking.base_channel
                ));
            }
        }

        let banks = self.bank_resolver().count();

        validate_control(&self.buttons, CodeSpace::Button, banks).context("Invalid buttons")?;
        validate_control(&self.axes.control, CodeSpace::Axis, banks).context("Invalid axes")?;

        if self.axes.min >= self.axes.max {
            return Err(anyhow!(
                "Axis minimum {} must be below maximum {}",
                self.axes.min,
                self.axes.max
            ));
        }

        Ok(())
    }

    fn bank_resolver(&self) -> BankResolver {
        match &self.banking {
            Some(banking) => BankResolver::Channels {
                base_channel: banking.base_channel,
                banks: banking.banks,
            },
            None => BankResolver::Single,
        }
    }

    /// Validate and compile into the runtime profile
    pub fn build(&self) -> Result<DeviceProfile> {
        self.validate()?;

        Ok(DeviceProfile {
            name: self.name.clone(),
            banks: self.bank_resolver(),
            buttons: compile_control(&self.buttons, CodeSpace::Button)?,
            axes: compile_control(&self.axes.control, CodeSpace::Axis)?,
            axis_range: AxisRange {
                min: self.axes.min,
                max: self.axes.max,
            },
            init_message: self.init_message.clone(),
        })
    }
}

fn validate_control(control: &ControlConfig, space: CodeSpace, banks: u16) -> Result<()> {
    let mut seen = HashSet::new();
    for spec in &control.codes {
        let code = spec.resolve(space)?;
        if !seen.insert(code) {
            return Err(anyhow!("Duplicate code {:#x}", code));
        }
    }

    let rules: Vec<RangeRule> = control.rules.iter().map(RuleConfig::to_rule).collect();
    for (i, rule) in rules.iter().enumerate() {
        if rule.first > rule.last {
            return Err(anyhow!("Rule {}: first {} is above last {}", i, rule.first, rule.last));
        }
        if rule.last > 127 {
            return Err(anyhow!("Rule {}: inputs must be between 0 and 127", i));
        }
        if let Some(j) = rules[..i].iter().position(|other| other.overlaps(rule)) {
            return Err(anyhow!("Rule {} overlaps rule {}", i, j));
        }
    }

    let mapper = RangeMapper::new(rules, control.stride);
    let reach = mapper
        .max_index(banks)
        .with_context(|| format!("Stride {} with {} banks", control.stride, banks))?;
    if let Some(max_index) = reach {
        if max_index >= control.codes.len() {
            return Err(anyhow!(
                "Rules reach index {} but only {} codes are listed",
                max_index,
                control.codes.len()
            ));
        }
    }

    Ok(())
}

fn compile_control(control: &ControlConfig, space: CodeSpace) -> Result<ControlMap> {
    let codes = control
        .codes
        .iter()
        .map(|spec| spec.resolve(space))
        .collect::<Result<Vec<_>>>()?;
    let rules = control.rules.iter().map(RuleConfig::to_rule).collect();

    Ok(ControlMap::new(
        RangeMapper::new(rules, control.stride),
        CodeTable::new(codes),
    ))
}

fn default_name() -> String {
    "MIDI joystick".to_string()
}

fn default_banks() -> u8 {
    1
}

fn default_axis_max() -> i32 {
    127
}
