//! Parameter schema for the EB3 controller family.
//!
//! The schema is a fixed table built at compile time: one descriptor per
//! parameter, a load order (the line order of `.asv` profile files) and a
//! raw order (the byte layout of the wire frame, including the fixed
//! protocol constants that are not user parameters).

use std::fmt;

use crate::values::Value;

/// Storage type of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Integer,
    Float,
}

/// Editing and validation discipline of a parameter.
///
/// `Enumeration` values are small integers picked from a closed set and are
/// rounded and clamped into the descriptor range when encoded. `Continuous`
/// values live in display units (amps, volts, percent) and go through a raw
/// transform before hitting the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamClass {
    Enumeration,
    Continuous,
}

/// Display-to-raw conversion applied when a parameter is encoded.
///
/// The model-scaled variants resolve their affine coefficients through the
/// controller catalog at encode time, against the profile's active model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawTransform {
    /// Value is used as-is (after rounding).
    Identity,
    /// Per-model phase current scaling.
    PhaseCurrent,
    /// Per-model battery current scaling.
    BatteryCurrent,
    /// Per-model voltage scaling.
    Voltage,
    /// Fixed affine `raw = mul * x + add`, model-independent.
    Scaled { mul: f64, add: f64 },
}

/// Identifier of every tunable EB3 parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamId {
    ControllerModel,
    PhaseCurrent,
    BatteryCurrent,
    LowVoltageCutoff,
    RegenVoltageLimit,
    SpeedSwitchMode,
    Speed1,
    Speed2,
    Speed3,
    ReverseSpeed,
    RegenLevel,
    HallAngle,
    SoftStart,
    AssistLevels,
    PasStartPulses,
    PasMaxSpeed,
    CruiseMode,
    IndicatorMode,
    ThrottleProtect,
}

impl ParamId {
    /// Every parameter, in declaration order.
    pub const ALL: [ParamId; 19] = [
        ParamId::ControllerModel,
        ParamId::PhaseCurrent,
        ParamId::BatteryCurrent,
        ParamId::LowVoltageCutoff,
        ParamId::RegenVoltageLimit,
        ParamId::SpeedSwitchMode,
        ParamId::Speed1,
        ParamId::Speed2,
        ParamId::Speed3,
        ParamId::ReverseSpeed,
        ParamId::RegenLevel,
        ParamId::HallAngle,
        ParamId::SoftStart,
        ParamId::AssistLevels,
        ParamId::PasStartPulses,
        ParamId::PasMaxSpeed,
        ParamId::CruiseMode,
        ParamId::IndicatorMode,
        ParamId::ThrottleProtect,
    ];

    /// Stable machine name, used by the CLI and in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            ParamId::ControllerModel => "controller_model",
            ParamId::PhaseCurrent => "phase_current",
            ParamId::BatteryCurrent => "battery_current",
            ParamId::LowVoltageCutoff => "low_voltage_cutoff",
            ParamId::RegenVoltageLimit => "regen_voltage_limit",
            ParamId::SpeedSwitchMode => "speed_switch_mode",
            ParamId::Speed1 => "speed_1",
            ParamId::Speed2 => "speed_2",
            ParamId::Speed3 => "speed_3",
            ParamId::ReverseSpeed => "reverse_speed",
            ParamId::RegenLevel => "regen_level",
            ParamId::HallAngle => "hall_angle",
            ParamId::SoftStart => "soft_start",
            ParamId::AssistLevels => "assist_levels",
            ParamId::PasStartPulses => "pas_start_pulses",
            ParamId::PasMaxSpeed => "pas_max_speed",
            ParamId::CruiseMode => "cruise_mode",
            ParamId::IndicatorMode => "indicator_mode",
            ParamId::ThrottleProtect => "throttle_protect",
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            ParamId::ControllerModel => "Controller model",
            ParamId::PhaseCurrent => "Phase current limit",
            ParamId::BatteryCurrent => "Battery current limit",
            ParamId::LowVoltageCutoff => "Low voltage cutoff",
            ParamId::RegenVoltageLimit => "Regen voltage limit",
            ParamId::SpeedSwitchMode => "Speed switch mode",
            ParamId::Speed1 => "Speed limit 1",
            ParamId::Speed2 => "Speed limit 2",
            ParamId::Speed3 => "Speed limit 3",
            ParamId::ReverseSpeed => "Reverse speed",
            ParamId::RegenLevel => "Regen braking level",
            ParamId::HallAngle => "Hall sensor angle",
            ParamId::SoftStart => "Soft start ramp",
            ParamId::AssistLevels => "Assist levels",
            ParamId::PasStartPulses => "PAS start pulses",
            ParamId::PasMaxSpeed => "PAS max speed",
            ParamId::CruiseMode => "Cruise control",
            ParamId::IndicatorMode => "Battery indicator mode",
            ParamId::ThrottleProtect => "Throttle protection",
        }
    }

    /// Look up a parameter by its machine name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }

    /// The descriptor for this parameter.
    pub const fn descriptor(self) -> &'static ParamDescriptor {
        match self {
            ParamId::ControllerModel => &CONTROLLER_MODEL,
            ParamId::PhaseCurrent => &PHASE_CURRENT,
            ParamId::BatteryCurrent => &BATTERY_CURRENT,
            ParamId::LowVoltageCutoff => &LOW_VOLTAGE_CUTOFF,
            ParamId::RegenVoltageLimit => &REGEN_VOLTAGE_LIMIT,
            ParamId::SpeedSwitchMode => &SPEED_SWITCH_MODE,
            ParamId::Speed1 => &SPEED_1,
            ParamId::Speed2 => &SPEED_2,
            ParamId::Speed3 => &SPEED_3,
            ParamId::ReverseSpeed => &REVERSE_SPEED,
            ParamId::RegenLevel => &REGEN_LEVEL,
            ParamId::HallAngle => &HALL_ANGLE,
            ParamId::SoftStart => &SOFT_START,
            ParamId::AssistLevels => &ASSIST_LEVELS,
            ParamId::PasStartPulses => &PAS_START_PULSES,
            ParamId::PasMaxSpeed => &PAS_MAX_SPEED,
            ParamId::CruiseMode => &CRUISE_MODE,
            ParamId::IndicatorMode => &INDICATOR_MODE,
            ParamId::ThrottleProtect => &THROTTLE_PROTECT,
        }
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static description of one controller parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamDescriptor {
    pub kind: ParamKind,
    pub class: ParamClass,
    /// Default value, in display units for continuous parameters.
    pub default: Value,
    /// Decimal digits used when formatting float values.
    pub precision: u8,
    pub units: Option<&'static str>,
    /// Inclusive bounds: display domain for continuous parameters, raw
    /// domain for enumerations.
    pub range: (f64, f64),
    /// Parameters whose change invalidates this one's cached display value.
    pub depends_on: &'static [ParamId],
    pub transform: RawTransform,
}

const CONTROLLER_MODEL: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Integer,
    class: ParamClass::Enumeration,
    default: Value::Int(3),
    precision: 0,
    units: None,
    range: (1.0, 5.0),
    depends_on: &[],
    transform: RawTransform::Identity,
};

const PHASE_CURRENT: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Float,
    class: ParamClass::Continuous,
    default: Value::Float(40.0),
    precision: 1,
    units: Some("A"),
    range: (0.0, 150.0),
    depends_on: &[ParamId::ControllerModel],
    transform: RawTransform::PhaseCurrent,
};

const BATTERY_CURRENT: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Float,
    class: ParamClass::Continuous,
    default: Value::Float(14.0),
    precision: 1,
    units: Some("A"),
    range: (0.0, 60.0),
    depends_on: &[ParamId::ControllerModel],
    transform: RawTransform::BatteryCurrent,
};

const LOW_VOLTAGE_CUTOFF: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Float,
    class: ParamClass::Continuous,
    default: Value::Float(42.0),
    precision: 1,
    units: Some("V"),
    range: (15.0, 90.0),
    depends_on: &[ParamId::ControllerModel],
    transform: RawTransform::Voltage,
};

const REGEN_VOLTAGE_LIMIT: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Float,
    class: ParamClass::Continuous,
    default: Value::Float(58.0),
    precision: 1,
    units: Some("V"),
    range: (30.0, 90.0),
    depends_on: &[ParamId::ControllerModel],
    transform: RawTransform::Voltage,
};

const SPEED_SWITCH_MODE: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Integer,
    class: ParamClass::Enumeration,
    default: Value::Int(1),
    precision: 0,
    units: None,
    range: (1.0, 3.0),
    depends_on: &[],
    transform: RawTransform::Identity,
};

const SPEED_1: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Integer,
    class: ParamClass::Continuous,
    default: Value::Int(72),
    precision: 0,
    units: Some("%"),
    range: (0.0, 100.0),
    depends_on: &[],
    transform: RawTransform::Scaled { mul: 1.28, add: 0.0 },
};

const SPEED_2: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Integer,
    class: ParamClass::Continuous,
    default: Value::Int(87),
    precision: 0,
    units: Some("%"),
    range: (0.0, 100.0),
    depends_on: &[],
    transform: RawTransform::Scaled { mul: 1.28, add: 0.0 },
};

const SPEED_3: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Integer,
    class: ParamClass::Continuous,
    default: Value::Int(100),
    precision: 0,
    units: Some("%"),
    range: (0.0, 100.0),
    depends_on: &[],
    transform: RawTransform::Scaled { mul: 1.28, add: 0.0 },
};

const REVERSE_SPEED: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Integer,
    class: ParamClass::Continuous,
    default: Value::Int(20),
    precision: 0,
    units: Some("%"),
    range: (0.0, 60.0),
    depends_on: &[],
    transform: RawTransform::Scaled { mul: 1.28, add: 0.0 },
};

const REGEN_LEVEL: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Integer,
    class: ParamClass::Enumeration,
    default: Value::Int(1),
    precision: 0,
    units: None,
    range: (0.0, 2.0),
    depends_on: &[],
    transform: RawTransform::Identity,
};

const HALL_ANGLE: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Integer,
    class: ParamClass::Enumeration,
    default: Value::Int(1),
    precision: 0,
    units: None,
    range: (1.0, 2.0),
    depends_on: &[],
    transform: RawTransform::Identity,
};

const SOFT_START: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Integer,
    class: ParamClass::Enumeration,
    default: Value::Int(4),
    precision: 0,
    units: None,
    range: (1.0, 8.0),
    depends_on: &[],
    transform: RawTransform::Identity,
};

const ASSIST_LEVELS: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Integer,
    class: ParamClass::Enumeration,
    default: Value::Int(5),
    precision: 0,
    units: None,
    range: (1.0, 5.0),
    depends_on: &[],
    transform: RawTransform::Identity,
};

const PAS_START_PULSES: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Integer,
    class: ParamClass::Continuous,
    default: Value::Int(5),
    precision: 0,
    units: None,
    range: (1.0, 15.0),
    depends_on: &[],
    transform: RawTransform::Identity,
};

const PAS_MAX_SPEED: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Integer,
    class: ParamClass::Continuous,
    default: Value::Int(25),
    precision: 0,
    units: Some("%"),
    range: (0.0, 100.0),
    depends_on: &[],
    transform: RawTransform::Scaled { mul: 1.28, add: 0.0 },
};

const CRUISE_MODE: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Integer,
    class: ParamClass::Enumeration,
    default: Value::Int(0),
    precision: 0,
    units: None,
    range: (0.0, 1.0),
    depends_on: &[],
    transform: RawTransform::Identity,
};

const INDICATOR_MODE: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Integer,
    class: ParamClass::Enumeration,
    default: Value::Int(2),
    precision: 0,
    units: None,
    range: (1.0, 3.0),
    depends_on: &[],
    transform: RawTransform::Identity,
};

const THROTTLE_PROTECT: ParamDescriptor = ParamDescriptor {
    kind: ParamKind::Integer,
    class: ParamClass::Enumeration,
    default: Value::Int(1),
    precision: 0,
    units: None,
    range: (0.0, 1.0),
    depends_on: &[],
    transform: RawTransform::Identity,
};

/// One slot of the wire frame: either a fixed protocol constant or a
/// parameter to encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawSlot {
    Fixed(u8),
    Param(ParamId),
}

/// Line order of `.asv` profile files.
const LOAD_ORDER: [ParamId; 19] = [
    ParamId::ControllerModel,
    ParamId::PhaseCurrent,
    ParamId::BatteryCurrent,
    ParamId::LowVoltageCutoff,
    ParamId::SpeedSwitchMode,
    ParamId::Speed1,
    ParamId::Speed2,
    ParamId::Speed3,
    ParamId::ReverseSpeed,
    ParamId::RegenLevel,
    ParamId::RegenVoltageLimit,
    ParamId::HallAngle,
    ParamId::SoftStart,
    ParamId::AssistLevels,
    ParamId::PasStartPulses,
    ParamId::PasMaxSpeed,
    ParamId::CruiseMode,
    ParamId::IndicatorMode,
    ParamId::ThrottleProtect,
];

/// Byte layout of the frame payload. The leading constants are the frame
/// tag and layout revision the bootloader expects; the trailing zero bytes
/// are reserved.
const RAW_ORDER: [RawSlot; 24] = [
    RawSlot::Fixed(0x0F),
    RawSlot::Fixed(0x1F),
    RawSlot::Param(ParamId::ControllerModel),
    RawSlot::Param(ParamId::PhaseCurrent),
    RawSlot::Param(ParamId::BatteryCurrent),
    RawSlot::Param(ParamId::LowVoltageCutoff),
    RawSlot::Param(ParamId::RegenVoltageLimit),
    RawSlot::Param(ParamId::SpeedSwitchMode),
    RawSlot::Param(ParamId::Speed1),
    RawSlot::Param(ParamId::Speed2),
    RawSlot::Param(ParamId::Speed3),
    RawSlot::Param(ParamId::ReverseSpeed),
    RawSlot::Param(ParamId::RegenLevel),
    RawSlot::Param(ParamId::HallAngle),
    RawSlot::Param(ParamId::SoftStart),
    RawSlot::Param(ParamId::AssistLevels),
    RawSlot::Param(ParamId::PasStartPulses),
    RawSlot::Param(ParamId::PasMaxSpeed),
    RawSlot::Param(ParamId::CruiseMode),
    RawSlot::Param(ParamId::IndicatorMode),
    RawSlot::Param(ParamId::ThrottleProtect),
    RawSlot::Fixed(0x00),
    RawSlot::Fixed(0x00),
    RawSlot::Fixed(0x00),
];

/// The EB3 parameter schema: descriptors plus the two orderings.
#[derive(Debug)]
pub struct Schema {
    load_order: &'static [ParamId],
    raw_order: &'static [RawSlot],
}

static EB3: Schema = Schema {
    load_order: &LOAD_ORDER,
    raw_order: &RAW_ORDER,
};

/// The EB3 family schema.
pub fn eb3() -> &'static Schema {
    &EB3
}

impl Schema {
    /// Descriptor lookup. Total for every `ParamId`.
    pub fn descriptor(&self, id: ParamId) -> &'static ParamDescriptor {
        id.descriptor()
    }

    /// Parameter order in persisted profile files.
    pub fn load_order(&self) -> &'static [ParamId] {
        self.load_order
    }

    /// Byte order of the wire frame payload.
    pub fn raw_order(&self) -> &'static [RawSlot] {
        self.raw_order
    }

    /// Parameters whose cached display value is invalidated when `id`
    /// changes.
    pub fn dependents_of(&self, id: ParamId) -> impl Iterator<Item = ParamId> {
        ParamId::ALL
            .into_iter()
            .filter(move |p| p.descriptor().depends_on.contains(&id))
    }
}
