//! Initiator rule table
//!
//! Physics-based fault signatures grouped by component family. Each rule is
//! an AND list over directional ratios and supplementary metrics, with an
//! optional OR fallback consulted only when the AND list fails.

use std::collections::BTreeMap;

use crate::config::defaults::EPSILON;
use crate::types::Comparison;

/// Quantity a condition reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    H,
    V,
    A,
    HvRatio,
    VhRatio,
    AhRatio,
    AvRatio,
    VaRatio,
    Kurtosis,
    CrestFactor,
    Temperature,
}

impl Metric {
    /// Name used in triggered-condition reports.
    pub const fn key(self) -> &'static str {
        match self {
            Metric::H => "H",
            Metric::V => "V",
            Metric::A => "A",
            Metric::HvRatio => "H_V_ratio",
            Metric::VhRatio => "V_H_ratio",
            Metric::AhRatio => "A_H_ratio",
            Metric::AvRatio => "A_V_ratio",
            Metric::VaRatio => "V_A_ratio",
            Metric::Kurtosis => "kurtosis",
            Metric::CrestFactor => "crest_factor",
            Metric::Temperature => "temperature",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition {
    pub metric: Metric,
    pub op: Comparison,
    pub threshold: f64,
}

impl Condition {
    pub fn holds(&self, value: f64) -> bool {
        self.op.holds(value, self.threshold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitiatorRule {
    pub rule_id: &'static str,
    pub initiator: &'static str,
    pub diagnosis: &'static str,
    pub conditions: &'static [Condition],
    pub fallback: &'static [Condition],
    pub severity_base: f64,
}

#[derive(Debug)]
pub struct ComponentRules {
    pub component: &'static str,
    pub rules: &'static [InitiatorRule],
}

/// Channel magnitudes and derived ratios for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSnapshot {
    h: f64,
    v: f64,
    a: f64,
    kurtosis: f64,
    crest_factor: f64,
    temperature: f64,
}

impl MetricSnapshot {
    /// Missing H/V/A read as 0.001, anything else missing as 0.
    pub fn from_map(metrics: &BTreeMap<String, f64>) -> Self {
        let get = |key: &str, default: f64| metrics.get(key).copied().unwrap_or(default);
        Self {
            h: get("H", 0.001),
            v: get("V", 0.001),
            a: get("A", 0.001),
            kurtosis: get("kurtosis", 0.0),
            crest_factor: get("crest_factor", 0.0),
            temperature: get("temperature", 0.0),
        }
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::H => self.h,
            Metric::V => self.v,
            Metric::A => self.a,
            Metric::HvRatio => self.h / self.v.max(EPSILON),
            Metric::VhRatio => self.v / self.h.max(EPSILON),
            Metric::AhRatio => self.a / self.h.max(EPSILON),
            Metric::AvRatio => self.a / self.v.max(EPSILON),
            Metric::VaRatio => self.v / self.a.max(EPSILON),
            Metric::Kurtosis => self.kurtosis,
            Metric::CrestFactor => self.crest_factor,
            Metric::Temperature => self.temperature,
        }
    }
}

/// Rules for a component family, case-insensitive; empty when unknown.
pub fn rules_for(component: &str) -> &'static [InitiatorRule] {
    INITIATOR_TABLE
        .iter()
        .find(|c| c.component.eq_ignore_ascii_case(component))
        .map_or(&[], |c| c.rules)
}

macro_rules! op {
    (>=) => {
        Comparison::Ge
    };
    (<=) => {
        Comparison::Le
    };
    (>) => {
        Comparison::Gt
    };
    (<) => {
        Comparison::Lt
    };
}

macro_rules! cond {
    ($metric:ident $op:tt $threshold:expr) => {
        Condition {
            metric: Metric::$metric,
            op: op!($op),
            threshold: $threshold,
        }
    };
}

macro_rules! rule {
    ($id:literal, $initiator:literal, $diagnosis:literal,
     [$($m:ident $op:tt $t:expr),+ $(,)?],
     or [$($om:ident $oop:tt $ot:expr),+ $(,)?],
     $severity:expr) => {
        InitiatorRule {
            rule_id: $id,
            initiator: $initiator,
            diagnosis: $diagnosis,
            conditions: &[$(cond!($m $op $t)),+],
            fallback: &[$(cond!($om $oop $ot)),+],
            severity_base: $severity,
        }
    };
    ($id:literal, $initiator:literal, $diagnosis:literal,
     [$($m:ident $op:tt $t:expr),+ $(,)?],
     $severity:expr) => {
        InitiatorRule {
            rule_id: $id,
            initiator: $initiator,
            diagnosis: $diagnosis,
            conditions: &[$(cond!($m $op $t)),+],
            fallback: &[],
            severity_base: $severity,
        }
    };
}

/// Anti-friction bearings.
const AFB: &[InitiatorRule] = &[
    rule!("AFB01", "Incorrect Preload - High",
        "Excessive bearing preload increasing axial stiffness",
        [AhRatio >= 1.2, VhRatio < 0.8], 0.6),
    rule!("AFB02", "Wrong Clearance",
        "Incorrect internal clearance shifts stiffness and load zones",
        [HvRatio >= 1.6], or [HvRatio < 0.6], 0.5),
    rule!("AFB03", "Lubrication Starvation",
        "Film collapse; metal-to-metal contact generating HF impacts",
        [HvRatio >= 0.9, HvRatio <= 1.1, Kurtosis >= 5.0], 0.8),
    rule!("AFB04", "Wrong Lubricant Viscosity",
        "Viscosity mismatch altering damping and film thickness",
        [HvRatio >= 0.9, HvRatio <= 1.1, Temperature >= 50.0], 0.5),
    rule!("AFB05", "Contamination",
        "Particles interrupt film causing micro impacts",
        [Kurtosis >= 5.0, CrestFactor >= 2.0], 0.6),
    rule!("AFB06", "Shaft Imbalance",
        "Centrifugal force produces radial unbalance load",
        [HvRatio >= 1.2, HvRatio <= 2.0, AhRatio < 0.3], 0.5),
    rule!("AFB07", "Coupling Misalignment",
        "Misalignment loads axial direction strongly",
        [AhRatio >= 1.3, A >= 0.5], 0.6),
    rule!("AFB08", "Overloading",
        "High load causing higher radial force",
        [HvRatio >= 1.1, Temperature >= 65.0], 0.6),
    rule!("AFB09", "Resonance",
        "Operating speed near natural frequency",
        [H >= 3.0, HvRatio >= 3.0], 0.8),
    rule!("AFB10", "Soft Foot",
        "Uneven support changing vertical stiffness",
        [VhRatio >= 1.4, AvRatio < 0.3], 0.5),
    rule!("AFB11", "Poor Surface Finish",
        "Rough raceway creates micro-impacts",
        [Kurtosis >= 5.0, CrestFactor >= 2.5], 0.5),
    rule!("AFB12", "VFD Bearing Currents",
        "Shaft voltage discharge causing EDM pitting",
        [CrestFactor >= 3.0, Kurtosis >= 6.0], 0.7),
    rule!("AFB13", "Incorrect Mounting",
        "Mounting distortion shifts load zones",
        [HvRatio >= 1.5, AhRatio < 0.5], 0.5),
    rule!("AFB14", "Thermal Expansion Effects",
        "Axial thermal growth increases thrust load",
        [AhRatio >= 1.1, Temperature >= 60.0], 0.5),
    rule!("AFB15", "False Brinelling",
        "Micro-pitting under static vibration",
        [H < 0.2, V < 0.2, Kurtosis >= 7.0], 0.4),
    rule!("AFB16", "Early Micro-Slip",
        "Micro-slip increases friction and heat",
        [HvRatio >= 0.9, HvRatio <= 1.1, Temperature >= 50.0], 0.4),
];

/// Plain journal (sleeve) bearings.
const JOURNAL: &[InitiatorRule] = &[
    rule!("JB01", "Low Oil Film Thickness",
        "Reduced film thickness increases metal contact",
        [HvRatio >= 1.3, Temperature >= 70.0], 0.6),
    rule!("JB02", "Oil Starvation",
        "Collapsed hydrodynamic wedge causing asperity contact",
        [HvRatio >= 0.9, HvRatio <= 1.1, Kurtosis >= 6.0], 0.9),
    rule!("JB03", "Rotor Instability / Oil Whirl",
        "Oil wedge cross-coupled stiffness generating unstable orbit",
        [HvRatio >= 0.9, HvRatio <= 1.1], 0.7),
    rule!("JB05", "Shaft Misalignment",
        "Misalignment forces axial loading on sleeve",
        [AhRatio >= 1.2], 0.6),
    rule!("JB06", "Excessive Clearance",
        "Excess clearance causes rotor movement and impacts",
        [HvRatio >= 2.0], 0.6),
    rule!("JB08", "Rotor Rubbing",
        "Shaft contacts bearing metal or thrust face",
        [AhRatio >= 0.7, Kurtosis >= 7.0], 0.9),
    rule!("JB12", "Heavy Rotor Load",
        "Increased load causing larger eccentricity",
        [HvRatio >= 1.4], 0.5),
];

/// Tilting-pad journal bearings.
const TPJB: &[InitiatorRule] = &[
    rule!("TPJB01", "Pad Flutter",
        "Pad oscillation due to low preload or light load",
        [HvRatio >= 0.9, HvRatio <= 1.1], 0.6),
    rule!("TPJB02", "Preload Loss",
        "Reduced pad preload allowing excessive shaft motion",
        [HvRatio >= 1.3, AhRatio < 0.3], 0.7),
    rule!("TPJB03", "Pad Pivot Wear",
        "Pivot point degradation altering pad geometry",
        [Kurtosis >= 4.0, CrestFactor >= 2.5], 0.6),
    rule!("TPJB04", "Oil Starvation",
        "Insufficient oil flow to pads causing film collapse",
        [Temperature >= 75.0, HvRatio >= 0.9, HvRatio <= 1.1], 0.9),
    rule!("TPJB05", "Babbitt Fatigue",
        "Babbitt overlay fatigue cracking under cyclic load",
        [Kurtosis >= 5.0, Temperature >= 65.0], 0.8),
    rule!("TPJB06", "Thermal Distortion",
        "Pad thermal bowing from uneven heat distribution",
        [Temperature >= 70.0, AhRatio >= 0.7, V >= 1.5], 0.5),
    rule!("TPJB07", "Shaft Misalignment",
        "Misalignment loading pads unevenly",
        [AhRatio >= 1.2], 0.6),
    rule!("TPJB08", "Excessive Clearance",
        "Large clearance ratio causing instability",
        [HvRatio >= 2.0], 0.6),
    rule!("TPJB09", "Oil Whip (Severe)",
        "Cross-coupled stiffness generating forward whirl above 2x threshold",
        [HvRatio >= 0.9, HvRatio <= 1.1, Kurtosis >= 6.0], 0.9),
    rule!("TPJB10", "Contamination",
        "Particle contamination in oil scoring pad surface",
        [Kurtosis >= 5.0, CrestFactor >= 3.0], 0.6),
    rule!("TPJB11", "Overload",
        "Bearing loaded beyond design capacity",
        [HvRatio >= 1.4, Temperature >= 70.0], 0.7),
    rule!("TPJB12", "Rotor Rub",
        "Shaft contacting pad or guard during transient",
        [AhRatio >= 0.7, Kurtosis >= 7.0], 0.9),
];

const COUPLING: &[InitiatorRule] = &[
    rule!("COUP01", "Parallel Misalignment",
        "Radial offset between shafts",
        [HvRatio >= 1.3, AhRatio < 0.2], 0.6),
    rule!("COUP02", "Angular Misalignment",
        "Angular offset at coupling face",
        [AhRatio >= 1.3], 0.6),
    rule!("COUP05", "Coupling Backlash / Wear",
        "Wear at coupling interface causing impacts",
        [AhRatio >= 0.8, Kurtosis >= 4.0], 0.5),
];

const AC_MOTOR: &[InitiatorRule] = &[
    rule!("AC01", "Rotor Imbalance",
        "Unbalanced rotor mass",
        [HvRatio >= 1.2, HvRatio <= 2.5, AhRatio < 0.3], 0.5),
    rule!("AC03", "Air-Gap Eccentricity",
        "Non-uniform air gap causing electromagnetic force imbalance",
        [HvRatio >= 2.0, AhRatio < 0.2], 0.6),
    rule!("AC04", "Soft Foot",
        "Uneven motor support",
        [VhRatio >= 1.5, AhRatio < 0.5], 0.5),
    rule!("AC05", "Misalignment",
        "Coupling misalignment loading axial direction",
        [AhRatio >= 1.3], 0.6),
    rule!("AC07", "Motor Bearing Fault",
        "Bearing defect in motor",
        [HvRatio >= 0.9, HvRatio <= 1.1], 0.7),
];

const DC_MOTOR: &[InitiatorRule] = &[
    rule!("DC01", "Commutator Roughness",
        "Commutator surface wear causing brush bounce and arcing",
        [Kurtosis >= 4.0, CrestFactor >= 2.5], 0.5),
    rule!("DC02", "Brush Wear",
        "Worn brushes causing intermittent contact and sparking",
        [Kurtosis >= 5.0, HvRatio >= 0.9, HvRatio <= 1.1], 0.6),
    rule!("DC03", "Armature Imbalance",
        "Unbalanced armature producing radial vibration at 1x",
        [HvRatio >= 1.2, AhRatio < 0.3], 0.5),
    rule!("DC04", "Field Winding Fault",
        "Asymmetric field causing electromagnetic unbalance",
        [HvRatio >= 2.0], 0.7),
    rule!("DC05", "Bearing Fault",
        "Motor bearing defect generating broadband vibration",
        [Kurtosis >= 6.0, CrestFactor >= 3.0], 0.7),
    rule!("DC06", "Misalignment",
        "Shaft misalignment loading axial direction",
        [AhRatio >= 1.3], 0.6),
    rule!("DC07", "Commutator Eccentricity",
        "Out-of-round commutator causing periodic brush lift",
        [HvRatio >= 1.5, Kurtosis >= 4.0], 0.6),
];

const FOUNDATION: &[InitiatorRule] = &[
    rule!("FND01", "Soft Foot",
        "Uneven support surface",
        [VhRatio >= 1.4], 0.5),
    rule!("FND02", "Base Looseness",
        "Loose base causing impacts",
        [HvRatio >= 1.6], 0.6),
    rule!("FND03", "Structural Resonance",
        "Structure excited at natural frequency",
        [HvRatio >= 3.0], 0.7),
];

const GEARS: &[InitiatorRule] = &[
    rule!("GEAR01", "Uniform Tooth Wear",
        "General gear mesh wear",
        [HvRatio >= 1.2, H >= 2.0], 0.5),
    rule!("GEAR02", "Localized Pitting",
        "Localized tooth surface pitting",
        [Kurtosis >= 4.0], 0.6),
    rule!("GEAR04", "Gear Misalignment",
        "Axial misalignment in gearbox",
        [AhRatio >= 1.2, HvRatio >= 1.2], 0.6),
    rule!("GEAR10", "Tooth Chipping / Breakage",
        "Early tooth breakage",
        [Kurtosis >= 5.0], 0.8),
];

const FLUID_FLOW: &[InitiatorRule] = &[
    rule!("FL001", "Micro-bubble Formation",
        "Early cavitation at impeller eye",
        [HvRatio >= 0.9, HvRatio <= 1.2], 0.5),
    rule!("FL002", "Continuous Cavitation",
        "Severe cavitation with bubble collapse",
        [H >= 1.3, V >= 1.3, CrestFactor >= 3.0], 0.8),
    rule!("FL006", "Water Hammer",
        "Sudden pressure impact waves",
        [CrestFactor >= 4.5], 0.9),
];

const BELTS: &[InitiatorRule] = &[
    rule!("B01", "Belt Tension Incorrect",
        "Improper belt tension causing slip or excessive load",
        [HvRatio >= 1.3], 0.5),
    rule!("B02", "Belt Wear / Cracking",
        "Belt surface degradation generating impulses at belt frequency",
        [Kurtosis >= 4.0, CrestFactor >= 2.0], 0.6),
    rule!("B03", "Sheave Misalignment",
        "Pulley misalignment causing axial belt walk and wear",
        [AhRatio >= 1.2], 0.5),
    rule!("B04", "Sheave Wear",
        "Worn pulley groove altering belt contact geometry",
        [HvRatio >= 1.4, Kurtosis >= 3.5], 0.5),
    rule!("B05", "Belt Resonance",
        "Belt span natural frequency excited by running speed",
        [H >= 2.0, HvRatio >= 2.5], 0.7),
];

const CHAINS: &[InitiatorRule] = &[
    rule!("C01", "Chain Wear / Elongation",
        "Link wear causing pitch elongation and meshing impacts",
        [Kurtosis >= 4.0], 0.5),
    rule!("C02", "Chain Tension Incorrect",
        "Improper tension causing chain slap or excessive load",
        [HvRatio >= 1.3, Kurtosis >= 3.5], 0.5),
    rule!("C03", "Sprocket Wear",
        "Worn sprocket teeth causing irregular meshing",
        [Kurtosis >= 5.0, CrestFactor >= 2.5], 0.6),
    rule!("C04", "Chain Misalignment",
        "Sprocket misalignment causing lateral chain loading",
        [AhRatio >= 1.2], 0.5),
];

const SHAFTS: &[InitiatorRule] = &[
    rule!("S01", "Uneven Mass Distribution",
        "Shaft mass imbalance",
        [HvRatio >= 1.2, AhRatio < 0.3], 0.5),
    rule!("S03", "Coupling Face Misalignment",
        "Coupling faces not parallel",
        [AhRatio >= 1.3, AvRatio >= 1.3], 0.6),
    rule!("S05", "Shaft Crack",
        "Propagating transverse crack, catastrophic risk",
        [AhRatio >= 0.8, Kurtosis >= 4.0], 0.95),
];

pub static INITIATOR_TABLE: &[ComponentRules] = &[
    ComponentRules { component: "afb", rules: AFB },
    ComponentRules { component: "journal", rules: JOURNAL },
    ComponentRules { component: "tpjb", rules: TPJB },
    ComponentRules { component: "coupling", rules: COUPLING },
    ComponentRules { component: "ac_motor", rules: AC_MOTOR },
    ComponentRules { component: "dc_motor", rules: DC_MOTOR },
    ComponentRules { component: "foundation", rules: FOUNDATION },
    ComponentRules { component: "gears", rules: GEARS },
    ComponentRules { component: "fluid_flow", rules: FLUID_FLOW },
    ComponentRules { component: "belts", rules: BELTS },
    ComponentRules { component: "chains", rules: CHAINS },
    ComponentRules { component: "shafts", rules: SHAFTS },
];
