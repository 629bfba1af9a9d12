//! Unit lookup tables keyed by source column name.
//!
//! The AGS table covers AGS v4.0.3 through v4.1.1 (the `SCDG` group is absent
//! from v4.1.1). Neither table is exhaustive. An empty unit string means the
//! quantity is dimensionless.

/// Units of AGS measurement columns.
pub static AGS_MEASUREMENT_UNITS: &[(&str, &str)] = &[
    ("SCPT_DPTH", "m"),
    ("SCPT_RES", "MPa"),
    ("SCPT_FRES", "MPa"),
    ("SCPT_PWP1", "MPa"),
    ("SCPT_PWP2", "MPa"),
    ("SCPT_PWP3", "MPa"),
    ("SCPT_CON", "uS / cm"),
    ("SCPT_TEMP", "celsius"),
    ("SCPT_SLP1", "degrees"),
    ("SCPT_SLP2", "degrees"),
    ("SCPT_REDX", "mV"),
    ("SCPT_MAGT", "nT"),
    ("SCPT_MAGX", "nT"),
    ("SCPT_MAGY", "nT"),
    ("SCPT_MAGZ", "nT"),
    ("SCPT_NGAM", "Hz"),
    ("SCPT_QT", "MPa"),
    ("SCPT_FT", "MPa"),
    ("SCPT_QE", "MPa"),
    ("SCPT_BDEN", "Mg / m ** 3"),
    ("SCPT_CPO", "kPa"),
    ("SCPT_CPOD", "kPa"),
    ("SCPT_QNET", "MPa"),
    ("SCPT_EXPP", "MPa"),
    ("SCPT_ISPP", "MPa"),
    ("SCPP_TOP", "m"),
    ("SCPP_BASE", "m"),
    ("SCPP_CSU", "kPa"),
    ("SCPP_CPHI", "degrees"),
    ("SCDG_DPTH", "m"),
    ("SCDG_PWPI", "MPa"),
    ("SCDG_PWPE", "MPa"),
    ("SCDG_T", "s"),
    ("SCDG_CV", "m ** 2 / year"),
    ("SCDG_CH", "m ** 2 / year"),
];

/// Units of GEF CPT measurement columns.
pub static GEF_MEASUREMENT_UNITS: &[(&str, &str)] = &[
    ("penetrationLength", "m"),
    ("coneResistance", "MPa"),
    ("localFriction", "MPa"),
    ("frictionRatio", "%"),
    ("porePressureU1", "MPa"),
    ("porePressureU2", "MPa"),
    ("porePressureU3", "MPa"),
    ("inclinationResultant", "degrees"),
    ("inclinationNS", "degrees"),
    ("inclinationEW", "degrees"),
    ("depth", "m"),
    ("elapsedTime", "s"),
    ("correctedConeResistance", "MPa"),
    ("netConeResistance", "MPa"),
    ("poreRatio", ""),
    ("coneResistanceRatio", ""),
    ("soilDensity", "kN/m3"),
    ("porePressure", "MPa"),
    ("verticalPorePressureTotal", "MPa"),
    ("verticalPorePressureEffective", "MPa"),
    ("inclinationX", "degrees"),
    ("inclinationY", "degrees"),
    ("electricalConductivity", "S/m"),
    ("magneticFieldStrengthX", "nT"),
    ("magneticFieldStrengthY", "nT"),
    ("magneticFieldStrengthZ", "nT"),
    ("magneticFieldStrengthTotal", "nT"),
    ("magneticInclination", "degrees"),
    ("magneticDeclination", "degrees"),
];

/// Source format whose column naming a unit lookup follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementUnits {
    /// AGS 4 group/heading names.
    Ags,
    /// GEF / BRO-XML CPT names.
    Gef,
}

impl MeasurementUnits {
    /// The static table for this format.
    pub const fn table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Ags => AGS_MEASUREMENT_UNITS,
            Self::Gef => GEF_MEASUREMENT_UNITS,
        }
    }

    /// Unit of a column, or `""` when the column is unknown or dimensionless.
    pub fn unit_for(self, column: &str) -> &'static str {
        self.table()
            .iter()
            .find(|(name, _)| *name == column)
            .map_or("", |&(_, unit)| unit)
    }
}
