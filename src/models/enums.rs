use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ModelError;

/// A closed set of canonical values. Validators resolve free text against it.
pub trait ClosedDomain: Sized + Copy + 'static {
    /// Wire name of the field this domain constrains.
    const FIELD: &'static str;

    /// Every member, in declaration order.
    fn members() -> &'static [Self];

    /// Canonical wire string.
    fn label(&self) -> &'static str;
}

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde goes through the canonical string, so the wire form is the label.
macro_rules! str_enum {
    ($name:ident, $field:literal { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl ClosedDomain for $name {
            const FIELD: &'static str = $field;

            fn members() -> &'static [Self] {
                Self::ALL
            }

            fn label(&self) -> &'static str {
                self.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: $field.into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

str_enum!(Scale, "scale" {
    Scale25k => "1:25.000",
    Scale50k => "1:50.000",
    Scale100k => "1:100.000",
    Scale250k => "1:250.000",
});

str_enum!(ProductType, "productType" {
    Topographic => "Carta Topográfica",
    Orthoimage => "Carta Ortoimagem",
    Thematic => "Carta Temática",
});

str_enum!(SupplyArea, "supplyArea" {
    First => "1° Centro de Geoinformação",
    Second => "2° Centro de Geoinformação",
    Third => "3° Centro de Geoinformação",
    Fourth => "4° Centro de Geoinformação",
    Fifth => "5° Centro de Geoinformação",
});

str_enum!(Project, "project" {
    SystematicMapping => "Mapeamento Sistemático",
    AmazonCartography => "Cartografia da Amazônia",
    AmazonRadiography => "Radiografia da Amazônia",
    WorldCup2014 => "Copa do Mundo 2014",
    Olympics2016 => "Olimpíadas Rio 2016",
    Rondonia => "Projeto Rondônia",
    Amapa => "Projeto Amapá",
    Bahia => "Projeto Bahia",
    SantaCatarina => "Projeto Santa Catarina",
    RioGrandeDoSul => "Projeto Rio Grande do Sul",
});

str_enum!(SortField, "sortField" {
    PublicationDate => "publicationDate",
    CreationDate => "creationDate",
});

str_enum!(SortDirection, "sortDirection" {
    Asc => "ASC",
    Desc => "DESC",
});

str_enum!(Difficulty, "difficulty" {
    Easy => "easy",
    Medium => "medium",
    Hard => "hard",
});

impl Scale {
    /// Scale whose denominator is `thousands` × 1000 (25 → 1:25.000).
    pub fn from_thousands(thousands: u32) -> Option<Self> {
        match thousands {
            25 => Some(Self::Scale25k),
            50 => Some(Self::Scale50k),
            100 => Some(Self::Scale100k),
            250 => Some(Self::Scale250k),
            _ => None,
        }
    }
}

impl SupplyArea {
    /// Supply center by ordinal number; only 1 through 5 exist.
    pub fn from_ordinal(ordinal: u32) -> Option<Self> {
        match ordinal {
            1 => Some(Self::First),
            2 => Some(Self::Second),
            3 => Some(Self::Third),
            4 => Some(Self::Fourth),
            5 => Some(Self::Fifth),
            _ => None,
        }
    }
}

impl Default for SortField {
    fn default() -> Self {
        Self::PublicationDate
    }
}

impl Default for SortDirection {
    fn default() -> Self {
        Self::Desc
    }
}
