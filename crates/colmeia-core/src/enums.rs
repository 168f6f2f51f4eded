//! Choice enums stored as short snake_case values.
//!
//! Every enum exposes the stored value ([`as_str`]), the Portuguese label
//! shown to users ([`label`]), and the full list of variants in display
//! order (`ALL`).
//!
//! [`as_str`]: HiveStatus::as_str
//! [`label`]: HiveStatus::label

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a stored or submitted value matches no variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{value}'")]
pub struct UnknownChoice {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $($variant:ident => ($value:literal, $label:literal),)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }

            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str() == raw)
                    .ok_or_else(|| UnknownChoice {
                        kind: $kind,
                        value: raw.to_string(),
                    })
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Species
// ---------------------------------------------------------------------------

choice_enum! {
    /// Broad bee group a species belongs to.
    SpeciesGroup("species group") {
        ApisMellifera => ("apis_mellifera", "Apis mellifera"),
        Stingless => ("sem_ferrao", "Sem ferrão"),
    }
}

impl Default for SpeciesGroup {
    fn default() -> Self {
        Self::Stingless
    }
}

// ---------------------------------------------------------------------------
// Hive
// ---------------------------------------------------------------------------

choice_enum! {
    /// How a hive came into the owner's hands.
    AcquisitionMethod("acquisition method") {
        Purchase => ("compra", "Compra"),
        Trade => ("troca", "Troca"),
        Division => ("divisao", "Divisão"),
        Capture => ("captura", "Captura"),
        Donation => ("doacao", "Doação"),
    }
}

choice_enum! {
    /// Current situation of a hive.
    HiveStatus("hive status") {
        Productive => ("producao", "Em produção"),
        Observation => ("observacao", "Em observação"),
        Orphan => ("orfa", "Órfã"),
        Dead => ("morta", "Morta"),
        DonatedOrSold => ("doadavendida", "Doada/Vendida"),
        Lost => ("perdida", "Perdida"),
    }
}

impl Default for HiveStatus {
    fn default() -> Self {
        Self::Productive
    }
}

impl HiveStatus {
    /// Hives that still count as part of the operation.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Dead | Self::Lost)
    }
}

// ---------------------------------------------------------------------------
// Revision
// ---------------------------------------------------------------------------

choice_enum! {
    /// Kind of inspection recorded by a revision.
    ReviewType("review type") {
        Routine => ("rotina", "Revisão de rotina"),
        Division => ("divisao", "Divisão"),
        Treatment => ("tratamento", "Tratamento"),
        Feeding => ("alimentacao", "Alimentação"),
        Harvest => ("colheita", "Colheita"),
    }
}

impl Default for ReviewType {
    fn default() -> Self {
        Self::Routine
    }
}

choice_enum! {
    Temperament("temperament") {
        VeryCalm => ("muito_mansa", "Muito mansa"),
        Calm => ("mansa", "Mansa"),
        Medium => ("media", "Média"),
        Skittish => ("arisca", "Arisca"),
        Aggressive => ("agressiva", "Agressiva"),
    }
}

choice_enum! {
    /// Energetic food offered during a feeding revision.
    FeedingEnergyType("feeding energy type") {
        Syrup => ("xarope", "Xarope"),
        ApisHoney => ("mel_apis", "Mel de Apis"),
        StinglessHoney => ("mel_asf", "Mel de ASF"),
    }
}

choice_enum! {
    /// Protein supplement offered during a feeding revision.
    FeedingProteinType("feeding protein type") {
        PollenBonbon => ("bombom_polen", "Bombom de Pólen"),
        SoyBonbon => ("bombom_soja", "Bombom Soja"),
        PollenPaste => ("pasta_polen", "Pasta de Pólen"),
        SoyPaste => ("pasta_soja", "Pasta de Soja"),
    }
}

choice_enum! {
    BroodLevel("brood level") {
        Absent => ("nenhuma", "Nenhuma"),
        Low => ("pouca", "Pouca"),
        Moderate => ("moderada", "Moderada"),
        Abundant => ("abundante", "Abundante"),
    }
}

choice_enum! {
    /// Food and pollen reserves observed in the hive.
    ResourceLevel("resource level") {
        Absent => ("nenhum", "Nenhum"),
        Low => ("pouco", "Pouco"),
        Moderate => ("moderado", "Moderado"),
        Abundant => ("abundante", "Abundante"),
    }
}

choice_enum! {
    ColonyStrength("colony strength") {
        Weak => ("fraca", "Fraca"),
        Medium => ("media", "Média"),
        Strong => ("forte", "Forte"),
    }
}

// ---------------------------------------------------------------------------
// Menu
// ---------------------------------------------------------------------------

choice_enum! {
    /// Audience a menu configuration applies to.
    MenuScope("menu scope") {
        NonSuperuser => ("non_superuser", "Usuários sem privilégio de superusuário"),
    }
}

impl Default for MenuScope {
    fn default() -> Self {
        Self::NonSuperuser
    }
}

choice_enum! {
    MenuItemType("menu item type") {
        Model => ("model", "Modelo do admin"),
        Url => ("url", "Link personalizado"),
    }
}

impl Default for MenuItemType {
    fn default() -> Self {
        Self::Model
    }
}

// ---------------------------------------------------------------------------
// Production dashboard
// ---------------------------------------------------------------------------

choice_enum! {
    /// Product used to order the hive ranking.
    RankMetric("rank metric") {
        Honey => ("mel", "Mel (ml)"),
        Propolis => ("propolis", "Própolis (g)"),
        Wax => ("cera", "Cera (g)"),
        Pollen => ("polen", "Pólen (g)"),
    }
}

impl Default for RankMetric {
    fn default() -> Self {
        Self::Honey
    }
}
