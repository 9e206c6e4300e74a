//! # Bravais 晶格分类
//!
//! 晶系族 (`CrystalFamily`)、14 种 Bravais 晶格加底心 oA 设置 (`BravaisLattice`)，
//! 以及细分的 29 种扩展情形 (`ExtendedCase`)。
//!
//! 所有标签序列化为字符串，例如 `"cP"`、`"oA2"`。
//!
//! ## 依赖关系
//! - 被 `symmetry/` 与 `kpath/` 使用
//! - 使用 `serde` 序列化为字符串标签

use crate::error::{BandpathError, Result};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 晶系族（由空间群号直接决定）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrystalFamily {
    /// 三斜 (1-2)
    #[serde(rename = "a")]
    Triclinic,
    /// 单斜 (3-15)
    #[serde(rename = "m")]
    Monoclinic,
    /// 正交 (16-74)
    #[serde(rename = "o")]
    Orthorhombic,
    /// 四方 (75-142)
    #[serde(rename = "t")]
    Tetragonal,
    /// 六方，含三方 (143-194)
    #[serde(rename = "h")]
    Hexagonal,
    /// 立方 (195-230)
    #[serde(rename = "c")]
    Cubic,
}

impl CrystalFamily {
    /// 由空间群号确定晶系族
    pub fn from_spacegroup(number: u32) -> Result<Self> {
        match number {
            1..=2 => Ok(CrystalFamily::Triclinic),
            3..=15 => Ok(CrystalFamily::Monoclinic),
            16..=74 => Ok(CrystalFamily::Orthorhombic),
            75..=142 => Ok(CrystalFamily::Tetragonal),
            143..=194 => Ok(CrystalFamily::Hexagonal),
            195..=230 => Ok(CrystalFamily::Cubic),
            _ => Err(BandpathError::Classification(format!(
                "space group number {} out of range 1-230",
                number
            ))),
        }
    }

    /// 单字母标记
    pub fn letter(&self) -> char {
        match self {
            CrystalFamily::Triclinic => 'a',
            CrystalFamily::Monoclinic => 'm',
            CrystalFamily::Orthorhombic => 'o',
            CrystalFamily::Tetragonal => 't',
            CrystalFamily::Hexagonal => 'h',
            CrystalFamily::Cubic => 'c',
        }
    }
}

/// Bravais 晶格类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BravaisLattice {
    #[serde(rename = "cP")]
    CP,
    #[serde(rename = "cF")]
    CF,
    #[serde(rename = "cI")]
    CI,
    #[serde(rename = "tP")]
    TP,
    #[serde(rename = "tI")]
    TI,
    #[serde(rename = "oP")]
    OP,
    #[serde(rename = "oF")]
    OF,
    #[serde(rename = "oI")]
    OI,
    #[serde(rename = "oC")]
    OC,
    #[serde(rename = "oA")]
    OA,
    #[serde(rename = "hP")]
    HP,
    #[serde(rename = "hR")]
    HR,
    #[serde(rename = "mP")]
    MP,
    #[serde(rename = "mC")]
    MC,
    #[serde(rename = "aP")]
    AP,
}

impl BravaisLattice {
    pub const ALL: [BravaisLattice; 15] = [
        BravaisLattice::CP,
        BravaisLattice::CF,
        BravaisLattice::CI,
        BravaisLattice::TP,
        BravaisLattice::TI,
        BravaisLattice::OP,
        BravaisLattice::OF,
        BravaisLattice::OI,
        BravaisLattice::OC,
        BravaisLattice::OA,
        BravaisLattice::HP,
        BravaisLattice::HR,
        BravaisLattice::MP,
        BravaisLattice::MC,
        BravaisLattice::AP,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BravaisLattice::CP => "cP",
            BravaisLattice::CF => "cF",
            BravaisLattice::CI => "cI",
            BravaisLattice::TP => "tP",
            BravaisLattice::TI => "tI",
            BravaisLattice::OP => "oP",
            BravaisLattice::OF => "oF",
            BravaisLattice::OI => "oI",
            BravaisLattice::OC => "oC",
            BravaisLattice::OA => "oA",
            BravaisLattice::HP => "hP",
            BravaisLattice::HR => "hR",
            BravaisLattice::MP => "mP",
            BravaisLattice::MC => "mC",
            BravaisLattice::AP => "aP",
        }
    }

    /// 由晶系族与心化字母组合，未知组合返回 `None`
    pub fn from_family_centering(family: CrystalFamily, centering: char) -> Option<Self> {
        let label = format!("{}{}", family.letter(), centering);
        label.parse().ok()
    }

    /// 所属晶系族
    pub fn family(&self) -> CrystalFamily {
        match self {
            BravaisLattice::CP | BravaisLattice::CF | BravaisLattice::CI => CrystalFamily::Cubic,
            BravaisLattice::TP | BravaisLattice::TI => CrystalFamily::Tetragonal,
            BravaisLattice::OP
            | BravaisLattice::OF
            | BravaisLattice::OI
            | BravaisLattice::OC
            | BravaisLattice::OA => CrystalFamily::Orthorhombic,
            BravaisLattice::HP | BravaisLattice::HR => CrystalFamily::Hexagonal,
            BravaisLattice::MP | BravaisLattice::MC => CrystalFamily::Monoclinic,
            BravaisLattice::AP => CrystalFamily::Triclinic,
        }
    }
}

impl fmt::Display for BravaisLattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BravaisLattice {
    type Err = BandpathError;

    fn from_str(s: &str) -> Result<Self> {
        BravaisLattice::ALL
            .iter()
            .copied()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| BandpathError::InvalidArgument(format!("unknown Bravais lattice '{}'", s)))
    }
}

/// 扩展 Bravais 情形：决定使用哪一套路径模板
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtendedCase {
    // ─────────────────────────────────────────────────────────────
    // 立方
    // ─────────────────────────────────────────────────────────────
    #[serde(rename = "cP1")]
    CP1,
    #[serde(rename = "cP2")]
    CP2,
    #[serde(rename = "cF1")]
    CF1,
    #[serde(rename = "cF2")]
    CF2,
    #[serde(rename = "cI1")]
    CI1,

    // ─────────────────────────────────────────────────────────────
    // 四方
    // ─────────────────────────────────────────────────────────────
    #[serde(rename = "tP1")]
    TP1,
    #[serde(rename = "tI1")]
    TI1,
    #[serde(rename = "tI2")]
    TI2,

    // ─────────────────────────────────────────────────────────────
    // 正交
    // ─────────────────────────────────────────────────────────────
    #[serde(rename = "oP1")]
    OP1,
    #[serde(rename = "oF1")]
    OF1,
    #[serde(rename = "oF2")]
    OF2,
    #[serde(rename = "oF3")]
    OF3,
    #[serde(rename = "oI1")]
    OI1,
    #[serde(rename = "oI2")]
    OI2,
    #[serde(rename = "oI3")]
    OI3,
    #[serde(rename = "oC1")]
    OC1,
    #[serde(rename = "oC2")]
    OC2,
    #[serde(rename = "oA1")]
    OA1,
    #[serde(rename = "oA2")]
    OA2,

    // ─────────────────────────────────────────────────────────────
    // 六方 / 三方
    // ─────────────────────────────────────────────────────────────
    #[serde(rename = "hP1")]
    HP1,
    #[serde(rename = "hP2")]
    HP2,
    #[serde(rename = "hR1")]
    HR1,
    #[serde(rename = "hR2")]
    HR2,

    // ─────────────────────────────────────────────────────────────
    // 单斜
    // ─────────────────────────────────────────────────────────────
    #[serde(rename = "mP1")]
    MP1,
    #[serde(rename = "mC1")]
    MC1,
    #[serde(rename = "mC2")]
    MC2,
    #[serde(rename = "mC3")]
    MC3,

    // ─────────────────────────────────────────────────────────────
    // 三斜
    // ─────────────────────────────────────────────────────────────
    #[serde(rename = "aP2")]
    AP2,
    #[serde(rename = "aP3")]
    AP3,
}

impl ExtendedCase {
    pub const ALL: [ExtendedCase; 29] = [
        ExtendedCase::CP1,
        ExtendedCase::CP2,
        ExtendedCase::CF1,
        ExtendedCase::CF2,
        ExtendedCase::CI1,
        ExtendedCase::TP1,
        ExtendedCase::TI1,
        ExtendedCase::TI2,
        ExtendedCase::OP1,
        ExtendedCase::OF1,
        ExtendedCase::OF2,
        ExtendedCase::OF3,
        ExtendedCase::OI1,
        ExtendedCase::OI2,
        ExtendedCase::OI3,
        ExtendedCase::OC1,
        ExtendedCase::OC2,
        ExtendedCase::OA1,
        ExtendedCase::OA2,
        ExtendedCase::HP1,
        ExtendedCase::HP2,
        ExtendedCase::HR1,
        ExtendedCase::HR2,
        ExtendedCase::MP1,
        ExtendedCase::MC1,
        ExtendedCase::MC2,
        ExtendedCase::MC3,
        ExtendedCase::AP2,
        ExtendedCase::AP3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtendedCase::CP1 => "cP1",
            ExtendedCase::CP2 => "cP2",
            ExtendedCase::CF1 => "cF1",
            ExtendedCase::CF2 => "cF2",
            ExtendedCase::CI1 => "cI1",
            ExtendedCase::TP1 => "tP1",
            ExtendedCase::TI1 => "tI1",
            ExtendedCase::TI2 => "tI2",
            ExtendedCase::OP1 => "oP1",
            ExtendedCase::OF1 => "oF1",
            ExtendedCase::OF2 => "oF2",
            ExtendedCase::OF3 => "oF3",
            ExtendedCase::OI1 => "oI1",
            ExtendedCase::OI2 => "oI2",
            ExtendedCase::OI3 => "oI3",
            ExtendedCase::OC1 => "oC1",
            ExtendedCase::OC2 => "oC2",
            ExtendedCase::OA1 => "oA1",
            ExtendedCase::OA2 => "oA2",
            ExtendedCase::HP1 => "hP1",
            ExtendedCase::HP2 => "hP2",
            ExtendedCase::HR1 => "hR1",
            ExtendedCase::HR2 => "hR2",
            ExtendedCase::MP1 => "mP1",
            ExtendedCase::MC1 => "mC1",
            ExtendedCase::MC2 => "mC2",
            ExtendedCase::MC3 => "mC3",
            ExtendedCase::AP2 => "aP2",
            ExtendedCase::AP3 => "aP3",
        }
    }

    /// 对应的 Bravais 晶格（去掉末尾数字）
    pub fn bravais(&self) -> BravaisLattice {
        match self {
            ExtendedCase::CP1 | ExtendedCase::CP2 => BravaisLattice::CP,
            ExtendedCase::CF1 | ExtendedCase::CF2 => BravaisLattice::CF,
            ExtendedCase::CI1 => BravaisLattice::CI,
            ExtendedCase::TP1 => BravaisLattice::TP,
            ExtendedCase::TI1 | ExtendedCase::TI2 => BravaisLattice::TI,
            ExtendedCase::OP1 => BravaisLattice::OP,
            ExtendedCase::OF1 | ExtendedCase::OF2 | ExtendedCase::OF3 => BravaisLattice::OF,
            ExtendedCase::OI1 | ExtendedCase::OI2 | ExtendedCase::OI3 => BravaisLattice::OI,
            ExtendedCase::OC1 | ExtendedCase::OC2 => BravaisLattice::OC,
            ExtendedCase::OA1 | ExtendedCase::OA2 => BravaisLattice::OA,
            ExtendedCase::HP1 | ExtendedCase::HP2 => BravaisLattice::HP,
            ExtendedCase::HR1 | ExtendedCase::HR2 => BravaisLattice::HR,
            ExtendedCase::MP1 => BravaisLattice::MP,
            ExtendedCase::MC1 | ExtendedCase::MC2 | ExtendedCase::MC3 => BravaisLattice::MC,
            ExtendedCase::AP2 | ExtendedCase::AP3 => BravaisLattice::AP,
        }
    }
}

impl fmt::Display for ExtendedCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExtendedCase {
    type Err = BandpathError;

    fn from_str(s: &str) -> Result<Self> {
        ExtendedCase::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| BandpathError::InvalidArgument(format!("unknown extended Bravais case '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_from_spacegroup() {
        assert_eq!(CrystalFamily::from_spacegroup(1).unwrap(), CrystalFamily::Triclinic);
        assert_eq!(CrystalFamily::from_spacegroup(15).unwrap(), CrystalFamily::Monoclinic);
        assert_eq!(CrystalFamily::from_spacegroup(74).unwrap(), CrystalFamily::Orthorhombic);
        assert_eq!(CrystalFamily::from_spacegroup(142).unwrap(), CrystalFamily::Tetragonal);
        assert_eq!(CrystalFamily::from_spacegroup(194).unwrap(), CrystalFamily::Hexagonal);
        assert_eq!(CrystalFamily::from_spacegroup(230).unwrap(), CrystalFamily::Cubic);
        assert!(CrystalFamily::from_spacegroup(0).is_err());
        assert!(CrystalFamily::from_spacegroup(231).is_err());
    }

    #[test]
    fn test_extended_case_prefix_matches_bravais() {
        for case in ExtendedCase::ALL {
            assert!(case.as_str().starts_with(case.bravais().as_str()));
        }
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("oA2".parse::<ExtendedCase>().unwrap(), ExtendedCase::OA2);
        assert_eq!("hR".parse::<BravaisLattice>().unwrap(), BravaisLattice::HR);
        assert!("aP1".parse::<ExtendedCase>().is_err());
        assert_eq!(
            BravaisLattice::from_family_centering(CrystalFamily::Orthorhombic, 'A'),
            Some(BravaisLattice::OA)
        );
        assert_eq!(
            BravaisLattice::from_family_centering(CrystalFamily::Cubic, 'C'),
            None
        );
    }

    #[test]
    fn test_serialize_as_label() {
        let json = serde_json::to_string(&ExtendedCase::MC3).unwrap();
        assert_eq!(json, "\"mC3\"");
        let parsed: BravaisLattice = serde_json::from_str("\"tI\"").unwrap();
        assert_eq!(parsed, BravaisLattice::TI);
    }
}
