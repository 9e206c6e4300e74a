//! # 元素周期表
//!
//! 元素符号与原子序数的双向映射，用于在带元素名的结构与物种编号之间转换。
//!
//! ## 依赖关系
//! - 被 `models/structure.rs` 与 `parsers/poscar.rs` 使用

/// 元素符号表，下标 + 1 即原子序数
const SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// 由元素符号获取原子序数
///
/// 忽略 VASP 常见的后缀（如 `Fe_pv`, `O_s`, `Ti/`）。
pub fn atomic_number(symbol: &str) -> Option<u32> {
    let bare = symbol
        .split(|c: char| c == '_' || c == '/' || c == ':')
        .next()
        .unwrap_or(symbol)
        .trim();
    SYMBOLS
        .iter()
        .position(|s| *s == bare)
        .map(|i| i as u32 + 1)
}

/// 由原子序数获取元素符号
pub fn symbol(z: u32) -> Option<&'static str> {
    if z == 0 {
        return None;
    }
    SYMBOLS.get(z as usize - 1).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_number() {
        assert_eq!(atomic_number("H"), Some(1));
        assert_eq!(atomic_number("Si"), Some(14));
        assert_eq!(atomic_number("Fe_pv"), Some(26));
        assert_eq!(atomic_number("Og"), Some(118));
        assert_eq!(atomic_number("Xx"), None);
    }

    #[test]
    fn test_symbol() {
        assert_eq!(symbol(8), Some("O"));
        assert_eq!(symbol(0), None);
        assert_eq!(symbol(119), None);
    }
}
