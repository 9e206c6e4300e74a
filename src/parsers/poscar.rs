//! # VASP POSCAR 格式读写
//!
//! 解析 VASP POSCAR/CONTCAR 文件，并将原胞写回 POSCAR。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor (负值表示目标体积)
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols (VASP 5+)
//! n1 n2 ...              # number of atoms per element
//! Selective dynamics     # optional
//! Direct/Cartesian       # coordinate type
//! x1 y1 z1               # atom positions
//! ...
//! ```
//!
//! VASP 4 文件没有元素行，元素名取第一行注释中的符号（若个数匹配），
//! 否则使用占位名 `X1`, `X2`, ...
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 与 `commands/` 使用
//! - 使用 `models/structure.rs`, `models/elements.rs`

use crate::error::{BandpathError, Result};
use crate::models::{elements, Atom, Crystal, Lattice};
use std::fs;
use std::path::Path;

fn parse_error(path: &str, reason: impl Into<String>) -> BandpathError {
    BandpathError::ParseError {
        format: "poscar".to_string(),
        path: path.to_string(),
        reason: reason.into(),
    }
}

/// 读取并解析 POSCAR/CONTCAR 文件；结构名缺省为文件名
pub fn parse_poscar_file(path: &Path) -> Result<Crystal> {
    let content = fs::read_to_string(path).map_err(|e| BandpathError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("POSCAR");

    parse_poscar_content(&content, stem).map_err(|e| match e {
        BandpathError::ParseError { format, reason, .. } => BandpathError::ParseError {
            format,
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })
}

/// 逐行读取，记录行号用于报错
struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    peeked: Option<(usize, &'a str)>,
    source: String,
}

impl<'a> Lines<'a> {
    fn new(content: &'a str, source: &str) -> Self {
        Self {
            inner: content.lines().enumerate(),
            peeked: None,
            source: source.to_string(),
        }
    }

    fn error(&self, reason: impl Into<String>) -> BandpathError {
        parse_error(&self.source, reason)
    }

    fn peek(&mut self) -> Option<&'a str> {
        if self.peeked.is_none() {
            self.peeked = self.inner.next();
        }
        self.peeked.map(|(_, line)| line)
    }

    /// 下一行 (1 起的行号, 内容)
    fn next(&mut self, what: &str) -> Result<(usize, &'a str)> {
        let next = self.peeked.take().or_else(|| self.inner.next());
        next.map(|(i, line)| (i + 1, line))
            .ok_or_else(|| self.error(format!("Unexpected end of file, expected {}", what)))
    }

    fn vector(&mut self, what: &str) -> Result<[f64; 3]> {
        let (number, line) = self.next(what)?;
        let mut fields = line.split_whitespace().map(str::parse::<f64>);
        match (fields.next(), fields.next(), fields.next()) {
            (Some(Ok(x)), Some(Ok(y)), Some(Ok(z))) => Ok([x, y, z]),
            _ => Err(self.error(format!("Invalid {} at line {}: '{}'", what, number, line.trim()))),
        }
    }
}

/// 从字符串内容解析 POSCAR；`default_name` 用于空注释行与报错
pub fn parse_poscar_content(content: &str, default_name: &str) -> Result<Crystal> {
    let mut lines = Lines::new(content, default_name);

    let (_, comment) = lines.next("comment line")?;
    let comment = comment.trim();
    let name = if comment.is_empty() { default_name } else { comment };
    lines.source = name.to_string();

    let (number, scale_line) = lines.next("scaling factor")?;
    let scale: f64 = scale_line
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .filter(|&x: &f64| x != 0.0)
        .ok_or_else(|| {
            lines.error(format!("Invalid scaling factor at line {}: '{}'", number, scale_line.trim()))
        })?;

    let raw = Lattice::from_vectors([
        lines.vector("lattice vector a")?,
        lines.vector("lattice vector b")?,
        lines.vector("lattice vector c")?,
    ]);
    // 负的缩放因子表示目标体积
    let factor = if scale > 0.0 {
        scale
    } else {
        (-scale / raw.volume().abs()).cbrt()
    };
    let lattice = Lattice::from_vectors(raw.matrix.map(|row| row.map(|x| x * factor)));

    // VASP 5 在原子数之前多一行元素符号
    let (number, line) = lines.next("atom counts")?;
    let first = line.split_whitespace().next().unwrap_or_default();
    let (symbols, (number, count_line)) = if first.parse::<usize>().is_ok() {
        (None, (number, line))
    } else {
        let symbols: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        (Some(symbols), lines.next("atom counts")?)
    };

    let counts: Vec<usize> = count_line
        .split_whitespace()
        .map(|s| s.parse().ok())
        .collect::<Option<Vec<usize>>>()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            lines.error(format!("Invalid atom counts at line {}: '{}'", number, count_line.trim()))
        })?;

    let species = match symbols {
        Some(symbols) if symbols.len() != counts.len() => {
            return Err(lines.error(format!(
                "{} element symbols but {} atom counts",
                symbols.len(),
                counts.len()
            )));
        }
        Some(symbols) => symbols,
        None => vasp4_elements(comment, counts.len()),
    };

    if lines
        .peek()
        .is_some_and(|l| l.trim_start().to_ascii_lowercase().starts_with('s'))
    {
        lines.next("selective dynamics")?;
    }

    let (_, mode) = lines.next("coordinate mode line")?;
    let cartesian = matches!(
        mode.trim_start().chars().next().map(|c| c.to_ascii_lowercase()),
        Some('c') | Some('k')
    );

    let mut atoms = Vec::with_capacity(counts.iter().sum());
    for (element, &count) in species.iter().zip(&counts) {
        for _ in 0..count {
            let v = lines.vector("atom position")?;
            let position = if cartesian {
                lattice.cart_to_frac(v.map(|x| x * factor))?
            } else {
                v
            };
            atoms.push(Atom::new(element.as_str(), position));
        }
    }

    Ok(Crystal::new(name, lattice, atoms))
}

/// VASP 4 文件的元素名：注释行恰好给出每种元素的符号时使用之
fn vasp4_elements(comment: &str, species: usize) -> Vec<String> {
    let symbols: Vec<&str> = comment.split_whitespace().collect();
    if symbols.len() == species && symbols.iter().all(|s| elements::atomic_number(s).is_some()) {
        symbols.into_iter().map(str::to_string).collect()
    } else {
        (0..species).map(|i| format!("X{}", i + 1)).collect()
    }
}

/// 将 Crystal 转换为 VASP 5 POSCAR 字符串（分数坐标，同种元素连续排列）
pub fn to_poscar_string(crystal: &Crystal) -> String {
    // 按元素首次出现的顺序分组
    let mut species: Vec<(&str, Vec<[f64; 3]>)> = Vec::new();
    for atom in &crystal.atoms {
        match species.iter_mut().find(|(el, _)| *el == atom.element) {
            Some((_, positions)) => positions.push(atom.position),
            None => species.push((atom.element.as_str(), vec![atom.position])),
        }
    }

    let vector = |v: &[f64; 3]| format!("  {:16.10}  {:16.10}  {:16.10}\n", v[0], v[1], v[2]);

    let mut out = format!("{}\n1.0\n", crystal.name);
    for row in &crystal.lattice.matrix {
        out.push_str(&vector(row));
    }

    let symbols: Vec<&str> = species.iter().map(|(el, _)| *el).collect();
    let counts: Vec<String> = species.iter().map(|(_, p)| p.len().to_string()).collect();
    out.push_str(&format!("   {}\n", symbols.join("   ")));
    out.push_str(&format!("   {}\n", counts.join("   ")));
    out.push_str("Direct\n");

    for position in species.iter().flat_map(|(_, p)| p.iter()) {
        out.push_str(&vector(position));
    }

    out
}

/// 写出 POSCAR 文件
pub fn write_poscar_file(path: &Path, crystal: &Crystal) -> Result<()> {
    fs::write(path, to_poscar_string(crystal)).map_err(|e| BandpathError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
