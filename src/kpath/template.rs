//! # 路径模板
//!
//! 每个扩展情形对应三张平行的文本表：
//! - `k_vector_parameters.txt`: 两列 `名称 表达式`，按文件顺序求值
//! - `points.txt`: 四列 `标签 x y z`
//! - `path.txt`: 两列 `起点 终点`
//!
//! 内置表格在编译期通过 `include_str!` 嵌入，也可以从同样布局的目录加载。
//! 加载时检查列数、重复标签与路径中未定义的标签，并把 k 参数表达式
//! 翻译为 `Formula`。
//!
//! ## 依赖关系
//! - 被 `kpath/mod.rs` 与 `commands/cases.rs` 使用
//! - 使用 `kpath/formula.rs`

use super::formula::Formula;
use crate::error::{BandpathError, Result};
use crate::models::ExtendedCase;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const PARAMETERS_FILE: &str = "k_vector_parameters.txt";
pub const POINTS_FILE: &str = "points.txt";
pub const PATH_FILE: &str = "path.txt";

/// k 参数定义
#[derive(Debug, Clone, PartialEq)]
pub struct KParameter {
    pub name: String,
    pub expression: String,
    pub formula: Formula,
}

/// 高对称点定义（三个坐标表达式）
#[derive(Debug, Clone, PartialEq)]
pub struct PointDefinition {
    pub label: String,
    pub coords: [String; 3],
}

/// 单个扩展情形的完整模板
#[derive(Debug, Clone, PartialEq)]
pub struct PathTemplate {
    pub case: ExtendedCase,
    pub parameters: Vec<KParameter>,
    pub points: Vec<PointDefinition>,
    pub path: Vec<(String, String)>,
}

/// 三张原始文本表
struct TemplateTables<'a> {
    parameters: &'a str,
    points: &'a str,
    path: &'a str,
}

macro_rules! builtin_tables {
    ($($case:ident => $dir:literal),* $(,)?) => {
        fn builtin_tables(case: ExtendedCase) -> TemplateTables<'static> {
            match case {
                $(
                    ExtendedCase::$case => TemplateTables {
                        parameters: include_str!(concat!("data/", $dir, "/k_vector_parameters.txt")),
                        points: include_str!(concat!("data/", $dir, "/points.txt")),
                        path: include_str!(concat!("data/", $dir, "/path.txt")),
                    },
                )*
            }
        }
    };
}

builtin_tables! {
    CP1 => "cP1", CP2 => "cP2", CF1 => "cF1", CF2 => "cF2", CI1 => "cI1",
    TP1 => "tP1", TI1 => "tI1", TI2 => "tI2",
    OP1 => "oP1", OF1 => "oF1", OF2 => "oF2", OF3 => "oF3",
    OI1 => "oI1", OI2 => "oI2", OI3 => "oI3",
    OC1 => "oC1", OC2 => "oC2", OA1 => "oA1", OA2 => "oA2",
    HP1 => "hP1", HP2 => "hP2", HR1 => "hR1", HR2 => "hR2",
    MP1 => "mP1", MC1 => "mC1", MC2 => "mC2", MC3 => "mC3",
    AP2 => "aP2", AP3 => "aP3",
}

impl PathTemplate {
    /// 加载内置模板
    pub fn builtin(case: ExtendedCase) -> Result<Self> {
        let tables = builtin_tables(case);
        Self::parse(case, tables.parameters, tables.points, tables.path)
    }

    /// 从目录加载模板：`<dir>/<case>/{k_vector_parameters,points,path}.txt`
    pub fn from_dir(dir: &Path, case: ExtendedCase) -> Result<Self> {
        let case_dir = dir.join(case.as_str());
        let read = |name: &str| -> Result<String> {
            let path = case_dir.join(name);
            if !path.exists() {
                return Err(BandpathError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            fs::read_to_string(&path).map_err(|e| BandpathError::FileReadError {
                path: path.display().to_string(),
                source: e,
            })
        };

        let parameters = read(PARAMETERS_FILE)?;
        let points = read(POINTS_FILE)?;
        let path = read(PATH_FILE)?;
        Self::parse(case, &parameters, &points, &path)
    }

    /// 按需选择目录或内置模板
    pub fn load(case: ExtendedCase, dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::from_dir(dir, case),
            None => Self::builtin(case),
        }
    }

    /// 解析三张文本表并检查模板不变量
    pub fn parse(case: ExtendedCase, parameters: &str, points: &str, path: &str) -> Result<Self> {
        let name = case.as_str();

        let mut defined: HashSet<&str> = HashSet::new();
        let mut kparams = Vec::new();
        for row in split_rows(parameters, 2, name, PARAMETERS_FILE)? {
            let formula = Formula::from_expression(row[1])?;
            // 只能引用前面已定义的参数
            if let Some(missing) = formula.references().into_iter().find(|r| !defined.contains(r)) {
                return Err(BandpathError::template(
                    name,
                    PARAMETERS_FILE,
                    format!("parameter '{}' references undefined '{}'", row[0], missing),
                ));
            }
            defined.insert(row[0]);
            kparams.push(KParameter {
                name: row[0].to_string(),
                expression: row[1].to_string(),
                formula,
            });
        }

        let mut labels = HashSet::new();
        let mut point_defs = Vec::new();
        for row in split_rows(points, 4, name, POINTS_FILE)? {
            if !labels.insert(row[0]) {
                return Err(BandpathError::template(
                    name,
                    POINTS_FILE,
                    format!("point '{}' defined more than once", row[0]),
                ));
            }
            point_defs.push(PointDefinition {
                label: row[0].to_string(),
                coords: [row[1].to_string(), row[2].to_string(), row[3].to_string()],
            });
        }

        let mut segments = Vec::new();
        for row in split_rows(path, 2, name, PATH_FILE)? {
            for label in [row[0], row[1]] {
                if !labels.contains(label) {
                    return Err(BandpathError::template(
                        name,
                        PATH_FILE,
                        format!("path references undefined point '{}'", label),
                    ));
                }
            }
            segments.push((row[0].to_string(), row[1].to_string()));
        }

        Ok(PathTemplate {
            case,
            parameters: kparams,
            points: point_defs,
            path: segments,
        })
    }
}

/// 按空白切分非空行，并检查列数
fn split_rows<'a>(text: &'a str, columns: usize, case: &str, file: &str) -> Result<Vec<Vec<&'a str>>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            let row: Vec<&str> = line.split_whitespace().collect();
            if row.len() != columns {
                return Err(BandpathError::template(
                    case,
                    file,
                    format!(
                        "invalid line length at line {}: expected {} columns, found {}",
                        idx + 1,
                        columns,
                        row.len()
                    ),
                ));
            }
            Ok(row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_builtin_templates_load() {
        for case in ExtendedCase::ALL {
            let template = PathTemplate::builtin(case).unwrap();
            assert_eq!(template.case, case);
            assert!(!template.path.is_empty(), "{} has an empty path", case);
            assert!(template.points.iter().any(|p| p.label == "GAMMA"));
        }
    }

    #[test]
    fn test_cp1_template_contents() {
        let template = PathTemplate::builtin(ExtendedCase::CP1).unwrap();
        assert!(template.parameters.is_empty());
        assert_eq!(template.path[0], ("GAMMA".to_string(), "X".to_string()));

        let x = template.points.iter().find(|p| p.label == "X").unwrap();
        assert_eq!(x.coords, ["0".to_string(), "1/2".to_string(), "0".to_string()]);
    }

    #[test]
    fn test_parameters_keep_file_order() {
        let template = PathTemplate::builtin(ExtendedCase::MC1).unwrap();
        let names: Vec<&str> = template.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Z", "E", "S", "F"]);
    }

    #[test]
    fn test_invalid_line_length() {
        let result = PathTemplate::parse(ExtendedCase::CP1, "", "GAMMA 0 0\n", "");
        match result {
            Err(BandpathError::Template { file, reason, .. }) => {
                assert_eq!(file, POINTS_FILE);
                assert!(reason.contains("invalid line length"));
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let result = PathTemplate::parse(ExtendedCase::CP1, "Z\n", "GAMMA 0 0 0\n", "");
        assert!(matches!(result, Err(BandpathError::Template { .. })));
    }

    #[test]
    fn test_duplicate_point_label() {
        let points = "GAMMA 0 0 0\nX 0 1/2 0\nX 1/2 0 0\n";
        let result = PathTemplate::parse(ExtendedCase::CP1, "", points, "GAMMA X\n");
        assert!(matches!(result, Err(BandpathError::Template { .. })));
    }

    #[test]
    fn test_undefined_path_label() {
        let points = "GAMMA 0 0 0\nX 0 1/2 0\n";
        let result = PathTemplate::parse(ExtendedCase::CP1, "", points, "GAMMA M\n");
        match result {
            Err(BandpathError::Template { reason, .. }) => assert!(reason.contains("'M'")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_expression_in_parameters() {
        let result = PathTemplate::parse(ExtendedCase::CP1, "Z a*a*a\n", "GAMMA 0 0 0\n", "");
        assert!(matches!(result, Err(BandpathError::Evaluation(_))));
    }

    #[test]
    fn test_parameter_reference_checked_at_load() {
        let result = PathTemplate::parse(ExtendedCase::TI1, "E 1/2+Z\n", "GAMMA 0 0 0\n", "");
        match result {
            Err(BandpathError::Template { file, reason, .. }) => {
                assert_eq!(file, PARAMETERS_FILE);
                assert_eq!(reason, "parameter 'E' references undefined 'Z'");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        // 引用必须出现在定义之后
        let result = PathTemplate::parse(ExtendedCase::TI1, "E 1/2+Z\nZ a*a/4/c/c\n", "GAMMA 0 0 0\n", "");
        assert!(matches!(result, Err(BandpathError::Template { .. })));

        let template =
            PathTemplate::parse(ExtendedCase::TI1, "Z a*a/4/c/c\nE 1/2+Z\n", "GAMMA 0 0 0\n", "").unwrap();
        assert_eq!(template.parameters.len(), 2);
    }

    #[test]
    fn test_triclinic_labels() {
        for case in [ExtendedCase::AP2, ExtendedCase::AP3] {
            let template = PathTemplate::builtin(case).unwrap();
            let mut labels: Vec<&str> = template.points.iter().map(|p| p.label.as_str()).collect();
            labels.sort_unstable();
            assert_eq!(labels, vec!["GAMMA", "L", "M", "N", "R", "X", "Y", "Z"]);

            let path: Vec<(&str, &str)> =
                template.path.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
            assert_eq!(
                path,
                vec![
                    ("X", "GAMMA"),
                    ("GAMMA", "Y"),
                    ("L", "GAMMA"),
                    ("GAMMA", "Z"),
                    ("N", "GAMMA"),
                    ("GAMMA", "M"),
                    ("R", "GAMMA"),
                ]
            );
        }

        let ap3 = PathTemplate::builtin(ExtendedCase::AP3).unwrap();
        let n = ap3.points.iter().find(|p| p.label == "N").unwrap();
        assert_eq!(n.coords, ["-1/2".to_string(), "-1/2".to_string(), "1/2".to_string()]);
    }

    #[test]
    fn test_mc3_delta_parameter() {
        let template = PathTemplate::builtin(ExtendedCase::MC3).unwrap();
        let names: Vec<&str> = template.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Z", "E", "F", "U", "W", "D", "R"]);

        let k4 = template.points.iter().find(|p| p.label == "K_4").unwrap();
        assert_eq!(k4.coords, ["1-F".to_string(), "F".to_string(), "D".to_string()]);
    }

    #[test]
    fn test_blank_lines_ignored() {
        let template =
            PathTemplate::parse(ExtendedCase::CP1, "\n", "GAMMA 0 0 0\n\nX 0 1/2 0\n", "GAMMA X\n\n").unwrap();
        assert_eq!(template.points.len(), 2);
        assert_eq!(template.path.len(), 1);
    }
}
