//! MTL (Material Template Library) file parser
//!
//! Parses Wavefront .mtl text into [`MaterialRecord`]s keyed by material name.
//! Recognised directives: `newmtl Ns Ni d Tr Tf illum Ka Kd Ks Ke map_Ka map_Kd map_d
//! map_bump bump map_Ks`. Anything else is ignored.

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use super::material_table::{normalize_texture_path, MaterialRecord, TextureSlot};
use crate::assets::tokenizer::tokenize;
use crate::foundation::math::Vec3;

/// Errors generated when loading an MTL file
#[derive(Error, Debug)]
pub enum MtlError {
    /// The MTL file does not exist
    #[error("MTL file {0:?} not found")]
    FileNotFound(PathBuf),

    /// IO error while reading the MTL text
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A directive with a missing or malformed value
    #[error("line {line}: {directive}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// The directive being parsed
        directive: String,
        /// What was wrong
        message: String,
    },
}

/// MTL text parser
pub struct MtlParser;

impl MtlParser {
    /// Parse MTL file contents into a map of material name -> record
    ///
    /// Directives before the first `newmtl` have no record to apply to and are skipped
    /// with a warning. A repeated `newmtl` name replaces the earlier record.
    pub fn parse(contents: &str) -> Result<BTreeMap<String, MaterialRecord>, MtlError> {
        let mut materials = BTreeMap::new();
        let mut current: Option<(String, MaterialRecord)> = None;

        for (index, raw) in contents.lines().enumerate() {
            let line = index + 1;
            let tokens = tokenize(raw);
            let Some(&directive) = tokens.first() else {
                continue;
            };
            if directive.starts_with('#') {
                continue;
            }

            if directive == "newmtl" {
                if let Some((name, record)) = current.take() {
                    Self::store(&mut materials, name, record);
                }
                let name = tokens.get(1).ok_or_else(|| parse_error(line, directive, "missing material name"))?;
                current = Some(((*name).to_string(), MaterialRecord::default()));
                continue;
            }

            if !Self::is_known(directive) {
                log::trace!("line {}: ignoring '{}'", line, directive);
                continue;
            }

            let Some((_, record)) = current.as_mut() else {
                log::warn!("line {}: '{}' before any newmtl, ignored", line, directive);
                continue;
            };
            Self::apply(record, &tokens, line)?;
        }

        if let Some((name, record)) = current {
            Self::store(&mut materials, name, record);
        }
        Ok(materials)
    }

    fn is_known(directive: &str) -> bool {
        matches!(
            directive,
            "Ns" | "Ni" | "d" | "Tr" | "Tf" | "illum" | "Ka" | "Kd" | "Ks" | "Ke" | "map_Ks"
        ) || TextureSlot::from_directive(directive).is_some()
    }

    fn store(materials: &mut BTreeMap<String, MaterialRecord>, name: String, record: MaterialRecord) {
        log::debug!("material '{}'", name);
        if materials.insert(name.clone(), record).is_some() {
            log::warn!("material '{}' defined more than once; keeping the last", name);
        }
    }

    fn apply(record: &mut MaterialRecord, tokens: &[&str], line: usize) -> Result<(), MtlError> {
        let directive = tokens[0];
        match directive {
            "Ns" => record.ns = parse_f32(tokens, line)?,
            "Ni" => record.ni = parse_f32(tokens, line)?,
            "d" => record.d = parse_f32(tokens, line)?,
            "Tr" => record.tr = parse_f32(tokens, line)?,
            "illum" => record.illum = parse_i32(tokens, line)?,
            "Tf" => record.tf = parse_vec3(tokens, line)?,
            "Ka" => record.ka = parse_vec3(tokens, line)?,
            "Kd" => record.kd = parse_vec3(tokens, line)?,
            "Ks" => record.ks = parse_vec3(tokens, line)?,
            "Ke" => record.ke = parse_vec3(tokens, line)?,
            "map_Ks" => record.map_ks = normalize_texture_path(texture_path(tokens, line)?),
            _ => {
                if let Some(slot) = TextureSlot::from_directive(directive) {
                    record.set_texture_path(slot, texture_path(tokens, line)?);
                }
            }
        }
        Ok(())
    }
}

fn parse_error(line: usize, directive: &str, message: impl Into<String>) -> MtlError {
    MtlError::Parse {
        line,
        directive: directive.to_string(),
        message: message.into(),
    }
}

fn value<'a>(tokens: &[&'a str], position: usize, line: usize) -> Result<&'a str, MtlError> {
    tokens
        .get(position)
        .copied()
        .ok_or_else(|| parse_error(line, tokens[0], "missing value"))
}

fn parse_f32_at(tokens: &[&str], position: usize, line: usize) -> Result<f32, MtlError> {
    let token = value(tokens, position, line)?;
    token
        .parse::<f32>()
        .map_err(|_| parse_error(line, tokens[0], format!("invalid float value '{token}'")))
}

fn parse_f32(tokens: &[&str], line: usize) -> Result<f32, MtlError> {
    parse_f32_at(tokens, 1, line)
}

fn parse_i32(tokens: &[&str], line: usize) -> Result<i32, MtlError> {
    let token = value(tokens, 1, line)?;
    token
        .parse::<i32>()
        .map_err(|_| parse_error(line, tokens[0], format!("invalid integer value '{token}'")))
}

fn parse_vec3(tokens: &[&str], line: usize) -> Result<Vec3, MtlError> {
    Ok(Vec3::new(
        parse_f32_at(tokens, 1, line)?,
        parse_f32_at(tokens, 2, line)?,
        parse_f32_at(tokens, 3, line)?,
    ))
}

/// The file name is the last token; map options such as `-bm 0.5` come before it
fn texture_path<'a>(tokens: &[&'a str], line: usize) -> Result<&'a str, MtlError> {
    match tokens {
        [_, .., path] => Ok(*path),
        _ => Err(parse_error(line, tokens[0], "missing texture path")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_material() {
        let mtl_content = r#"
# Simple material
newmtl TestMaterial
Ka 1.0 1.0 1.0
Kd 0.8 0.2 0.2
Ks 0.5 0.5 0.5
Ns 250.0
Ni 1.5
d 1.0
illum 2
"#;

        let materials = MtlParser::parse(mtl_content).unwrap();
        assert_eq!(materials.len(), 1);

        let mat = materials.get("TestMaterial").unwrap();
        assert_eq!(mat.kd, Vec3::new(0.8, 0.2, 0.2));
        assert_eq!(mat.ns, 250.0);
        assert_eq!(mat.ni, 1.5);
        assert_eq!(mat.illum, 2);
    }

    #[test]
    fn test_transparency_is_kept_separately() {
        let materials = MtlParser::parse("newmtl glass\nTr 0.3\nTf 1 1 0.5\n").unwrap();
        let mat = materials.get("glass").unwrap();

        assert_eq!(mat.tr, 0.3);
        assert_eq!(mat.d, 1.0);
        assert_eq!(mat.tf, Vec3::new(1.0, 1.0, 0.5));
    }

    #[test]
    fn test_texture_directives() {
        let mtl_content = r#"
newmtl sponza_column
map_Ka textures\sponza_column_a_diff.tga
map_Kd textures\sponza_column_a_diff.tga
map_Ks textures\spec.tga
map_bump -bm 0.5 textures\sponza_column_a_ddn.tga
bump textures\sponza_column_a_ddn.tga
map_d textures\mask.tga
"#;

        let materials = MtlParser::parse(mtl_content).unwrap();
        let mat = materials.get("sponza_column").unwrap();

        assert_eq!(mat.texture_path(TextureSlot::Ambient), "textures/sponza_column_a_diff.tga");
        assert_eq!(mat.texture_path(TextureSlot::MapBump), "textures/sponza_column_a_ddn.tga");
        assert_eq!(mat.texture_path(TextureSlot::Bump), "textures/sponza_column_a_ddn.tga");
        assert_eq!(mat.texture_path(TextureSlot::Dissolve), "textures/mask.tga");
        assert_eq!(mat.map_ks, "textures/spec.tga");
    }

    #[test]
    fn test_last_material_is_flushed() {
        let materials = MtlParser::parse("newmtl red\nKd 1 0 0\nd 0.5\nnewmtl blue\nKd 0 0 1").unwrap();
        assert_eq!(materials.len(), 2);
        assert_eq!(materials["blue"].kd, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(materials["red"].d, 0.5);
    }

    #[test]
    fn test_unknown_and_orphan_directives_ignored() {
        let materials = MtlParser::parse("Kd 1 1 1\nnewmtl m\nsharpness 60\nmap_Ke glow.png\n").unwrap();
        assert_eq!(materials.len(), 1);
        assert_eq!(materials["m"].kd, Vec3::zeros());
    }

    #[test]
    fn test_malformed_value_reports_line() {
        let err = MtlParser::parse("newmtl m\nNs\n").unwrap_err();
        assert!(matches!(err, MtlError::Parse { line: 2, .. }));

        let err = MtlParser::parse("newmtl m\nKd 1 x 0\n").unwrap_err();
        match err {
            MtlError::Parse { line, directive, message } => {
                assert_eq!(line, 2);
                assert_eq!(directive, "Kd");
                assert!(message.contains("'x'"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_newmtl_without_name() {
        assert!(matches!(MtlParser::parse("newmtl\n"), Err(MtlError::Parse { line: 1, .. })));
    }

    #[test]
    fn test_redefinition_keeps_last() {
        let materials = MtlParser::parse("newmtl m\nNs 1\nnewmtl m\nNs 2\n").unwrap();
        assert_eq!(materials.len(), 1);
        assert_eq!(materials["m"].ns, 2.0);
    }
}
