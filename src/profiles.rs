//! Customer-profile tables for report generation.
//!
//! Tables are CSV exports read as raw text and spliced into the report
//! prompt unparsed; the model reads them directly. [`LABELS`] maps the
//! Korean column descriptions to the short codes used as table headers.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Column description → header code.
pub const LABELS: &[(&str, &str)] = &[
    ("총자산 10만원 미만 고객 비율", "sb10r"),
    ("총자산 100만원 미만 고객 비율", "sb11r"),
    ("총자산 1,000만원 미만 고객 비율", "sb12r"),
    ("총자산 5,000만원 미만 고객 비율", "sb13r"),
    ("총자산 1억원 미만 고객 비율", "sb14r"),
    ("총자산 1억원 이상 고객 비율", "sb15r"),
    ("지분증권 자산 비율", "sb16r"),
    ("채무증권 자산 비율", "sb17r"),
    ("수익증권 자산 비율", "sb18r"),
    ("파생결합증권 자산 비율", "sb19r"),
    ("금전총액 자산 비율", "sb20r"),
    ("투자등급_공격투자형 비율", "sc11r"),
    ("투자등급_적극투자형 비율", "sc12r"),
    ("투자등급_위험중립형 비율", "sc13r"),
    ("투자등급_안정추구형 비율", "sc14r"),
    ("투자등급_안정형 비율", "sc15r"),
    ("주식 거래유형_단타거래 고객 비율", "sb37r"),
    ("주식 거래유형_백화점포트폴리오 고객 비율", "sb38r"),
    ("주식 거래유형_저자산 일반주 고객 비율", "sb39r"),
    ("주식 거래유형_우량주 중심 안전형 고객 비율", "sb40r"),
    ("주식 거래유형_CMA중심 무거래 고객 비율", "sb41r"),
    ("주식 거래유형_초우량 고객 비율", "sb42r"),
];

/// One table as it appears in the prompt.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    pub path: PathBuf,
    pub text: String,
}

impl ProfileTable {
    /// File stem, e.g. `grade_data`.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Read every configured table; any missing file is an error.
pub async fn load_tables(paths: &[PathBuf]) -> Result<Vec<ProfileTable>> {
    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        tables.push(load_table(path).await?);
    }
    Ok(tables)
}

async fn load_table(path: &Path) -> Result<ProfileTable> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read profile table: {}", path.display()))?;
    Ok(ProfileTable {
        path: path.to_path_buf(),
        text: text.trim_end().to_string(),
    })
}

/// The label map, one `description: code` pair per line.
pub fn render_labels() -> String {
    LABELS
        .iter()
        .map(|(label, code)| format!("{}: {}", label, code))
        .collect::<Vec<_>>()
        .join("\n")
}
